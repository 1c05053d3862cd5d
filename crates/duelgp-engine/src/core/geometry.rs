use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// A point or direction in the arena plane.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Mul,
)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians (0 = +x, counter-clockwise).
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Angle of this vector in radians, in `(-π, π]`.
    #[must_use]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Normalizes an angle into `(-π, π]`.
///
/// # Examples
///
/// ```
/// use std::f32::consts::PI;
/// use duelgp_engine::normalize_angle;
///
/// assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
/// assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
/// ```
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = wrap_heading(angle);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Wraps a heading into `[0, 2π)`.
#[must_use]
pub fn wrap_heading(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid may round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}
