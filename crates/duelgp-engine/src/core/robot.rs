use serde::{Deserialize, Serialize};

use super::geometry::{Vec2, wrap_heading};

/// Position and heading of a robot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Heading in radians, 0 = +x, counter-clockwise.
    pub heading: f32,
}

impl Pose {
    #[must_use]
    pub const fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            heading,
        }
    }
}

/// Which of the two robots in a match.
///
/// Robot `A` always resolves its action before robot `B` within a tick.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Mutable state of one robot during a match.
///
/// Health and ammo are unsigned and bounded by `max_health` / `max_ammo`; the
/// simulator keeps them in range after every action with [`RobotState::clamp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub position: Vec2,
    pub heading: f32,
    pub health: u32,
    pub max_health: u32,
    pub ammo: u32,
    pub max_ammo: u32,
    /// Remaining ticks of an in-progress reload, `None` when not reloading.
    pub reload_remaining: Option<u32>,
}

/// Out-of-range values found (and fixed) by [`RobotState::clamp`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClampReport {
    pub health_overflow: Option<u32>,
    pub ammo_overflow: Option<u32>,
    pub bad_pose: bool,
}

impl ClampReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl RobotState {
    /// Creates a robot at `pose` with full health and ammo and no reload in progress.
    #[must_use]
    pub fn new(pose: Pose, max_health: u32, max_ammo: u32) -> Self {
        Self {
            position: pose.position,
            heading: wrap_heading(pose.heading),
            health: max_health,
            max_health,
            ammo: max_ammo,
            max_ammo,
            reload_remaining: None,
        }
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            heading: self.heading,
        }
    }

    #[must_use]
    pub const fn is_eliminated(&self) -> bool {
        self.health == 0
    }

    #[must_use]
    pub const fn is_reloading(&self) -> bool {
        self.reload_remaining.is_some()
    }

    /// Fraction of health left, in `[0, 1]`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    /// Reduces health by up to `amount`, returning the damage actually taken.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.health);
        self.health -= taken;
        taken
    }

    /// Brings health, ammo and pose back into their legal ranges.
    ///
    /// Returns what had to be corrected so the caller can report it; a clean report
    /// means the state was already valid.
    pub fn clamp(&mut self, fallback_position: Vec2) -> ClampReport {
        let mut report = ClampReport::default();
        if self.health > self.max_health {
            report.health_overflow = Some(self.health);
            self.health = self.max_health;
        }
        if self.ammo > self.max_ammo {
            report.ammo_overflow = Some(self.ammo);
            self.ammo = self.max_ammo;
        }
        if !self.position.is_finite() || !self.heading.is_finite() {
            report.bad_pose = true;
            if !self.position.is_finite() {
                self.position = fallback_position;
            }
            if !self.heading.is_finite() {
                self.heading = 0.0;
            }
        }
        self.heading = wrap_heading(self.heading);
        report
    }
}
