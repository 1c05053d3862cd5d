use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::Pose;

/// Movement, combat and reload parameters of a match.
///
/// Defaults follow the classic setup: 5 units per step, 22.5° turns, a 50-unit shot
/// with a 22.5° half-cone dealing 20 damage, 100 health, 50 rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Distance covered by one `MOVE_FORWARD`.
    pub move_step: f32,
    /// Heading change of one `TURN_LEFT` / `TURN_RIGHT`, in radians.
    pub turn_step: f32,
    /// Maximum distance at which a shot can hit.
    pub shot_range: f32,
    /// Half-angle of the forward cone a target must be in, in radians.
    pub shot_half_angle: f32,
    /// Health removed from the target by one hit.
    pub shot_damage: u32,
    /// Chance that an in-cone, in-range shot lands.
    pub hit_probability: f32,
    /// Consecutive `RELOAD` ticks needed to refill ammo.
    pub reload_ticks: u32,
    pub max_health: u32,
    pub max_ammo: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            move_step: 5.0,
            turn_step: PI / 8.0,
            shot_range: 50.0,
            shot_half_angle: PI / 8.0,
            shot_damage: 20,
            hit_probability: 1.0,
            reload_ticks: 3,
            max_health: 100,
            max_ammo: 50,
        }
    }
}

/// How robots are placed when a match starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPositions {
    /// Uniform position at least `margin` away from the boundary, uniform heading.
    /// Drawn from the match's own random stream.
    Random { margin: f32 },
    /// The same poses every match.
    Fixed { a: Pose, b: Pose },
}

impl Default for StartPositions {
    fn default() -> Self {
        Self::Random { margin: 50.0 }
    }
}
