//! Sensor model: what a robot perceives at the start of each tick.
//!
//! A [`SensorReading`] is recomputed every tick from the current robot states and is
//! the only input a controller gets. It has five features, one per [`SensorKind`]:
//!
//! | sensor           | meaning                                                     |
//! |------------------|-------------------------------------------------------------|
//! | `enemy_distance` | Euclidean distance to the opponent                          |
//! | `enemy_bearing`  | angle to the opponent relative to own heading, `(-π, π]`    |
//! | `wall_distance`  | distance along own heading to the first boundary or wall    |
//! | `health`         | own health as a fraction of max health, `[0, 1]`            |
//! | `ammo`           | own ammo count                                              |
//!
//! When the opponent is already eliminated the enemy features fall back to
//! [`SensorReading::NO_ENEMY_BEARING`] and the arena diagonal.

use serde::{Deserialize, Serialize};

use super::{
    arena::Arena,
    geometry::{Vec2, normalize_angle},
    robot::RobotState,
};

/// Identifies one feature of a [`SensorReading`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    #[display("enemy_distance")]
    EnemyDistance,
    #[display("enemy_bearing")]
    EnemyBearing,
    #[display("wall_distance")]
    WallDistance,
    #[display("health")]
    Health,
    #[display("ammo")]
    Ammo,
}

impl SensorKind {
    pub const LEN: usize = 5;

    pub const ALL: [Self; Self::LEN] = [
        Self::EnemyDistance,
        Self::EnemyBearing,
        Self::WallDistance,
        Self::Health,
        Self::Ammo,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.to_string() == name)
    }
}

/// Snapshot of one robot's sensors for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub enemy_distance: f32,
    pub enemy_bearing: f32,
    pub wall_distance: f32,
    pub health: f32,
    pub ammo: f32,
}

impl SensorReading {
    /// Bearing reported when there is no living opponent.
    pub const NO_ENEMY_BEARING: f32 = 0.0;

    #[must_use]
    pub fn get(&self, kind: SensorKind) -> f32 {
        match kind {
            SensorKind::EnemyDistance => self.enemy_distance,
            SensorKind::EnemyBearing => self.enemy_bearing,
            SensorKind::WallDistance => self.wall_distance,
            SensorKind::Health => self.health,
            SensorKind::Ammo => self.ammo,
        }
    }
}

/// Computes `robot`'s sensor reading against `opponent` inside `arena`.
///
/// Pure and deterministic; never fails, including when `opponent` is eliminated.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn compute_sensors(robot: &RobotState, opponent: &RobotState, arena: &Arena) -> SensorReading {
    let (enemy_distance, enemy_bearing) = if opponent.is_eliminated() {
        (arena.diagonal(), SensorReading::NO_ENEMY_BEARING)
    } else {
        let offset = opponent.position - robot.position;
        let bearing = if offset == Vec2::ZERO {
            0.0
        } else {
            normalize_angle(offset.angle() - robot.heading)
        };
        (offset.length(), bearing)
    };
    SensorReading {
        enemy_distance,
        enemy_bearing,
        wall_distance: arena.ray_distance(robot.position, Vec2::from_angle(robot.heading)),
        health: robot.health_fraction(),
        ammo: robot.ammo as f32,
    }
}
