use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Action, Arena, MatchSeed, Pose, RobotState, Side};

use super::{Controller, PhysicsConfig, Simulator, StartPositions};

const MAX_PLACEMENT_ATTEMPTS: usize = 64;

/// Which robot(s) failed to produce an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Offender {
    A,
    B,
    Both,
}

impl Offender {
    /// Builds an offender from per-side failure flags (`[a, b]`).
    #[must_use]
    pub const fn from_flags(failed: [bool; 2]) -> Option<Self> {
        match failed {
            [true, true] => Some(Self::Both),
            [true, false] => Some(Self::A),
            [false, true] => Some(Self::B),
            [false, false] => None,
        }
    }

    #[must_use]
    pub const fn includes(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Self::Both, _) | (Self::A, Side::A) | (Self::B, Side::B)
        )
    }
}

/// The rule by which a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum TerminalCondition {
    /// One robot's health reached zero while the other survived.
    Elimination { winner: Side },
    /// Both robots' health reached zero.
    BothEliminated,
    /// `max_ticks` elapsed with both robots alive (a draw).
    Timeout,
    /// A controller failed to produce an action; the match stopped immediately.
    InvalidProgram { offender: Offender },
}

/// Per-robot accounting of one match.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotReport {
    pub damage_dealt: u32,
    pub damage_taken: u32,
    /// Ticks completed with this robot still alive.
    pub survival_ticks: u32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub final_health: u32,
    pub final_ammo: u32,
    /// How often each action was applied, indexed by `Action as usize`.
    pub action_counts: [u32; Action::LEN],
}

impl RobotReport {
    pub(crate) fn record_action(&mut self, action: Action) {
        self.action_counts[action as usize] += 1;
    }

    #[must_use]
    pub fn action_count(&self, action: Action) -> u32 {
        self.action_counts[action as usize]
    }
}

/// Immutable outcome of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Number of ticks played.
    pub ticks: u32,
    pub terminal: TerminalCondition,
    /// Reports for robot A and robot B, in that order.
    pub robots: [RobotReport; 2],
}

impl MatchResult {
    #[must_use]
    pub const fn report(&self, side: Side) -> &RobotReport {
        &self.robots[side.index()]
    }

    /// The surviving robot of an elimination, `None` otherwise.
    #[must_use]
    pub const fn winner(&self) -> Option<Side> {
        match self.terminal {
            TerminalCondition::Elimination { winner } => Some(winner),
            _ => None,
        }
    }

    /// Timeouts and mutual eliminations are draws.
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        matches!(
            self.terminal,
            TerminalCondition::Timeout | TerminalCondition::BothEliminated
        )
    }

    /// Returns `true` if `side`'s controller was the cause of an invalid-program stop.
    #[must_use]
    pub const fn is_invalid_for(&self, side: Side) -> bool {
        match self.terminal {
            TerminalCondition::InvalidProgram { offender } => offender.includes(side),
            _ => false,
        }
    }
}

/// Everything needed to set up a match besides the two controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub arena: Arena,
    pub physics: PhysicsConfig,
    pub max_ticks: u32,
    pub start_positions: StartPositions,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            physics: PhysicsConfig::default(),
            max_ticks: 100,
            start_positions: StartPositions::default(),
        }
    }
}

/// Plays a full match between controller `a` (robot A) and controller `b` (robot B).
///
/// Both robots start with full health and ammo. The result depends only on the
/// controllers, `config` and `seed`.
#[must_use]
pub fn play(
    a: &dyn Controller,
    b: &dyn Controller,
    config: &MatchConfig,
    seed: MatchSeed,
) -> MatchResult {
    let mut rng = seed.rng();
    let [pose_a, pose_b] = start_poses(config, &mut rng);
    let physics = &config.physics;
    let robots = [
        RobotState::new(pose_a, physics.max_health, physics.max_ammo),
        RobotState::new(pose_b, physics.max_health, physics.max_ammo),
    ];
    let result = Simulator::new(
        &config.arena,
        physics,
        [a, b],
        robots,
        config.max_ticks,
        rng,
    )
    .finish();
    debug!(
        seed = seed.value(),
        ticks = result.ticks,
        terminal = ?result.terminal,
        damage_a = result.robots[0].damage_dealt,
        damage_b = result.robots[1].damage_dealt,
        "match finished"
    );
    result
}

/// Draws (or copies) the starting poses of robot A and robot B.
pub fn start_poses<R>(config: &MatchConfig, rng: &mut R) -> [Pose; 2]
where
    R: Rng + ?Sized,
{
    match &config.start_positions {
        StartPositions::Random { margin } => [
            random_pose(&config.arena, *margin, rng),
            random_pose(&config.arena, *margin, rng),
        ],
        StartPositions::Fixed { a, b } => [*a, *b],
    }
}

fn random_pose<R>(arena: &Arena, margin: f32, rng: &mut R) -> Pose
where
    R: Rng + ?Sized,
{
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let x = sample_axis(arena.width, margin, rng);
        let y = sample_axis(arena.height, margin, rng);
        let heading = rng.random_range(0.0..TAU);
        let pose = Pose::new(x, y, heading);
        if arena.is_legal(pose.position) {
            return pose;
        }
    }
    warn!("no free start position found, placing robot at the arena center");
    let center = arena.center();
    Pose::new(center.x, center.y, 0.0)
}

fn sample_axis<R>(extent: f32, margin: f32, rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    let lower = margin.max(0.0);
    let upper = extent - lower;
    if upper <= lower {
        extent / 2.0
    } else {
        rng.random_range(lower..=upper)
    }
}
