use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Serialize};

/// Discrete action chosen by a robot for a single tick.
///
/// Exactly one action is applied per living robot per tick. The discriminants
/// define the order used by [`Action::from_output`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Action {
    /// Move one step along the current heading.
    #[display("move_forward")]
    MoveForward = 0,
    /// Rotate counter to the heading direction by one turn step.
    #[display("turn_left")]
    TurnLeft = 1,
    /// Rotate along the heading direction by one turn step.
    #[display("turn_right")]
    TurnRight = 2,
    /// Fire one round if any ammo is left.
    #[display("shoot")]
    Shoot = 3,
    /// Start or continue reloading.
    #[display("reload")]
    Reload = 4,
    /// Do nothing.
    #[display("noop")]
    Noop = 5,
}

impl Distribution<Action> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        Action::ALL[rng.random_range(0..Action::LEN)]
    }
}

impl Action {
    /// Number of actions (6).
    pub const LEN: usize = 6;

    /// All actions in discriminant order.
    pub const ALL: [Self; Self::LEN] = [
        Self::MoveForward,
        Self::TurnLeft,
        Self::TurnRight,
        Self::Shoot,
        Self::Reload,
        Self::Noop,
    ];

    /// Maps a numeric program output onto an action.
    ///
    /// The integer part of `|output|` is taken modulo [`Action::LEN`]. Non-finite
    /// outputs map to [`Action::Noop`].
    ///
    /// # Examples
    ///
    /// ```
    /// use duelgp_engine::Action;
    ///
    /// assert_eq!(Action::from_output(0.7), Action::MoveForward);
    /// assert_eq!(Action::from_output(-3.2), Action::Shoot);
    /// assert_eq!(Action::from_output(10.0), Action::Reload);
    /// assert_eq!(Action::from_output(f32::NAN), Action::Noop);
    /// ```
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_output(output: f32) -> Self {
        if !output.is_finite() {
            return Self::Noop;
        }
        let index = (output.abs().trunc() as u64) % Self::LEN as u64;
        Self::ALL[index as usize]
    }

    /// Returns the `snake_case` name of this action.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MoveForward => "move_forward",
            Self::TurnLeft => "turn_left",
            Self::TurnRight => "turn_right",
            Self::Shoot => "shoot",
            Self::Reload => "reload",
            Self::Noop => "noop",
        }
    }

    /// Parses an action from its `snake_case` name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }
}
