//! Arena physics and match simulation for two-robot duels.
//!
//! The engine is split the same way a game is described:
//!
//! - [`core`] - plain data: actions, geometry, arena bounds, robot state and the
//!   sensor model that turns a robot's view of the world into a [`SensorReading`].
//! - [`engine`] - behaviour: the tick-by-tick [`Simulator`] and the [`play`]
//!   function that runs a whole match and reduces it to a [`MatchResult`].
//!
//! The engine knows nothing about how a robot decides what to do. Anything that
//! implements [`Controller`] can drive a robot; evolved programs live in a separate
//! crate and plug in through that trait.
//!
//! # Example
//!
//! ```
//! use duelgp_engine::{Action, MatchConfig, MatchSeed, TerminalCondition, play};
//!
//! let config = MatchConfig {
//!     max_ticks: 50,
//!     ..MatchConfig::default()
//! };
//! let result = play(&Action::Noop, &Action::Noop, &config, MatchSeed::new(7));
//!
//! assert_eq!(result.terminal, TerminalCondition::Timeout);
//! assert_eq!(result.ticks, 50);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
