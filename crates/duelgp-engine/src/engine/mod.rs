//! Match simulation.
//!
//! - [`PhysicsConfig`] - tunable movement, shooting and reload parameters
//! - [`Controller`] - decision seam: anything that maps a [`SensorReading`](crate::SensorReading)
//!   to an [`Action`](crate::Action)
//! - [`Simulator`] - the per-match state machine advanced one tick at a time
//! - [`play`] - runs a full match and produces a [`MatchResult`]
//!
//! # Tick Order
//!
//! Each [`Simulator::step`] performs, in this order:
//!
//! 1. Compute sensor readings for both robots
//! 2. Ask each living robot's controller for an action
//! 3. Apply robot A's action, then robot B's (a robot eliminated by A's shot does not act)
//! 4. Clamp both robots' state, advance the tick counter and check terminal conditions
//!
//! A match ends on elimination, on reaching `max_ticks`, or when a controller fails
//! to produce an action.

pub use self::{controller::*, match_runner::*, physics::*, simulator::*};

mod controller;
mod match_runner;
mod physics;
mod simulator;
