//! Core data types shared by the simulator and by robot controllers.
//!
//! - [`Action`] - the six discrete actions a robot can take in one tick
//! - [`Vec2`] and the angle helpers - planar geometry
//! - [`Arena`] / [`Wall`] - static arena geometry (bounds plus obstacles)
//! - [`RobotState`] - position, heading, health, ammo and reload progress
//! - [`SensorReading`] / [`compute_sensors`] - what a robot perceives each tick
//! - [`MatchSeed`] - deterministic per-match random seed derivation

pub use self::{action::*, arena::*, geometry::*, robot::*, seed::*, sensor::*};

pub(crate) mod action;
pub(crate) mod arena;
pub(crate) mod geometry;
pub(crate) mod robot;
pub(crate) mod seed;
pub(crate) mod sensor;
