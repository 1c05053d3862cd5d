//! Strongly typed genetic-programming trees that drive duel robots.
//!
//! A [`Program`] is an expression tree built from the ops enabled in a
//! [`PrimitiveSet`]. Its root produces an [`Action`](duelgp_engine::Action), so
//! every well-formed program is a [`Controller`](duelgp_engine::Controller) and can
//! be handed straight to [`duelgp_engine::play`].
//!
//! - [`generate`] / [`ramped_half_and_half`] build random trees within depth bounds.
//! - [`crossover`] / [`mutate`] produce offspring that keep types and depth limits.
//! - [`Program::evaluate`] runs a tree against a
//!   [`SensorReading`](duelgp_engine::SensorReading).

pub use self::{
    generate::{Method, generate, ramped_half_and_half},
    interpreter::{EvalError, NUMBER_LIMIT, Value, evaluate, protected_div, sanitize},
    primitive::{Ephemeral, Op, PrimitiveSet, PrimitiveSetConfig, ValueType},
    tree::{Node, Position, Program, ProgramError},
    variation::{VariationConfig, crossover, mutate},
};

mod generate;
mod interpreter;
mod primitive;
mod tree;
mod variation;
