use std::fmt;

use crate::{Action, SensorReading};

/// Error returned by a controller that could not produce an action.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("controller produced no action: {message}")]
pub struct DecisionError {
    message: String,
}

impl DecisionError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Decides a robot's action from its sensor reading.
///
/// Implementations must be deterministic: the same reading always yields the same
/// result. Controllers are shared read-only between concurrently running matches.
pub trait Controller: fmt::Debug + Send + Sync {
    fn decide(&self, reading: &SensorReading) -> Result<Action, DecisionError>;
}

/// A bare action is a controller that always chooses itself.
impl Controller for Action {
    fn decide(&self, _reading: &SensorReading) -> Result<Action, DecisionError> {
        Ok(*self)
    }
}

impl<C> Controller for &C
where
    C: Controller + ?Sized,
{
    fn decide(&self, reading: &SensorReading) -> Result<Action, DecisionError> {
        (**self).decide(reading)
    }
}
