//! Evaluation of program trees against a sensor reading.
//!
//! Evaluation is a pure function of the tree and the reading. Arithmetic never
//! produces a non-finite number: `div` by zero yields `1`, NaN becomes `0` and
//! results are clamped to `±1e9`.

use duelgp_engine::{Action, Controller, DecisionError, SensorReading};

use crate::{Node, Op, Program, ValueType};

/// Magnitude every intermediate number is clamped to.
pub const NUMBER_LIMIT: f32 = 1.0e9;

/// A value produced by a node.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::From, derive_more::IsVariant)]
pub enum Value {
    Number(f32),
    Boolean(bool),
    Action(Action),
}

impl Value {
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::Number(_) => ValueType::Number,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Action(_) => ValueType::Action,
        }
    }
}

/// Failure to evaluate a malformed tree.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvalError {
    #[display("`{op}` expects {expected} arguments, found {found}")]
    Arity {
        op: Op,
        expected: usize,
        found: usize,
    },
    #[display("expected a {expected} value, found a {found}")]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },
}

/// Keeps a number finite and within [`NUMBER_LIMIT`].
#[must_use]
pub fn sanitize(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-NUMBER_LIMIT, NUMBER_LIMIT)
    }
}

/// Division that yields `1` when the divisor is zero.
#[must_use]
pub fn protected_div(lhs: f32, rhs: f32) -> f32 {
    if rhs.abs() < f32::MIN_POSITIVE {
        1.0
    } else {
        sanitize(lhs / rhs)
    }
}

/// Evaluates the subtree rooted at `node`.
pub fn evaluate(node: &Node, reading: &SensorReading) -> Result<Value, EvalError> {
    let op = node.op();
    let args = node.children();
    if args.len() != op.arity() {
        return Err(EvalError::Arity {
            op,
            expected: op.arity(),
            found: args.len(),
        });
    }
    let number = |index: usize| number(&args[index], reading);
    let boolean = |index: usize| boolean(&args[index], reading);
    let action = |index: usize| action(&args[index], reading);

    let value = match op {
        Op::Act(action) => Value::Action(action),
        Op::Sensor(kind) => Value::Number(sanitize(reading.get(kind))),
        Op::Number(value) => Value::Number(sanitize(value)),
        Op::Boolean(value) => Value::Boolean(value),

        Op::Add => Value::Number(sanitize(number(0)? + number(1)?)),
        Op::Sub => Value::Number(sanitize(number(0)? - number(1)?)),
        Op::Mul => Value::Number(sanitize(number(0)? * number(1)?)),
        Op::Div => Value::Number(protected_div(number(0)?, number(1)?)),
        Op::Neg => Value::Number(-number(0)?),
        Op::Min => Value::Number(number(0)?.min(number(1)?)),
        Op::Max => Value::Number(number(0)?.max(number(1)?)),
        Op::Sin => Value::Number(number(0)?.sin()),
        Op::Cos => Value::Number(number(0)?.cos()),
        Op::IfNumber => Value::Number(if boolean(0)? { number(1)? } else { number(2)? }),

        Op::Gt => Value::Boolean(number(0)? > number(1)?),
        Op::Lt => Value::Boolean(number(0)? < number(1)?),
        Op::And => Value::Boolean(boolean(0)? && boolean(1)?),
        Op::Or => Value::Boolean(boolean(0)? || boolean(1)?),
        Op::Not => Value::Boolean(!boolean(0)?),

        Op::IfAction => Value::Action(if boolean(0)? { action(1)? } else { action(2)? }),
        Op::Select => Value::Action(Action::from_output(number(0)?)),
    };
    Ok(value)
}

fn number(node: &Node, reading: &SensorReading) -> Result<f32, EvalError> {
    match evaluate(node, reading)? {
        Value::Number(value) => Ok(value),
        other => Err(mismatch(ValueType::Number, other)),
    }
}

fn boolean(node: &Node, reading: &SensorReading) -> Result<bool, EvalError> {
    match evaluate(node, reading)? {
        Value::Boolean(value) => Ok(value),
        other => Err(mismatch(ValueType::Boolean, other)),
    }
}

fn action(node: &Node, reading: &SensorReading) -> Result<Action, EvalError> {
    match evaluate(node, reading)? {
        Value::Action(value) => Ok(value),
        other => Err(mismatch(ValueType::Action, other)),
    }
}

const fn mismatch(expected: ValueType, found: Value) -> EvalError {
    EvalError::TypeMismatch {
        expected,
        found: found.value_type(),
    }
}

impl Program {
    /// Runs the program on `reading` and returns the chosen action.
    pub fn evaluate(&self, reading: &SensorReading) -> Result<Action, EvalError> {
        action(self.root(), reading)
    }
}

impl Controller for Program {
    fn decide(&self, reading: &SensorReading) -> Result<Action, DecisionError> {
        self.evaluate(reading)
            .map_err(|err| DecisionError::new(err.to_string()))
    }
}
