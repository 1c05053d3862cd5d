//! Primitive registry: the node kinds a program tree is built from.
//!
//! Every node is an [`Op`]. Ops are strongly typed: each has an output
//! [`ValueType`] and a fixed list of argument types, and a tree is well formed only
//! if every child's output type matches the slot it fills.
//!
//! | type      | terminals                                   | functions                                                  |
//! |-----------|---------------------------------------------|------------------------------------------------------------|
//! | `action`  | one per [`Action`]                          | `select(number)`, `if_action(boolean, action, action)`*    |
//! | `number`  | five sensors, ephemeral constants           | `add sub mul div neg min max`, `sin cos`**, `if_number`*   |
//! | `boolean` | `true`, `false`                             | `gt lt`***, `and or not`***                                |
//!
//! \* needs `conditionals`, \*\* needs `trigonometry`, \*\*\* needs `comparisons`.
//!
//! A [`PrimitiveSet`] is the registry of ops enabled for a run; random generation and
//! mutation only ever draw from it.

use std::{f32::consts::PI, fmt};

use duelgp_engine::{Action, SensorKind};
use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};

/// Type of value a node produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[display("number")]
    Number,
    #[display("boolean")]
    Boolean,
    #[display("action")]
    Action,
}

impl ValueType {
    pub const LEN: usize = 3;

    pub const ALL: [Self; Self::LEN] = [Self::Number, Self::Boolean, Self::Action];

    const fn index(self) -> usize {
        match self {
            Self::Number => 0,
            Self::Boolean => 1,
            Self::Action => 2,
        }
    }
}

const NUMBER_1: &[ValueType] = &[ValueType::Number];
const NUMBER_2: &[ValueType] = &[ValueType::Number, ValueType::Number];
const BOOLEAN_1: &[ValueType] = &[ValueType::Boolean];
const BOOLEAN_2: &[ValueType] = &[ValueType::Boolean, ValueType::Boolean];
const IF_NUMBER: &[ValueType] = &[ValueType::Boolean, ValueType::Number, ValueType::Number];
const IF_ACTION: &[ValueType] = &[ValueType::Boolean, ValueType::Action, ValueType::Action];

/// A node kind: a terminal (no arguments) or a function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    // terminals
    Act(Action),
    Sensor(SensorKind),
    Number(f32),
    Boolean(bool),
    // number functions
    Add,
    Sub,
    Mul,
    /// Protected division: `x / 0` is `1`.
    Div,
    Neg,
    Min,
    Max,
    Sin,
    Cos,
    IfNumber,
    // boolean functions
    Gt,
    Lt,
    And,
    Or,
    Not,
    // action functions
    IfAction,
    /// Maps a number onto an action with [`Action::from_output`].
    Select,
}

impl Op {
    /// Every function op, regardless of which ones a [`PrimitiveSet`] enables.
    pub const FUNCTIONS: [Self; 17] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Neg,
        Self::Min,
        Self::Max,
        Self::Sin,
        Self::Cos,
        Self::IfNumber,
        Self::Gt,
        Self::Lt,
        Self::And,
        Self::Or,
        Self::Not,
        Self::IfAction,
        Self::Select,
    ];

    #[must_use]
    pub const fn output_type(self) -> ValueType {
        match self {
            Self::Act(_) | Self::IfAction | Self::Select => ValueType::Action,
            Self::Boolean(_) | Self::Gt | Self::Lt | Self::And | Self::Or | Self::Not => {
                ValueType::Boolean
            }
            Self::Sensor(_)
            | Self::Number(_)
            | Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::Neg
            | Self::Min
            | Self::Max
            | Self::Sin
            | Self::Cos
            | Self::IfNumber => ValueType::Number,
        }
    }

    #[must_use]
    pub const fn arg_types(self) -> &'static [ValueType] {
        match self {
            Self::Act(_) | Self::Sensor(_) | Self::Number(_) | Self::Boolean(_) => &[],
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::Min
            | Self::Max
            | Self::Gt
            | Self::Lt => NUMBER_2,
            Self::Neg | Self::Sin | Self::Cos | Self::Select => NUMBER_1,
            Self::And | Self::Or => BOOLEAN_2,
            Self::Not => BOOLEAN_1,
            Self::IfNumber => IF_NUMBER,
            Self::IfAction => IF_ACTION,
        }
    }

    #[must_use]
    pub const fn arity(self) -> usize {
        self.arg_types().len()
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.arity() == 0
    }

    /// Name of a function op as it appears in s-expressions; `None` for terminals.
    #[must_use]
    pub const fn function_name(self) -> Option<&'static str> {
        let name = match self {
            Self::Act(_) | Self::Sensor(_) | Self::Number(_) | Self::Boolean(_) => return None,
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Neg => "neg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::IfNumber => "if_number",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::IfAction => "if_action",
            Self::Select => "select",
        };
        Some(name)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Act(action) => write!(f, "{action}"),
            Self::Sensor(kind) => write!(f, "{kind}"),
            Self::Number(value) => write!(f, "{value:.3}"),
            Self::Boolean(value) => write!(f, "{value}"),
            op => f.write_str(op.function_name().unwrap_or("?")),
        }
    }
}

/// Optional primitive groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveSetConfig {
    /// `if_action` and `if_number`.
    pub conditionals: bool,
    /// `gt`, `lt`, `and`, `or`, `not`.
    pub comparisons: bool,
    /// `sin`, `cos` and the `[-π, π)` ephemeral constant.
    pub trigonometry: bool,
}

impl Default for PrimitiveSetConfig {
    fn default() -> Self {
        Self {
            conditionals: true,
            comparisons: true,
            trigonometry: false,
        }
    }
}

/// Random constant generators available as number terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ephemeral {
    /// Integer in `0..=10`.
    SmallInt,
    /// Uniform in `[-1, 1)`.
    Unit,
    /// Uniform in `[-π, π)`.
    Angle,
}

impl Ephemeral {
    #[must_use]
    pub fn sample<R>(self, rng: &mut R) -> f32
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::SmallInt => f32::from(rng.random_range(0..=10_u8)),
            Self::Unit => rng.random_range(-1.0..1.0),
            Self::Angle => rng.random_range(-PI..PI),
        }
    }
}

/// Registry of the ops enabled for a run.
#[derive(Debug, Clone)]
pub struct PrimitiveSet {
    config: PrimitiveSetConfig,
    functions: [Vec<Op>; ValueType::LEN],
    ephemerals: Vec<Ephemeral>,
}

impl Default for PrimitiveSet {
    fn default() -> Self {
        Self::new(PrimitiveSetConfig::default())
    }
}

impl PrimitiveSet {
    #[must_use]
    pub fn new(config: PrimitiveSetConfig) -> Self {
        let mut functions: [Vec<Op>; ValueType::LEN] = Default::default();
        for op in Op::FUNCTIONS.into_iter().filter(|op| enabled(config, *op)) {
            functions[op.output_type().index()].push(op);
        }
        let mut ephemerals = vec![Ephemeral::SmallInt, Ephemeral::Unit];
        if config.trigonometry {
            ephemerals.push(Ephemeral::Angle);
        }
        Self {
            config,
            functions,
            ephemerals,
        }
    }

    #[must_use]
    pub const fn config(&self) -> PrimitiveSetConfig {
        self.config
    }

    /// Enabled function ops producing `ty`.
    #[must_use]
    pub fn functions(&self, ty: ValueType) -> &[Op] {
        &self.functions[ty.index()]
    }

    /// Number of distinct terminal kinds producing `ty` (each ephemeral counts once).
    #[must_use]
    pub fn terminal_count(&self, ty: ValueType) -> usize {
        match ty {
            ValueType::Number => SensorKind::LEN + self.ephemerals.len(),
            ValueType::Boolean => 2,
            ValueType::Action => Action::LEN,
        }
    }

    /// Probability that grow initialization stops at a terminal for type `ty`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn terminal_ratio(&self, ty: ValueType) -> f64 {
        let terminals = self.terminal_count(ty) as f64;
        terminals / (terminals + self.functions(ty).len() as f64)
    }

    #[must_use]
    pub fn random_terminal<R>(&self, ty: ValueType, rng: &mut R) -> Op
    where
        R: Rng + ?Sized,
    {
        match ty {
            ValueType::Action => Op::Act(rng.random()),
            ValueType::Boolean => Op::Boolean(rng.random()),
            ValueType::Number => {
                let index = rng.random_range(0..self.terminal_count(ty));
                match SensorKind::ALL.get(index) {
                    Some(kind) => Op::Sensor(*kind),
                    None => Op::Number(self.ephemerals[index - SensorKind::LEN].sample(rng)),
                }
            }
        }
    }

    #[must_use]
    pub fn random_function<R>(&self, ty: ValueType, rng: &mut R) -> Option<Op>
    where
        R: Rng + ?Sized,
    {
        self.functions(ty).choose(rng).copied()
    }

    /// Returns `true` if `op` may appear in trees built from this set.
    #[must_use]
    pub fn contains(&self, op: Op) -> bool {
        match op {
            Op::Act(_) | Op::Sensor(_) | Op::Number(_) | Op::Boolean(_) => true,
            op => self.functions(op.output_type()).contains(&op),
        }
    }
}

const fn enabled(config: PrimitiveSetConfig, op: Op) -> bool {
    match op {
        Op::Sin | Op::Cos => config.trigonometry,
        Op::IfNumber | Op::IfAction => config.conditionals,
        Op::Gt | Op::Lt | Op::And | Op::Or | Op::Not => config.comparisons,
        _ => true,
    }
}
