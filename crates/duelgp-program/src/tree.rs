use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Op, ValueType};

/// Reason a tree is not an executable program.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ProgramError {
    #[display("program must produce an action, but its root produces a {found}")]
    RootType { found: ValueType },
    #[display("node {index} (`{op}`) expects {expected} arguments, found {found}")]
    Arity {
        index: usize,
        op: Op,
        expected: usize,
        found: usize,
    },
    #[display("argument {argument} of node {index} (`{op}`) must be a {expected}, found a {found}")]
    TypeMismatch {
        index: usize,
        op: Op,
        argument: usize,
        expected: ValueType,
        found: ValueType,
    },
    #[display("program depth {depth} exceeds the limit of {max_depth}")]
    TooDeep { depth: usize, max_depth: usize },
    #[display("node {index} holds a non-finite constant")]
    NonFiniteConstant { index: usize },
}

/// One node of a program tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    op: Op,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

/// Location of a node in a tree, used to pick variation points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Preorder index; the root is `0`.
    pub index: usize,
    /// Distance from the root; the root is `0`.
    pub depth: usize,
    pub value_type: ValueType,
}

impl Node {
    /// Builds a node. Arity and types are not checked here; see [`Program::validate`].
    #[must_use]
    pub const fn new(op: Op, children: Vec<Node>) -> Self {
        Self { op, children }
    }

    #[must_use]
    pub const fn leaf(op: Op) -> Self {
        Self::new(op, Vec::new())
    }

    #[must_use]
    pub const fn op(&self) -> Op {
        self.op
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    #[must_use]
    pub const fn output_type(&self) -> ValueType {
        self.op.output_type()
    }

    /// Longest root-to-leaf edge count; a single leaf has depth `0`.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(Self::depth)
            .max()
            .map_or(0, |depth| depth + 1)
    }

    /// Number of nodes in the subtree.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Self::size).sum::<usize>()
    }

    /// Nodes in preorder (parent before children, children left to right).
    pub fn preorder(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Every node's preorder index, depth and output type.
    #[must_use]
    pub fn positions(&self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(self.size());
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            positions.push(Position {
                index: positions.len(),
                depth,
                value_type: node.output_type(),
            });
            stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
        positions
    }

    /// The node at preorder `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.preorder().nth(index)
    }

    pub(crate) fn get_mut(&mut self, mut index: usize) -> Option<&mut Node> {
        if index == 0 {
            return Some(self);
        }
        index -= 1;
        for child in &mut self.children {
            let size = child.size();
            if index < size {
                return child.get_mut(index);
            }
            index -= size;
        }
        None
    }

    /// Replaces the subtree at preorder `index`, returning the old one.
    pub(crate) fn replace(&mut self, index: usize, subtree: Node) -> Option<Node> {
        let slot = self.get_mut(index)?;
        Some(std::mem::replace(slot, subtree))
    }

    fn check(&self, index: usize) -> Result<(), ProgramError> {
        let expected = self.op.arg_types();
        if let Op::Number(value) = self.op
            && !value.is_finite()
        {
            return Err(ProgramError::NonFiniteConstant { index });
        }
        if expected.len() != self.children.len() {
            return Err(ProgramError::Arity {
                index,
                op: self.op,
                expected: expected.len(),
                found: self.children.len(),
            });
        }
        let mut child_index = index + 1;
        for (argument, (child, expected)) in self.children.iter().zip(expected).enumerate() {
            let found = child.output_type();
            if found != *expected {
                return Err(ProgramError::TypeMismatch {
                    index,
                    op: self.op,
                    argument,
                    expected: *expected,
                    found,
                });
            }
            child.check(child_index)?;
            child_index += child.size();
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            return write!(f, "{}", self.op);
        }
        write!(f, "({}", self.op)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}

/// An evolved controller: a typed expression tree whose root yields an action.
///
/// Rendered as an s-expression:
///
/// ```
/// use duelgp_engine::{Action, SensorKind};
/// use duelgp_program::{Node, Op, Program};
///
/// let program = Program::new(Node::new(
///     Op::IfAction,
///     vec![
///         Node::new(
///             Op::Lt,
///             vec![
///                 Node::leaf(Op::Sensor(SensorKind::EnemyDistance)),
///                 Node::leaf(Op::Number(50.0)),
///             ],
///         ),
///         Node::leaf(Op::Act(Action::Shoot)),
///         Node::leaf(Op::Act(Action::TurnLeft)),
///     ],
/// ));
/// assert_eq!(
///     program.to_string(),
///     "(if_action (lt enemy_distance 50.000) shoot turn_left)"
/// );
/// assert_eq!(program.depth(), 2);
/// assert_eq!(program.size(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    root: Node,
}

impl Program {
    #[must_use]
    pub const fn new(root: Node) -> Self {
        Self { root }
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub fn into_root(self) -> Node {
        self.root
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Checks that the tree is well typed, has correct arities, holds only finite
    /// constants and is no deeper than `max_depth`.
    pub fn validate(&self, max_depth: usize) -> Result<(), ProgramError> {
        let found = self.root.output_type();
        if found != ValueType::Action {
            return Err(ProgramError::RootType { found });
        }
        self.root.check(0)?;
        let depth = self.depth();
        if depth > max_depth {
            return Err(ProgramError::TooDeep { depth, max_depth });
        }
        Ok(())
    }

    pub(crate) fn replace(&mut self, index: usize, subtree: Node) -> Option<Node> {
        self.root.replace(index, subtree)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}
