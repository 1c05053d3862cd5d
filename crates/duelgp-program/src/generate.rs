use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Node, PrimitiveSet, Program, ValueType};

/// Tree-building strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Every branch reaches the chosen height.
    Full,
    /// Branches may stop early once `min_depth` is reached.
    Grow,
}

/// Builds a random subtree producing `ty`.
///
/// A target height is drawn uniformly from `min_depth..=max_depth`; the result is
/// never deeper than that height. A branch also stops early when no function
/// produces the required type.
pub fn generate<R>(
    pset: &PrimitiveSet,
    ty: ValueType,
    min_depth: usize,
    max_depth: usize,
    method: Method,
    rng: &mut R,
) -> Node
where
    R: Rng + ?Sized,
{
    let min_depth = min_depth.min(max_depth);
    let height = rng.random_range(min_depth..=max_depth);
    build(pset, ty, 0, min_depth, height, method, rng)
}

fn build<R>(
    pset: &PrimitiveSet,
    ty: ValueType,
    depth: usize,
    min_depth: usize,
    height: usize,
    method: Method,
    rng: &mut R,
) -> Node
where
    R: Rng + ?Sized,
{
    let stop = depth >= height
        || match method {
            Method::Full => false,
            Method::Grow => depth >= min_depth && rng.random_bool(pset.terminal_ratio(ty)),
        };
    let function = if stop {
        None
    } else {
        pset.random_function(ty, rng)
    };
    let Some(op) = function else {
        return Node::leaf(pset.random_terminal(ty, rng));
    };
    let children = op
        .arg_types()
        .iter()
        .map(|arg| build(pset, *arg, depth + 1, min_depth, height, method, rng))
        .collect();
    Node::new(op, children)
}

/// Builds a random program with full or grow (each with probability 0.5).
pub fn ramped_half_and_half<R>(
    pset: &PrimitiveSet,
    min_depth: usize,
    max_depth: usize,
    rng: &mut R,
) -> Program
where
    R: Rng + ?Sized,
{
    let method = if rng.random_bool(0.5) {
        Method::Full
    } else {
        Method::Grow
    };
    Program::new(generate(
        pset,
        ValueType::Action,
        min_depth,
        max_depth,
        method,
        rng,
    ))
}
