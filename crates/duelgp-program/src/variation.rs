//! Bounded, type-preserving variation operators.
//!
//! Both operators only ever swap or regrow subtrees of matching output type, and
//! never return a tree deeper than [`VariationConfig::max_depth`]. When no
//! acceptable point is found within [`VariationConfig::max_attempts`] tries they
//! return `None` and the caller keeps the parents unchanged.

use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};

use crate::{Method, PrimitiveSet, Program, generate::generate, tree::Position};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariationConfig {
    /// Depth no offspring may exceed.
    pub max_depth: usize,
    /// Height limit of subtrees grown by mutation.
    pub mutation_max_depth: usize,
    /// Variation points tried before giving up.
    pub max_attempts: usize,
}

impl Default for VariationConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            mutation_max_depth: 2,
            max_attempts: 8,
        }
    }
}

/// One-point subtree crossover.
///
/// Picks a non-root point in `first` (the root when `first` is a single node), a
/// point of the same type in `second`, and swaps the two subtrees.
pub fn crossover<R>(
    first: &Program,
    second: &Program,
    config: &VariationConfig,
    rng: &mut R,
) -> Option<(Program, Program)>
where
    R: Rng + ?Sized,
{
    let first_points = first.root().positions();
    let second_points = second.root().positions();
    for _ in 0..config.max_attempts {
        let point = pick_point(&first_points, rng);
        let candidates: Vec<&Position> = second_points
            .iter()
            .filter(|other| other.value_type == point.value_type)
            .collect();
        let Some(other) = candidates.choose(rng) else {
            continue;
        };
        let (Some(from_first), Some(from_second)) = (
            first.root().get(point.index),
            second.root().get(other.index),
        ) else {
            continue;
        };
        let mut child_first = first.clone();
        let mut child_second = second.clone();
        child_first.replace(point.index, from_second.clone());
        child_second.replace(other.index, from_first.clone());
        if child_first.depth() <= config.max_depth && child_second.depth() <= config.max_depth {
            return Some((child_first, child_second));
        }
    }
    None
}

/// Uniform subtree mutation.
///
/// Replaces the subtree at a random point with a freshly grown one of the same
/// type, limited by both `mutation_max_depth` and the depth left under
/// `max_depth` at that point.
pub fn mutate<R>(
    program: &Program,
    pset: &PrimitiveSet,
    config: &VariationConfig,
    rng: &mut R,
) -> Option<Program>
where
    R: Rng + ?Sized,
{
    let points = program.root().positions();
    for _ in 0..config.max_attempts {
        let Some(point) = points.choose(rng) else {
            break;
        };
        let Some(budget) = config.max_depth.checked_sub(point.depth) else {
            continue;
        };
        let height = config.mutation_max_depth.min(budget);
        let subtree = generate(pset, point.value_type, 0, height, Method::Full, rng);
        let mut child = program.clone();
        child.replace(point.index, subtree);
        if child.depth() <= config.max_depth {
            return Some(child);
        }
    }
    None
}

fn pick_point<'a, R>(points: &'a [Position], rng: &mut R) -> &'a Position
where
    R: Rng + ?Sized,
{
    if points.len() > 1 {
        &points[rng.random_range(1..points.len())]
    } else {
        &points[0]
    }
}
