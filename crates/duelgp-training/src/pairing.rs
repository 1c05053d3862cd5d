//! Which matches a generation plays.
//!
//! | scheme              | matches           | credited to                        |
//! |---------------------|-------------------|------------------------------------|
//! | `round_robin`       | `N × N`           | both members                       |
//! | `random_sample`     | `2 × N × k`       | both members                       |
//! | `best_of_previous`  | `2 × N`           | the member (not the champion)      |
//!
//! Population A always drives robot A.

use duelgp_engine::Side;
use duelgp_program::Program;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Population;

/// How opponents are chosen each generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PairingScheme {
    /// Every member of A plays every member of B once.
    RoundRobin,
    /// Every member of either population plays `opponents` members of the other
    /// population, drawn uniformly with replacement.
    RandomSample { opponents: usize },
    /// Every member plays the other population's best individual of the previous
    /// generation. The first generation uses `RandomSample { opponents: 1 }`.
    BestOfPrevious,
}

impl Default for PairingScheme {
    fn default() -> Self {
        Self::RandomSample { opponents: 5 }
    }
}

/// A match slot's occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Participant {
    /// Member `index` of the population driving this robot. Its fitness is credited.
    Member { index: usize },
    /// Frozen best of the previous generation. Not credited.
    Champion,
}

/// A planned match with its controllers resolved.
#[derive(Debug, Clone, Copy)]
pub struct Pairing<'a> {
    pub participants: [Participant; 2],
    pub programs: [&'a Program; 2],
}

/// Plans one generation's matches.
///
/// `champions` holds the previous generation's best programs of A and B; without
/// them `BestOfPrevious` falls back to one random opponent each.
pub fn plan<'a, R>(
    scheme: PairingScheme,
    populations: [&'a Population; 2],
    champions: Option<&'a [Program; 2]>,
    rng: &mut R,
) -> Vec<Pairing<'a>>
where
    R: Rng + ?Sized,
{
    let [a, b] = populations;
    let member = move |side: Side, index: usize| -> (Participant, &'a Program) {
        let program = populations[side.index()].individuals()[index].program();
        (Participant::Member { index }, program)
    };
    let pairing = |(first, program_a): (Participant, &'a Program),
                   (second, program_b): (Participant, &'a Program)| Pairing {
        participants: [first, second],
        programs: [program_a, program_b],
    };

    match (scheme, champions) {
        (PairingScheme::RoundRobin, _) => (0..a.len())
            .flat_map(|i| (0..b.len()).map(move |j| (i, j)))
            .map(|(i, j)| pairing(member(Side::A, i), member(Side::B, j)))
            .collect(),
        (PairingScheme::BestOfPrevious, Some([champion_a, champion_b])) => {
            let against_b = (0..a.len())
                .map(|i| pairing(member(Side::A, i), (Participant::Champion, champion_b)));
            let against_a = (0..b.len())
                .map(|j| pairing((Participant::Champion, champion_a), member(Side::B, j)));
            against_b.chain(against_a).collect()
        }
        (PairingScheme::RandomSample { opponents }, _) => {
            random_sample(opponents, [a.len(), b.len()], rng)
                .into_iter()
                .map(|(i, j)| pairing(member(Side::A, i), member(Side::B, j)))
                .collect()
        }
        (PairingScheme::BestOfPrevious, None) => random_sample(1, [a.len(), b.len()], rng)
            .into_iter()
            .map(|(i, j)| pairing(member(Side::A, i), member(Side::B, j)))
            .collect(),
    }
}

/// Index pairs `(a, b)`: first every A member's draws, then every B member's.
fn random_sample<R>(opponents: usize, sizes: [usize; 2], rng: &mut R) -> Vec<(usize, usize)>
where
    R: Rng + ?Sized,
{
    let [len_a, len_b] = sizes;
    let mut pairs = Vec::with_capacity(opponents * (len_a + len_b));
    if len_a == 0 || len_b == 0 {
        return pairs;
    }
    for i in 0..len_a {
        pairs.extend((0..opponents).map(|_| (i, rng.random_range(0..len_b))));
    }
    for j in 0..len_b {
        pairs.extend((0..opponents).map(|_| (rng.random_range(0..len_a), j)));
    }
    pairs
}
