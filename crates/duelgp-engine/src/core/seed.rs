use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Seed of a single match's private random stream.
///
/// Matches never share a generator. Each one derives its seed from the run seed and
/// its coordinates (generation index, pairing index), so a match plays out the same
/// way no matter which thread runs it or in which order.
///
/// # Example
///
/// ```
/// use duelgp_engine::MatchSeed;
///
/// let a = MatchSeed::derive(42, 3, 17);
/// let b = MatchSeed::derive(42, 3, 17);
/// assert_eq!(a, b);
/// assert_ne!(a, MatchSeed::derive(42, 3, 18));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchSeed(u64);

impl MatchSeed {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    #[must_use]
    pub fn derive(run_seed: u64, generation: u64, pairing: u64) -> Self {
        Self(derive_seed(run_seed, &[generation, pairing]))
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::seed_from_u64(self.0)
    }
}

/// Mixes `parts` into `base` to produce an independent 64-bit seed.
#[must_use]
pub fn derive_seed(base: u64, parts: &[u64]) -> u64 {
    parts
        .iter()
        .fold(splitmix64(base), |acc, part| splitmix64(acc ^ splitmix64(*part)))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
