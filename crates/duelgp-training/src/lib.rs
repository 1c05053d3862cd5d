//! Competitive co-evolution of duel-robot programs.
//!
//! Two populations of [`Program`](duelgp_program::Program)s evolve against each
//! other. No fixed objective exists: an individual's fitness is whatever it earns in
//! matches against the opposing population this generation, so each population's
//! fitness landscape moves as the other one evolves.
//!
//! # How a Run Works
//!
//! 1. **Validate** - [`RunConfig::validate`] rejects bad parameters before any work
//! 2. **Initialize** - both populations are filled by ramped half-and-half
//! 3. **Pair** - the [`PairingScheme`] decides which matches are played
//! 4. **Play** - matches run independently, each on its own seeded random stream
//! 5. **Score** - a [`ScoringPolicy`] scores every match, a [`FitnessAggregation`]
//!    combines the scores per individual
//! 6. **Breed** - [`PopulationEvolver`] applies elitism, tournament selection,
//!    crossover and mutation to each population on its own
//! 7. **Repeat** pairing, playing and scoring on the offspring; the initial
//!    evaluation is generation 0 and every breeding round adds one generation,
//!    until [`RunConfig::generations`] rounds are done or fitness plateaus
//!
//! ```text
//! RunConfig
//!     ↓ validated by
//! Coevolution ──plans──→ Pairings ──played by──→ duelgp_engine::play
//!     ↑                                                  ↓
//! PopulationEvolver ←──fitness── ScoringPolicy ←── MatchResult
//!     ↓ records
//! RunResult (GenerationRecord per generation)
//! ```
//!
//! # Reproducibility
//!
//! All randomness derives from [`RunConfig::seed`]: initialization, pairing and
//! breeding use one stream per population and generation, and every match uses a
//! [`MatchSeed`](duelgp_engine::MatchSeed) derived from its generation and pairing
//! index. Parallel and sequential evaluation give identical results.
//!
//! # Current Limitations
//!
//! - **Non-stationary fitness only**: there is no hall of fame or archive of past
//!   opponents, so cycling between strategies is not detected
//! - **Two populations**: multi-robot matches and more than two populations are not
//!   supported

pub use self::{
    coevolution::{Coevolution, run},
    config::{ConfigError, PlateauConfig, RunConfig},
    evolver::{PopulationEvolver, VariationStats},
    pairing::{Pairing, PairingScheme, Participant, plan},
    population::{Individual, Population},
    scoring::{FitnessAggregation, ScoringPolicy},
    summary::{
        BestIndividual, FitnessSummary, GenerationRecord, MatchRecord, PopulationRecord,
        RunResult,
    },
};

mod coevolution;
mod config;
mod evaluation;
mod evolver;
mod pairing;
mod population;
mod scoring;
mod summary;
