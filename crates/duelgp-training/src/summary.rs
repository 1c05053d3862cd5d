//! In-memory records of a run, serializable for external tooling.

use duelgp_engine::{MatchResult, MatchSeed, Side};
use duelgp_program::Program;
use serde::{Deserialize, Serialize};

use crate::{Individual, Participant};

/// Distribution of one population's fitness in one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub best: f32,
    pub mean: f32,
    pub worst: f32,
    pub median: f32,
    pub std_dev: f32,
}

impl FitnessSummary {
    /// Summarizes unsorted values; `None` if there are none.
    ///
    /// ```
    /// use duelgp_training::FitnessSummary;
    ///
    /// let summary = FitnessSummary::new([4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
    /// assert_eq!(summary.best, 5.0);
    /// assert_eq!(summary.worst, 1.0);
    /// assert_eq!(summary.mean, 3.0);
    /// assert_eq!(summary.median, 3.0);
    /// ```
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);
        let worst = *values.first()?;
        let best = *values.last()?;
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let median = values[values.len() / 2];
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        Some(Self {
            best,
            mean,
            worst,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

/// The fittest individual of a population in one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestIndividual {
    pub program: Program,
    pub fitness: f32,
    pub depth: usize,
    pub size: usize,
}

impl BestIndividual {
    #[must_use]
    pub fn new(program: &Program, fitness: f32) -> Self {
        Self {
            program: program.clone(),
            fitness,
            depth: program.depth(),
            size: program.size(),
        }
    }
}

/// One population's share of a generation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub fitness: FitnessSummary,
    pub best: BestIndividual,
}

/// One played match, kept when `capture_matches` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Who drove robot A and robot B.
    pub participants: [Participant; 2],
    pub seed: MatchSeed,
    pub result: MatchResult,
}

/// Outcome of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    /// Records of population A and population B, in that order.
    pub populations: [PopulationRecord; 2],
    pub matches_played: usize,
    /// Matches stopped because a program failed to produce an action.
    pub invalid_matches: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<MatchRecord>,
}

impl GenerationRecord {
    #[must_use]
    pub const fn population(&self, side: Side) -> &PopulationRecord {
        &self.populations[side.index()]
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub seed: u64,
    pub generations: Vec<GenerationRecord>,
    /// Final populations A and B with their last-generation fitness.
    pub final_populations: [Vec<Individual>; 2],
    /// `true` if the plateau rule ended the run before the last generation.
    pub stopped_early: bool,
}

impl RunResult {
    #[must_use]
    pub fn last_generation(&self) -> Option<&GenerationRecord> {
        self.generations.last()
    }

    /// Best individual of `side` over all generations; the earliest one on ties.
    #[must_use]
    pub fn best_overall(&self, side: Side) -> Option<&BestIndividual> {
        self.generations
            .iter()
            .map(|record| &record.population(side).best)
            .reduce(|best, candidate| {
                if candidate.fitness > best.fitness {
                    candidate
                } else {
                    best
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_single_value() {
        let summary = FitnessSummary::new([2.5]).unwrap();
        assert!((summary.best - 2.5).abs() < f32::EPSILON);
        assert!((summary.worst - 2.5).abs() < f32::EPSILON);
        assert!(summary.std_dev.abs() < f32::EPSILON);
    }

    #[test]
    fn test_summary_of_nothing() {
        assert_eq!(FitnessSummary::new([]), None);
    }

    #[test]
    fn test_std_dev() {
        let summary = FitnessSummary::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((summary.mean - 5.0).abs() < 1e-6);
        assert!((summary.std_dev - 2.0).abs() < 1e-6);
    }
}
