//! Turning match results into fitness.

use duelgp_engine::{MatchResult, Side};
use serde::{Deserialize, Serialize};

/// Weights of one match's contributions to a participant's score.
///
/// With `win = 1` and every other weight `0`, combined with
/// [`FitnessAggregation::Sum`], fitness is the number of opponents eliminated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Added when the participant eliminated its opponent and survived.
    pub win: f32,
    /// Added on a timeout or mutual elimination.
    pub draw: f32,
    /// Per point of damage dealt.
    pub damage_dealt: f32,
    /// Per point of damage taken (subtracted).
    pub damage_taken: f32,
    /// Scaled by the fraction of `max_ticks` survived.
    pub survival: f32,
    /// Score given to the offending participant of an invalid-program match.
    pub invalid_program: f32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            win: 1.0,
            draw: 0.0,
            damage_dealt: 0.01,
            damage_taken: 0.0,
            survival: 0.1,
            invalid_program: -100.0,
        }
    }
}

impl ScoringPolicy {
    /// Named weights that must be non-negative.
    #[must_use]
    pub fn weights(&self) -> [(&'static str, f32); 5] {
        [
            ("win", self.win),
            ("draw", self.draw),
            ("damage_dealt", self.damage_dealt),
            ("damage_taken", self.damage_taken),
            ("survival", self.survival),
        ]
    }

    /// Lowest score a participant without an invalid program can get in a match
    /// between robots starting with `max_health`.
    ///
    /// Only damage taken is subtracted, and a robot cannot take more damage than
    /// its health.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn lowest_valid_score(&self, max_health: u32) -> f32 {
        -self.damage_taken * max_health as f32
    }

    /// Score of `side` in `result`.
    ///
    /// Non-decreasing in damage dealt and survival, non-increasing in damage taken.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn score(&self, result: &MatchResult, side: Side, max_ticks: u32) -> f32 {
        if result.is_invalid_for(side) {
            return self.invalid_program;
        }
        let report = result.report(side);
        let mut score = 0.0;
        if result.winner() == Some(side) {
            score += self.win;
        }
        if result.is_draw() {
            score += self.draw;
        }
        score += self.damage_dealt * report.damage_dealt as f32;
        score -= self.damage_taken * report.damage_taken as f32;
        if max_ticks > 0 {
            score += self.survival * (report.survival_ticks as f32 / max_ticks as f32);
        }
        score
    }
}

/// How an individual's match scores combine into one fitness value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessAggregation {
    Sum,
    #[default]
    Mean,
}

impl FitnessAggregation {
    /// Combines `scores`; an individual without matches gets `0`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn aggregate(self, scores: &[f32]) -> f32 {
        if scores.is_empty() {
            return 0.0;
        }
        let sum = scores.iter().sum::<f32>();
        match self {
            Self::Sum => sum,
            Self::Mean => sum / scores.len() as f32,
        }
    }
}
