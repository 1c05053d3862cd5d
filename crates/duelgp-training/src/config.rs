use duelgp_engine::{MatchConfig, Side, StartPositions};
use duelgp_program::{PrimitiveSetConfig, VariationConfig};
use serde::{Deserialize, Serialize};

use crate::{FitnessAggregation, PairingScheme, ScoringPolicy};

/// Configuration that cannot start a run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("generation count must be at least 1")]
    NoGenerations,
    #[display("tournament size must be at least 1")]
    EmptyTournament,
    #[display("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[display("elitism ({elitism}) exceeds the population size ({population_size})")]
    TooManyElites {
        elitism: usize,
        population_size: usize,
    },
    #[display("max depth ({max_depth}) must be at least 1 and at least the initial max depth ({init_max_depth})")]
    MaxDepth {
        max_depth: usize,
        init_max_depth: usize,
    },
    #[display("initial depth range {min}..={max} is empty")]
    InitDepthRange { min: usize, max: usize },
    #[display("max ticks must be at least 1")]
    NoTicks,
    #[display("arena size must be positive and finite, got {width} x {height}")]
    ArenaSize { width: f32, height: f32 },
    #[display("robots must start with at least 1 health")]
    NoHealth,
    #[display("{name} must be non-negative and finite, got {value}")]
    NegativeParameter { name: &'static str, value: f32 },
    #[display("random-sample pairing needs at least 1 opponent")]
    NoOpponents,
    #[display("fixed start position of robot {side} is outside the arena or inside a wall")]
    StartOutsideArena { side: Side },
    #[display("at least 1 variation attempt is required")]
    NoVariationAttempts,
    #[display("plateau window must be at least 1 generation")]
    EmptyPlateauWindow,
    #[display("invalid-program score ({penalty}) must be below the lowest valid match score ({lowest_valid})")]
    PenaltyNotMinimal { penalty: f32, lowest_valid: f32 },
    #[display("individual {index} of population {side} has depth {depth}, above the max depth ({max_depth})")]
    SeededTooDeep {
        side: Side,
        index: usize,
        depth: usize,
        max_depth: usize,
    },
    #[display("population {side} has {found} individuals, expected {expected}")]
    PopulationSize {
        side: Side,
        expected: usize,
        found: usize,
    },
}

/// Early-stop rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateauConfig {
    /// Number of generations looked back over.
    pub generations: usize,
    /// Improvement of the best fitness that still counts as a plateau.
    pub min_improvement: f32,
}

impl Default for PlateauConfig {
    fn default() -> Self {
        Self {
            generations: 10,
            min_improvement: 0.0,
        }
    }
}

/// Everything a co-evolutionary run depends on.
///
/// Two runs with equal configurations produce equal results, whether matches are
/// evaluated in parallel or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Individuals per population.
    pub population_size: usize,
    /// Breeding rounds after the initial evaluation, each followed by an evaluation.
    pub generations: usize,
    pub tournament_size: usize,
    /// Chance that two selected parents are crossed.
    pub crossover_probability: f64,
    /// Chance that an uncrossed parent copy is mutated.
    pub mutation_probability: f64,
    /// Best individuals copied unchanged into the next generation.
    pub elitism: usize,
    pub max_depth: usize,
    pub init_min_depth: usize,
    pub init_max_depth: usize,
    pub mutation_max_depth: usize,
    pub max_variation_attempts: usize,
    pub primitives: PrimitiveSetConfig,
    pub pairing: PairingScheme,
    pub scoring: ScoringPolicy,
    pub aggregation: FitnessAggregation,
    /// Arena, physics (including starting health and ammo), tick limit and start
    /// positions of every match.
    #[serde(rename = "match")]
    pub match_config: MatchConfig,
    pub plateau: Option<PlateauConfig>,
    /// Keep every match's participants, seed and result in the run result.
    pub capture_matches: bool,
    /// Play a generation's matches on the rayon thread pool.
    pub parallel: bool,
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 30,
            tournament_size: 3,
            crossover_probability: 0.5,
            mutation_probability: 0.1,
            elitism: 1,
            max_depth: 8,
            init_min_depth: 3,
            init_max_depth: 5,
            mutation_max_depth: 2,
            max_variation_attempts: 8,
            primitives: PrimitiveSetConfig::default(),
            pairing: PairingScheme::default(),
            scoring: ScoringPolicy::default(),
            aggregation: FitnessAggregation::default(),
            match_config: MatchConfig::default(),
            plateau: None,
            capture_matches: false,
            parallel: true,
            seed: 0,
        }
    }
}

impl RunConfig {
    #[must_use]
    pub fn variation(&self) -> VariationConfig {
        VariationConfig {
            max_depth: self.max_depth,
            mutation_max_depth: self.mutation_max_depth,
            max_attempts: self.max_variation_attempts,
        }
    }

    /// Checks every parameter; [`run`](crate::run) calls this before any simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        check_probability("crossover probability", self.crossover_probability)?;
        check_probability("mutation probability", self.mutation_probability)?;
        if self.elitism > self.population_size {
            return Err(ConfigError::TooManyElites {
                elitism: self.elitism,
                population_size: self.population_size,
            });
        }
        if self.init_min_depth > self.init_max_depth {
            return Err(ConfigError::InitDepthRange {
                min: self.init_min_depth,
                max: self.init_max_depth,
            });
        }
        if self.max_depth == 0 || self.max_depth < self.init_max_depth {
            return Err(ConfigError::MaxDepth {
                max_depth: self.max_depth,
                init_max_depth: self.init_max_depth,
            });
        }
        if self.max_variation_attempts == 0 {
            return Err(ConfigError::NoVariationAttempts);
        }
        if let PairingScheme::RandomSample { opponents: 0 } = self.pairing {
            return Err(ConfigError::NoOpponents);
        }
        for (name, value) in self.scoring.weights() {
            check_non_negative(name, value)?;
        }
        if !self.scoring.invalid_program.is_finite() {
            return Err(ConfigError::NegativeParameter {
                name: "invalid_program",
                value: self.scoring.invalid_program,
            });
        }
        let lowest_valid = self
            .scoring
            .lowest_valid_score(self.match_config.physics.max_health);
        if self.scoring.invalid_program >= lowest_valid {
            return Err(ConfigError::PenaltyNotMinimal {
                penalty: self.scoring.invalid_program,
                lowest_valid,
            });
        }
        if let Some(plateau) = &self.plateau {
            if plateau.generations == 0 {
                return Err(ConfigError::EmptyPlateauWindow);
            }
            check_non_negative("plateau min_improvement", plateau.min_improvement)?;
        }
        self.validate_match()
    }

    fn validate_match(&self) -> Result<(), ConfigError> {
        let MatchConfig {
            arena,
            physics,
            max_ticks,
            start_positions,
        } = &self.match_config;
        if *max_ticks == 0 {
            return Err(ConfigError::NoTicks);
        }
        let valid_extent = |v: f32| v.is_finite() && v > 0.0;
        if !valid_extent(arena.width) || !valid_extent(arena.height) {
            return Err(ConfigError::ArenaSize {
                width: arena.width,
                height: arena.height,
            });
        }
        if physics.max_health == 0 {
            return Err(ConfigError::NoHealth);
        }
        check_probability("hit probability", f64::from(physics.hit_probability))?;
        check_non_negative("move step", physics.move_step)?;
        check_non_negative("turn step", physics.turn_step)?;
        check_non_negative("shot range", physics.shot_range)?;
        check_non_negative("shot half-angle", physics.shot_half_angle)?;
        match start_positions {
            StartPositions::Random { margin } => check_non_negative("start margin", *margin)?,
            StartPositions::Fixed { a, b } => {
                for (side, pose) in Side::ALL.into_iter().zip([a, b]) {
                    if !pose.heading.is_finite() || !arena.is_legal(pose.position) {
                        return Err(ConfigError::StartOutsideArena { side });
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use duelgp_engine::Pose;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(RunConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let cases: Vec<(RunConfig, ConfigError)> = vec![
            (
                RunConfig {
                    population_size: 0,
                    ..RunConfig::default()
                },
                ConfigError::EmptyPopulation,
            ),
            (
                RunConfig {
                    generations: 0,
                    ..RunConfig::default()
                },
                ConfigError::NoGenerations,
            ),
            (
                RunConfig {
                    tournament_size: 0,
                    ..RunConfig::default()
                },
                ConfigError::EmptyTournament,
            ),
            (
                RunConfig {
                    mutation_probability: -0.1,
                    ..RunConfig::default()
                },
                ConfigError::Probability {
                    name: "mutation probability",
                    value: -0.1,
                },
            ),
            (
                RunConfig {
                    population_size: 4,
                    elitism: 5,
                    ..RunConfig::default()
                },
                ConfigError::TooManyElites {
                    elitism: 5,
                    population_size: 4,
                },
            ),
            (
                RunConfig {
                    max_depth: 4,
                    ..RunConfig::default()
                },
                ConfigError::MaxDepth {
                    max_depth: 4,
                    init_max_depth: 5,
                },
            ),
            (
                RunConfig {
                    init_min_depth: 6,
                    ..RunConfig::default()
                },
                ConfigError::InitDepthRange { min: 6, max: 5 },
            ),
            (
                RunConfig {
                    pairing: PairingScheme::RandomSample { opponents: 0 },
                    ..RunConfig::default()
                },
                ConfigError::NoOpponents,
            ),
            (
                RunConfig {
                    max_variation_attempts: 0,
                    ..RunConfig::default()
                },
                ConfigError::NoVariationAttempts,
            ),
            (
                RunConfig {
                    plateau: Some(PlateauConfig {
                        generations: 0,
                        min_improvement: 0.0,
                    }),
                    ..RunConfig::default()
                },
                ConfigError::EmptyPlateauWindow,
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn test_nan_probability_is_rejected() {
        let config = RunConfig {
            crossover_probability: f64::NAN,
            ..RunConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Probability {
                name: "crossover probability",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_invalid_match_setup() {
        let mut config = RunConfig::default();
        config.match_config.max_ticks = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoTicks));

        let mut config = RunConfig::default();
        config.match_config.arena.width = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ArenaSize { .. })
        ));

        let mut config = RunConfig::default();
        config.match_config.physics.max_health = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoHealth));

        let mut config = RunConfig::default();
        config.scoring.damage_dealt = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeParameter {
                name: "damage_dealt",
                ..
            })
        ));

        let mut config = RunConfig::default();
        config.match_config.start_positions = StartPositions::Fixed {
            a: Pose::new(10.0, 10.0, 0.0),
            b: Pose::new(500.0, 10.0, 0.0),
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::StartOutsideArena { side: Side::B })
        );
    }

    #[test]
    fn test_invalid_program_penalty_must_stay_below_valid_scores() {
        let mut config = RunConfig::default();
        config.scoring.damage_taken = 2.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::PenaltyNotMinimal {
                penalty: -100.0,
                lowest_valid: -200.0,
            })
        );

        config.scoring.invalid_program = -200.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PenaltyNotMinimal { .. })
        ));

        config.scoring.invalid_program = -300.0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RunConfig =
            serde_json::from_str(r#"{ "population_size": 8, "match": { "max_ticks": 20 } }"#)
                .unwrap();
        assert_eq!(config.population_size, 8);
        assert_eq!(config.match_config.max_ticks, 20);
        assert_eq!(config.generations, RunConfig::default().generations);
    }
}
