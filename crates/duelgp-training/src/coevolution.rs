//! The generational loop driving both populations.
//!
//! Each generation:
//!
//! 1. **Pairing** - plan the matches between population A and population B
//! 2. **Evaluation** - play them (in parallel if configured) and aggregate fitness
//!    once all of them are done
//! 3. **Record** - summarize fitness and keep each population's best individual
//! 4. **Breeding** - selection and variation, independently per population
//!
//! Populations are read-only while matches run; only breeding replaces them.

use duelgp_engine::{Side, derive_seed};
use duelgp_program::{PrimitiveSet, Program};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use tracing::{debug, info};

use crate::{
    BestIndividual, ConfigError, GenerationRecord, MatchRecord, PlateauConfig, Population,
    PopulationEvolver, PopulationRecord, RunConfig, RunResult, VariationStats,
    evaluation::{aggregate_fitness, play_all},
    pairing::plan,
};

const INIT_STREAM: u64 = 1;
const PAIRING_STREAM: u64 = 2;
const VARIATION_STREAM: u64 = 3;

fn stream_rng(seed: u64, stream: u64, generation: usize, lane: u64) -> Pcg32 {
    Pcg32::seed_from_u64(derive_seed(seed, &[stream, generation as u64, lane]))
}

/// Two co-evolving populations and their history.
#[derive(Debug)]
pub struct Coevolution<'a> {
    config: &'a RunConfig,
    primitives: PrimitiveSet,
    populations: [Population; 2],
    champions: Option<[Program; 2]>,
    generation: usize,
    history: Vec<GenerationRecord>,
}

impl<'a> Coevolution<'a> {
    /// Validates `config` and creates both initial populations.
    pub fn new(config: &'a RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let primitives = PrimitiveSet::new(config.primitives);
        let populations = Side::ALL.map(|side| {
            let mut rng = stream_rng(config.seed, INIT_STREAM, 0, side.index() as u64);
            Population::random(
                &primitives,
                config.population_size,
                config.init_min_depth,
                config.init_max_depth,
                &mut rng,
            )
        });
        Ok(Self {
            config,
            primitives,
            populations,
            champions: None,
            generation: 0,
            history: vec![],
        })
    }

    /// Starts from given populations instead of random ones, e.g. to continue from
    /// a previous run's final populations.
    ///
    /// Every seeded program must respect `config.max_depth`. Structurally malformed
    /// programs are accepted; their matches end as invalid-program matches.
    pub fn with_populations(
        config: &'a RunConfig,
        populations: [Population; 2],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for (side, population) in Side::ALL.into_iter().zip(&populations) {
            if population.len() != config.population_size {
                return Err(ConfigError::PopulationSize {
                    side,
                    expected: config.population_size,
                    found: population.len(),
                });
            }
            for (index, individual) in population.individuals().iter().enumerate() {
                let depth = individual.program().depth();
                if depth > config.max_depth {
                    return Err(ConfigError::SeededTooDeep {
                        side,
                        index,
                        depth,
                        max_depth: config.max_depth,
                    });
                }
            }
        }
        Ok(Self {
            config,
            primitives: PrimitiveSet::new(config.primitives),
            populations,
            champions: None,
            generation: 0,
            history: vec![],
        })
    }

    /// Index of the current generation.
    #[must_use]
    pub const fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub const fn populations(&self) -> &[Population; 2] {
        &self.populations
    }

    #[must_use]
    pub fn history(&self) -> &[GenerationRecord] {
        &self.history
    }

    /// Plays the current generation's matches, assigns fitness and records the
    /// generation.
    pub fn evaluate(&mut self) -> &GenerationRecord {
        let config = self.config;
        let generation = self.generation;
        let sizes = self.populations.each_ref().map(Population::len);

        let (fitness, matches, matches_played, invalid_matches) = {
            let mut rng = stream_rng(config.seed, PAIRING_STREAM, generation, 0);
            let pairings = plan(
                config.pairing,
                self.populations.each_ref(),
                self.champions.as_ref(),
                &mut rng,
            );
            let played = play_all(
                &pairings,
                &config.match_config,
                config.seed,
                generation,
                config.parallel,
            );
            let fitness = aggregate_fitness(
                &pairings,
                &played.results,
                sizes,
                &config.scoring,
                config.aggregation,
                config.match_config.max_ticks,
            );
            let invalid_matches = played.invalid_count();
            let matches: Vec<MatchRecord> = if config.capture_matches {
                pairings
                    .iter()
                    .zip(played.seeds)
                    .zip(played.results)
                    .map(|((pairing, seed), result)| MatchRecord {
                        participants: pairing.participants,
                        seed,
                        result,
                    })
                    .collect()
            } else {
                vec![]
            };
            (fitness, matches, pairings.len(), invalid_matches)
        };

        for (population, fitness) in self.populations.iter_mut().zip(fitness) {
            population.assign_fitness(fitness);
        }
        let populations = self.populations.each_ref().map(population_record);
        self.champions = Some(populations.each_ref().map(|record| record.best.program.clone()));

        let record = GenerationRecord {
            generation,
            populations,
            matches_played,
            invalid_matches,
            matches,
        };
        let [a, b] = &record.populations;
        info!(
            generation,
            best_a = a.fitness.best,
            mean_a = a.fitness.mean,
            best_b = b.fitness.best,
            mean_b = b.fitness.mean,
            matches = matches_played,
            invalid = invalid_matches,
            "generation evaluated"
        );
        self.history.push(record);
        &self.history[self.history.len() - 1]
    }

    /// Replaces both populations with their offspring and moves to the next
    /// generation.
    pub fn advance(&mut self) -> [VariationStats; 2] {
        let config = self.config;
        let evolver = PopulationEvolver {
            elite_count: config.elitism,
            tournament_size: config.tournament_size,
            crossover_probability: config.crossover_probability,
            mutation_probability: config.mutation_probability,
            primitives: &self.primitives,
            variation: config.variation(),
        };
        let mut stats = [VariationStats::default(); 2];
        for side in Side::ALL {
            let mut rng = stream_rng(
                config.seed,
                VARIATION_STREAM,
                self.generation,
                side.index() as u64,
            );
            let (next, side_stats) = evolver.evolve(&self.populations[side.index()], &mut rng);
            self.populations[side.index()] = next;
            stats[side.index()] = side_stats;
            debug!(
                generation = self.generation,
                population = %side,
                crossovers = side_stats.crossovers,
                crossover_fallbacks = side_stats.crossover_fallbacks,
                mutations = side_stats.mutations,
                mutation_fallbacks = side_stats.mutation_fallbacks,
                "offspring bred"
            );
        }
        self.generation += 1;
        stats
    }

    /// Returns `true` if the plateau rule says to stop after the last evaluation.
    #[must_use]
    pub fn plateau_reached(&self) -> bool {
        self.config
            .plateau
            .as_ref()
            .is_some_and(|plateau| is_plateau(plateau, &self.history))
    }

    #[must_use]
    pub fn into_result(self, stopped_early: bool) -> RunResult {
        RunResult {
            seed: self.config.seed,
            generations: self.history,
            final_populations: self.populations.map(Population::into_individuals),
            stopped_early,
        }
    }
}

fn population_record(population: &Population) -> PopulationRecord {
    let best = population
        .best()
        .expect("a validated population is never empty");
    let fitness = population
        .fitness_summary()
        .expect("every individual is evaluated before recording");
    PopulationRecord {
        fitness,
        best: BestIndividual::new(best.program(), best.rank_fitness()),
    }
}

/// Neither population's best fitness improved by more than `min_improvement`
/// over the last `generations` generations.
fn is_plateau(plateau: &PlateauConfig, history: &[GenerationRecord]) -> bool {
    let Some(earlier) = history
        .len()
        .checked_sub(plateau.generations + 1)
        .map(|index| &history[index])
    else {
        return false;
    };
    let Some(latest) = history.last() else {
        return false;
    };
    Side::ALL.into_iter().all(|side| {
        latest.population(side).fitness.best - earlier.population(side).fitness.best
            <= plateau.min_improvement
    })
}

/// Runs a full co-evolution.
///
/// Fails only if `config` is invalid, before any match is played. The initial
/// populations are evaluated as generation 0, then `config.generations` rounds of
/// breeding and evaluation follow, unless the plateau rule stops the run earlier.
///
/// ```
/// use duelgp_training::{PairingScheme, RunConfig, run};
///
/// let config = RunConfig {
///     population_size: 4,
///     generations: 2,
///     pairing: PairingScheme::RoundRobin,
///     seed: 7,
///     ..RunConfig::default()
/// };
/// let result = run(&config).unwrap();
/// assert_eq!(result.generations.len(), 3);
/// assert_eq!(result.generations[0].matches_played, 16);
/// assert_eq!(result.final_populations[0].len(), 4);
/// ```
pub fn run(config: &RunConfig) -> Result<RunResult, ConfigError> {
    let mut coevolution = Coevolution::new(config)?;
    info!(
        population_size = config.population_size,
        generations = config.generations,
        pairing = ?config.pairing,
        seed = config.seed,
        "co-evolution started"
    );
    let mut stopped_early = false;
    coevolution.evaluate();
    for _ in 0..config.generations {
        if coevolution.plateau_reached() {
            info!(
                generation = coevolution.generation(),
                "fitness plateau reached, stopping early"
            );
            stopped_early = true;
            break;
        }
        coevolution.advance();
        coevolution.evaluate();
    }
    info!(
        generations = coevolution.history().len(),
        stopped_early, "co-evolution finished"
    );
    Ok(coevolution.into_result(stopped_early))
}
