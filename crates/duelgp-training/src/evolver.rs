//! Selection and variation: builds the next generation of one population.
//!
//! 1. **Elites** - the `elite_count` fittest individuals are copied unchanged.
//! 2. **Tournament selection** - each parent is the fittest of `tournament_size`
//!    individuals drawn uniformly with replacement.
//! 3. **Crossover** - with `crossover_probability`, two parents swap subtrees of
//!    the same type.
//! 4. **Mutation** - otherwise each parent copy is mutated with
//!    `mutation_probability`, and cloned unchanged if not.
//!
//! Offspring never exceed [`VariationConfig::max_depth`]. An operator that finds no
//! acceptable point yields the parent copy and is counted as a fallback.

use duelgp_program::{PrimitiveSet, Program, VariationConfig, crossover, mutate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Individual, Population};

/// Counts of what produced the offspring of one generation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationStats {
    pub elites: usize,
    pub crossovers: usize,
    pub crossover_fallbacks: usize,
    pub mutations: usize,
    pub mutation_fallbacks: usize,
    pub clones: usize,
}

/// Evolution parameters for one population.
#[derive(Debug)]
pub struct PopulationEvolver<'a> {
    /// Number of top individuals preserved unchanged
    pub elite_count: usize,
    /// Individuals per tournament, at least 1 (larger = stronger selection pressure)
    pub tournament_size: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    /// Primitives available to mutation
    pub primitives: &'a PrimitiveSet,
    pub variation: VariationConfig,
}

impl PopulationEvolver<'_> {
    /// Creates the next generation, of the same size as `population`.
    ///
    /// All individuals of the result are unevaluated.
    ///
    /// # Panics
    ///
    /// Panics if `tournament_size` is zero.
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> (Population, VariationStats)
    where
        R: Rng + ?Sized,
    {
        assert!(self.tournament_size > 0, "tournament size must be at least 1");
        let size = population.len();
        let mut stats = VariationStats::default();
        let mut next = Vec::with_capacity(size);

        // elite selection
        next.extend(
            population
                .ranked()
                .into_iter()
                .take(self.elite_count.min(size))
                .map(Individual::carry_over),
        );
        stats.elites = next.len();

        let individuals = population.individuals();
        while next.len() < size {
            let (Some(p1), Some(p2)) = (
                tournament_select(individuals, self.tournament_size, rng),
                tournament_select(individuals, self.tournament_size, rng),
            ) else {
                break;
            };
            for child in self.offspring(p1.program(), p2.program(), &mut stats, rng) {
                if next.len() < size {
                    next.push(Individual::new(child));
                }
            }
        }

        (Population::from_individuals(next), stats)
    }

    fn offspring<R>(
        &self,
        p1: &Program,
        p2: &Program,
        stats: &mut VariationStats,
        rng: &mut R,
    ) -> [Program; 2]
    where
        R: Rng + ?Sized,
    {
        if rng.random_bool(self.crossover_probability) {
            return match crossover(p1, p2, &self.variation, rng) {
                Some((c1, c2)) => {
                    stats.crossovers += 1;
                    [c1, c2]
                }
                None => {
                    stats.crossover_fallbacks += 1;
                    [p1.clone(), p2.clone()]
                }
            };
        }
        [p1, p2].map(|parent| {
            if !rng.random_bool(self.mutation_probability) {
                stats.clones += 1;
                return parent.clone();
            }
            if let Some(child) = mutate(parent, self.primitives, &self.variation, rng) {
                stats.mutations += 1;
                child
            } else {
                stats.mutation_fallbacks += 1;
                parent.clone()
            }
        })
    }
}

/// Fittest of `tournament_size` individuals drawn with replacement; `None` if
/// `population` is empty or `tournament_size` is zero.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a Individual>
where
    R: Rng + ?Sized,
{
    if population.is_empty() {
        return None;
    }
    (0..tournament_size)
        .map(|_| &population[rng.random_range(0..population.len())])
        .max_by(|a, b| a.cmp_fitness(b))
}

#[cfg(test)]
mod tests {
    use duelgp_engine::{Action, SensorKind};
    use duelgp_program::{Node, Op, PrimitiveSetConfig};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn evolver(primitives: &PrimitiveSet, elite_count: usize) -> PopulationEvolver<'_> {
        PopulationEvolver {
            elite_count,
            tournament_size: 3,
            crossover_probability: 0.5,
            mutation_probability: 0.3,
            primitives,
            variation: VariationConfig {
                max_depth: 6,
                ..VariationConfig::default()
            },
        }
    }

    /// Stationary fitness: number of `shoot` leaves in the tree.
    #[expect(clippy::cast_precision_loss)]
    fn shoot_count(program: &Program) -> f32 {
        program
            .root()
            .preorder()
            .filter(|node| node.op() == Op::Act(Action::Shoot))
            .count() as f32
    }

    fn evaluate(population: &mut Population) {
        let fitness: Vec<_> = population
            .individuals()
            .iter()
            .map(|individual| shoot_count(individual.program()))
            .collect();
        population.assign_fitness(fitness);
    }

    #[test]
    fn test_evolve_keeps_size_and_depth_bound() {
        let primitives = PrimitiveSet::default();
        let mut rng = Pcg32::seed_from_u64(10);
        let mut population = Population::random(&primitives, 21, 3, 5, &mut rng);
        let evolver = evolver(&primitives, 2);
        for _ in 0..10 {
            evaluate(&mut population);
            let (next, stats) = evolver.evolve(&population, &mut rng);
            assert_eq!(next.len(), 21);
            assert_eq!(stats.elites, 2);
            for individual in next.individuals() {
                assert_eq!(individual.fitness(), None);
                assert_eq!(individual.program().validate(6), Ok(()));
            }
            population = next;
        }
    }

    #[test]
    fn test_elitism_never_loses_best_fitness() {
        let primitives = PrimitiveSet::new(PrimitiveSetConfig {
            conditionals: true,
            comparisons: true,
            trigonometry: true,
        });
        let mut rng = Pcg32::seed_from_u64(99);
        let mut population = Population::random(&primitives, 15, 3, 5, &mut rng);
        let evolver = evolver(&primitives, 3);
        evaluate(&mut population);
        for _ in 0..20 {
            let ranked: Vec<f32> = population
                .ranked()
                .iter()
                .map(|individual| individual.rank_fitness())
                .collect();
            let (mut next, _) = evolver.evolve(&population, &mut rng);
            evaluate(&mut next);
            let best = next.best().unwrap().rank_fitness();
            assert!(best >= ranked[2], "{best} < {}", ranked[2]);
            assert!(best >= ranked[0]);
            population = next;
        }
    }

    #[test]
    #[should_panic(expected = "tournament size must be at least 1")]
    fn test_empty_tournament_panics() {
        let primitives = PrimitiveSet::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut population = Population::random(&primitives, 4, 3, 5, &mut rng);
        evaluate(&mut population);
        let evolver = PopulationEvolver {
            tournament_size: 0,
            ..evolver(&primitives, 1)
        };
        let _ = evolver.evolve(&population, &mut rng);
    }

    #[test]
    fn test_tournament_prefers_fitter_individuals() {
        let mut population = Population::from_programs([
            Program::new(Node::leaf(Op::Act(Action::Noop))),
            Program::new(Node::new(
                Op::Select,
                vec![Node::leaf(Op::Sensor(SensorKind::Ammo))],
            )),
        ]);
        population.assign_fitness([0.0, 1.0]);
        let mut rng = Pcg32::seed_from_u64(5);
        let picks = (0..1000)
            .filter_map(|_| tournament_select(population.individuals(), 2, &mut rng))
            .filter(|individual| individual.fitness() == Some(1.0))
            .count();
        // the weaker one wins only when drawn twice: 1/4 of the time
        assert!((650..850).contains(&picks), "{picks}");
    }

    #[test]
    fn test_zero_probabilities_clone_parents() {
        let primitives = PrimitiveSet::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut population = Population::random(&primitives, 8, 3, 5, &mut rng);
        evaluate(&mut population);
        let evolver = PopulationEvolver {
            crossover_probability: 0.0,
            mutation_probability: 0.0,
            ..evolver(&primitives, 0)
        };
        let (next, stats) = evolver.evolve(&population, &mut rng);
        assert_eq!(stats.clones, 8);
        for individual in next.individuals() {
            assert!(
                population
                    .individuals()
                    .iter()
                    .any(|parent| parent.program() == individual.program())
            );
        }
    }
}
