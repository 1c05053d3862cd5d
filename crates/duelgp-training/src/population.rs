use std::cmp::Ordering;

use duelgp_program::{PrimitiveSet, Program, ramped_half_and_half};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::FitnessSummary;

/// A program and the fitness it earned in the current generation.
///
/// Fitness is `None` until the individual has been evaluated; it is reset whenever
/// the individual enters a new generation, elites included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    program: Program,
    fitness: Option<f32>,
}

impl Individual {
    #[must_use]
    pub const fn new(program: Program) -> Self {
        Self {
            program,
            fitness: None,
        }
    }

    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    #[must_use]
    pub fn into_program(self) -> Program {
        self.program
    }

    #[must_use]
    pub const fn fitness(&self) -> Option<f32> {
        self.fitness
    }

    /// Fitness used for ranking; unevaluated individuals rank last.
    #[must_use]
    pub fn rank_fitness(&self) -> f32 {
        self.fitness.unwrap_or(f32::NEG_INFINITY)
    }

    /// Orders individuals by fitness, best last.
    #[must_use]
    pub fn cmp_fitness(&self, other: &Self) -> Ordering {
        self.rank_fitness().total_cmp(&other.rank_fitness())
    }

    pub(crate) fn set_fitness(&mut self, fitness: f32) {
        self.fitness = Some(fitness);
    }

    /// Copy for the next generation, without this generation's fitness.
    #[must_use]
    pub(crate) fn carry_over(&self) -> Self {
        Self::new(self.program.clone())
    }
}

/// One side's individuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` random programs with ramped half-and-half.
    #[must_use]
    pub fn random<R>(
        primitives: &PrimitiveSet,
        count: usize,
        min_depth: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::new(ramped_half_and_half(primitives, min_depth, max_depth, rng)))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn from_programs(programs: impl IntoIterator<Item = Program>) -> Self {
        Self {
            individuals: programs.into_iter().map(Individual::new).collect(),
        }
    }

    pub(crate) fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Assigns this generation's fitness, one value per individual in order.
    pub(crate) fn assign_fitness(&mut self, fitness: impl IntoIterator<Item = f32>) {
        for (individual, value) in self.individuals.iter_mut().zip(fitness) {
            individual.set_fitness(value);
        }
    }

    /// Individuals sorted by fitness, best first. Ties keep population order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&Individual> {
        let mut ranked: Vec<_> = self.individuals.iter().collect();
        ranked.sort_by(|a, b| b.cmp_fitness(a));
        ranked
    }

    /// The fittest individual; the earliest one on ties.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.ranked().first().copied()
    }

    /// Summary of the evaluated individuals' fitness.
    #[must_use]
    pub fn fitness_summary(&self) -> Option<FitnessSummary> {
        FitnessSummary::new(self.individuals.iter().filter_map(Individual::fitness))
    }
}

#[cfg(test)]
mod tests {
    use duelgp_engine::Action;
    use duelgp_program::{Node, Op};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn constant(action: Action) -> Program {
        Program::new(Node::leaf(Op::Act(action)))
    }

    #[test]
    fn test_random_population_respects_init_depth() {
        let mut rng = Pcg32::seed_from_u64(3);
        let population = Population::random(&PrimitiveSet::default(), 20, 3, 5, &mut rng);
        assert_eq!(population.len(), 20);
        for individual in population.individuals() {
            assert!(individual.program().depth() <= 5);
            assert_eq!(individual.fitness(), None);
        }
    }

    #[test]
    fn test_ranking_puts_unevaluated_last() {
        let mut population = Population::from_programs([
            constant(Action::Noop),
            constant(Action::Shoot),
            constant(Action::Reload),
        ]);
        population.individuals[0].set_fitness(1.0);
        population.individuals[1].set_fitness(3.0);
        let ranked = population.ranked();
        assert_eq!(ranked[0].program(), &constant(Action::Shoot));
        assert_eq!(ranked[1].program(), &constant(Action::Noop));
        assert_eq!(ranked[2].fitness(), None);
        assert_eq!(population.best().unwrap().fitness(), Some(3.0));

        let summary = population.fitness_summary().unwrap();
        assert!((summary.best - 3.0).abs() < f32::EPSILON);
        assert!((summary.worst - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_carry_over_forgets_fitness() {
        let mut individual = Individual::new(constant(Action::Shoot));
        individual.set_fitness(5.0);
        assert_eq!(individual.carry_over().fitness(), None);
    }
}
