//! Playing a generation's matches and turning them into fitness.
//!
//! Matches are independent: each one gets a private seed derived from the run seed,
//! the generation and its pairing index, so results do not depend on which thread
//! plays it. Fitness is aggregated only once every match has finished.

use duelgp_engine::{MatchConfig, MatchResult, MatchSeed, Side, play};
use rayon::prelude::*;

use crate::{FitnessAggregation, Pairing, Participant, ScoringPolicy};

/// Results of one generation's matches, in pairing order, with their seeds.
#[derive(Debug)]
pub(crate) struct PlayedMatches {
    pub seeds: Vec<MatchSeed>,
    pub results: Vec<MatchResult>,
}

impl PlayedMatches {
    pub fn invalid_count(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.terminal.is_invalid_program())
            .count()
    }
}

/// Plays every pairing, on the rayon pool if `parallel`.
pub(crate) fn play_all(
    pairings: &[Pairing<'_>],
    config: &MatchConfig,
    run_seed: u64,
    generation: usize,
    parallel: bool,
) -> PlayedMatches {
    let seeds: Vec<MatchSeed> = (0..pairings.len())
        .map(|index| MatchSeed::derive(run_seed, generation as u64, index as u64))
        .collect();
    let play_one = |(pairing, seed): (&Pairing<'_>, &MatchSeed)| {
        let [a, b] = pairing.programs;
        play(a, b, config, *seed)
    };
    let results = if parallel {
        pairings.par_iter().zip(&seeds).map(play_one).collect()
    } else {
        pairings.iter().zip(&seeds).map(play_one).collect()
    };
    PlayedMatches { seeds, results }
}

/// Fitness of every member of population A and B, in population order.
///
/// Members that played no match get `0`.
pub(crate) fn aggregate_fitness(
    pairings: &[Pairing<'_>],
    results: &[MatchResult],
    sizes: [usize; 2],
    scoring: &ScoringPolicy,
    aggregation: FitnessAggregation,
    max_ticks: u32,
) -> [Vec<f32>; 2] {
    let mut scores = sizes.map(|size| vec![Vec::new(); size]);
    for (pairing, result) in pairings.iter().zip(results) {
        for side in Side::ALL {
            if let Participant::Member { index } = pairing.participants[side.index()] {
                scores[side.index()][index].push(scoring.score(result, side, max_ticks));
            }
        }
    }
    scores.map(|members| {
        members
            .iter()
            .map(|member| aggregation.aggregate(member))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use duelgp_engine::{Action, Pose, StartPositions, TerminalCondition};
    use duelgp_program::{Node, Op, Program};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{PairingScheme, Population, pairing::plan};

    fn constant(action: Action) -> Program {
        Program::new(Node::leaf(Op::Act(action)))
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let mut rng = Pcg32::seed_from_u64(4);
        let primitives = duelgp_program::PrimitiveSet::default();
        let a = Population::random(&primitives, 6, 3, 5, &mut rng);
        let b = Population::random(&primitives, 6, 3, 5, &mut rng);
        let pairings = plan(PairingScheme::RoundRobin, [&a, &b], None, &mut rng);
        let config = MatchConfig::default();
        let parallel = play_all(&pairings, &config, 17, 3, true);
        let sequential = play_all(&pairings, &config, 17, 3, false);
        assert_eq!(parallel.results, sequential.results);
        assert_eq!(parallel.seeds, sequential.seeds);
        assert_eq!(parallel.results.len(), 36);
    }

    #[test]
    fn test_fitness_credits_both_members() {
        let a = Population::from_programs([constant(Action::Shoot), constant(Action::Noop)]);
        let b = Population::from_programs([constant(Action::Noop)]);
        let mut rng = Pcg32::seed_from_u64(0);
        let pairings = plan(PairingScheme::RoundRobin, [&a, &b], None, &mut rng);
        let config = MatchConfig {
            start_positions: StartPositions::Fixed {
                a: Pose::new(50.0, 50.0, 0.0),
                b: Pose::new(80.0, 50.0, 0.0),
            },
            ..MatchConfig::default()
        };
        let played = play_all(&pairings, &config, 1, 0, false);
        assert_eq!(
            played.results[0].terminal,
            TerminalCondition::Elimination { winner: Side::A }
        );
        assert_eq!(played.results[1].terminal, TerminalCondition::Timeout);

        let scoring = ScoringPolicy::default();
        let [fitness_a, fitness_b] = aggregate_fitness(
            &pairings,
            &played.results,
            [2, 1],
            &scoring,
            FitnessAggregation::Mean,
            config.max_ticks,
        );
        assert!(fitness_a[0] > fitness_a[1]);
        assert_eq!(fitness_b.len(), 1);
        let expected_b = (scoring.score(&played.results[0], Side::B, config.max_ticks)
            + scoring.score(&played.results[1], Side::B, config.max_ticks))
            / 2.0;
        assert!((fitness_b[0] - expected_b).abs() < 1e-6);
    }

    #[test]
    fn test_members_without_matches_get_zero() {
        let fitness = aggregate_fitness(
            &[],
            &[],
            [3, 2],
            &ScoringPolicy::default(),
            FitnessAggregation::Sum,
            100,
        );
        assert_eq!(fitness, [vec![0.0; 3], vec![0.0; 2]]);
    }
}
