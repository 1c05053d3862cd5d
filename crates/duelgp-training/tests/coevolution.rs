use std::f32::consts::PI;

use duelgp_engine::{Action, Pose, Side, StartPositions, TerminalCondition};
use duelgp_program::{Node, Op, Program};
use duelgp_training::{
    Coevolution, ConfigError, PairingScheme, Participant, PlateauConfig, Population, RunConfig,
    run,
};

fn constant(action: Action) -> Program {
    Program::new(Node::leaf(Op::Act(action)))
}

fn small_config(seed: u64) -> RunConfig {
    RunConfig {
        population_size: 8,
        generations: 4,
        seed,
        ..RunConfig::default()
    }
}

#[test]
fn test_same_seed_same_result() {
    let config = small_config(42);
    let first = run(&config).unwrap();
    let second = run(&config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let parallel = RunConfig {
        pairing: PairingScheme::RoundRobin,
        capture_matches: true,
        ..small_config(5)
    };
    let sequential = RunConfig {
        parallel: false,
        ..parallel.clone()
    };
    assert_eq!(run(&parallel).unwrap(), run(&sequential).unwrap());
}

#[test]
fn test_different_seeds_differ() {
    let a = run(&small_config(1)).unwrap();
    let b = run(&small_config(2)).unwrap();
    assert_ne!(a.final_populations, b.final_populations);
}

#[test]
fn test_invalid_config_fails_before_running() {
    let config = RunConfig {
        population_size: 0,
        ..RunConfig::default()
    };
    assert_eq!(run(&config), Err(ConfigError::EmptyPopulation));

    let config = RunConfig {
        crossover_probability: 1.5,
        ..RunConfig::default()
    };
    assert!(matches!(
        run(&config),
        Err(ConfigError::Probability { .. })
    ));
}

#[test]
fn test_result_shape_for_every_pairing_scheme() {
    for (pairing, matches) in [
        (PairingScheme::RoundRobin, 36),
        (PairingScheme::RandomSample { opponents: 2 }, 24),
        (PairingScheme::BestOfPrevious, 12),
    ] {
        let config = RunConfig {
            population_size: 6,
            generations: 3,
            max_depth: 6,
            pairing,
            seed: 3,
            ..RunConfig::default()
        };
        let result = run(&config).unwrap();
        assert_eq!(result.generations.len(), 4);
        assert!(!result.stopped_early);
        for (generation, record) in result.generations.iter().enumerate() {
            assert_eq!(record.generation, generation);
            assert_eq!(record.matches_played, matches);
            assert!(record.matches.is_empty());
            for side in Side::ALL {
                let population = record.population(side);
                let fitness = population.fitness;
                assert!(fitness.worst <= fitness.mean + 1e-4);
                assert!(fitness.mean <= fitness.best + 1e-4);
                assert!((population.best.fitness - population.fitness.best).abs() < 1e-6);
                assert!(population.best.depth <= 6);
                assert_eq!(population.best.program.validate(6), Ok(()));
            }
        }
        for population in &result.final_populations {
            assert_eq!(population.len(), 6);
            assert!(population.iter().all(|individual| individual.fitness().is_some()));
        }
    }
}

#[test]
fn test_single_generation_breeds_once() {
    let config = RunConfig {
        population_size: 6,
        generations: 1,
        elitism: 0,
        crossover_probability: 1.0,
        mutation_probability: 1.0,
        seed: 3,
        ..RunConfig::default()
    };
    let initial: Vec<Vec<Program>> = Coevolution::new(&config)
        .unwrap()
        .populations()
        .iter()
        .map(|population| {
            population
                .individuals()
                .iter()
                .map(|individual| individual.program().clone())
                .collect()
        })
        .collect();
    let result = run(&config).unwrap();
    assert_eq!(result.generations.len(), 2);
    assert_eq!(result.generations[1].generation, 1);
    for (population, initial) in result.final_populations.iter().zip(&initial) {
        let programs: Vec<Program> = population
            .iter()
            .map(|individual| individual.program().clone())
            .collect();
        assert_ne!(&programs, initial);
        assert!(population.iter().all(|individual| individual.fitness().is_some()));
    }
}

#[test]
fn test_best_individual_survives_into_next_generation() {
    let config = RunConfig {
        elitism: 2,
        ..small_config(9)
    };
    let mut coevolution = Coevolution::new(&config).unwrap();
    for _ in 0..3 {
        let best = coevolution.evaluate().populations.clone().map(|record| record.best.program);
        coevolution.advance();
        for (side, program) in Side::ALL.into_iter().zip(&best) {
            let population = &coevolution.populations()[side.index()];
            assert!(
                population
                    .individuals()
                    .iter()
                    .any(|individual| individual.program() == program),
                "best of population {side} was lost"
            );
        }
    }
}

#[test]
fn test_single_tick_shot_between_singleton_populations() {
    let mut config = RunConfig {
        population_size: 1,
        generations: 1,
        elitism: 0,
        pairing: PairingScheme::RoundRobin,
        capture_matches: true,
        ..RunConfig::default()
    };
    config.match_config.max_ticks = 1;
    config.match_config.start_positions = StartPositions::Fixed {
        a: Pose::new(50.0, 50.0, 0.0),
        b: Pose::new(75.0, 55.0, 0.0),
    };
    let populations = [
        Population::from_programs([constant(Action::Shoot)]),
        Population::from_programs([constant(Action::Noop)]),
    ];
    let mut coevolution = Coevolution::with_populations(&config, populations).unwrap();
    let record = coevolution.evaluate();
    assert_eq!(record.matches.len(), 1);

    let played = &record.matches[0];
    assert_eq!(
        played.participants,
        [
            Participant::Member { index: 0 },
            Participant::Member { index: 0 }
        ]
    );
    let physics = &config.match_config.physics;
    let result = &played.result;
    assert_eq!(result.ticks, 1);
    assert_eq!(result.terminal, TerminalCondition::Timeout);
    assert_eq!(
        result.report(Side::B).final_health,
        physics.max_health - physics.shot_damage
    );
    assert_eq!(result.report(Side::A).final_ammo, physics.max_ammo - 1);
    assert!(record.population(Side::A).fitness.best > record.population(Side::B).fitness.best);
}

#[test]
fn test_invalid_program_gets_minimum_fitness() {
    let config = RunConfig {
        population_size: 2,
        generations: 1,
        elitism: 0,
        pairing: PairingScheme::RoundRobin,
        ..RunConfig::default()
    };
    let broken = Program::new(Node::new(Op::Select, vec![]));
    let populations = [
        Population::from_programs([broken, constant(Action::Noop)]),
        Population::from_programs([constant(Action::Noop), constant(Action::TurnLeft)]),
    ];
    let mut coevolution = Coevolution::with_populations(&config, populations).unwrap();
    let record = coevolution.evaluate();
    assert_eq!(record.invalid_matches, 2);

    let fitness: Vec<_> = coevolution.populations()[0]
        .individuals()
        .iter()
        .map(|individual| individual.fitness().unwrap())
        .collect();
    assert!((fitness[0] - config.scoring.invalid_program).abs() < 1e-6);
    assert!(fitness[1] >= 0.0);
}

#[test]
fn test_invalid_program_ranks_below_losing_valid_program() {
    let mut config = RunConfig {
        population_size: 2,
        generations: 1,
        elitism: 0,
        pairing: PairingScheme::RoundRobin,
        ..RunConfig::default()
    };
    config.scoring.damage_taken = 2.0;
    config.match_config.start_positions = StartPositions::Fixed {
        a: Pose::new(50.0, 50.0, 0.0),
        b: Pose::new(75.0, 50.0, PI),
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::PenaltyNotMinimal { .. })
    ));

    config.scoring.invalid_program = -300.0;
    let broken = Program::new(Node::new(Op::Select, vec![]));
    let populations = [
        Population::from_programs([broken, constant(Action::Noop)]),
        Population::from_programs([constant(Action::Shoot), constant(Action::Shoot)]),
    ];
    let mut coevolution = Coevolution::with_populations(&config, populations).unwrap();
    coevolution.evaluate();

    let individuals = coevolution.populations()[0].individuals();
    let broken = individuals[0].fitness().unwrap();
    let noop = individuals[1].fitness().unwrap();
    assert!(noop < -150.0, "{noop}");
    assert!(broken < noop, "{broken} >= {noop}");
}

#[test]
fn test_seeded_programs_must_respect_max_depth() {
    let config = RunConfig {
        population_size: 1,
        max_depth: 5,
        ..RunConfig::default()
    };
    let mut number = Node::leaf(Op::Number(1.0));
    for _ in 0..6 {
        number = Node::new(Op::Neg, vec![number]);
    }
    let deep = Program::new(Node::new(Op::Select, vec![number]));
    assert_eq!(deep.depth(), 7);
    let populations = [
        Population::from_programs([constant(Action::Noop)]),
        Population::from_programs([deep]),
    ];
    assert!(matches!(
        Coevolution::with_populations(&config, populations),
        Err(ConfigError::SeededTooDeep {
            side: Side::B,
            index: 0,
            depth: 7,
            max_depth: 5,
        })
    ));
}

#[test]
fn test_seeded_population_size_must_match() {
    let config = RunConfig {
        population_size: 2,
        ..RunConfig::default()
    };
    let populations = [
        Population::from_programs([constant(Action::Noop)]),
        Population::from_programs([constant(Action::Noop), constant(Action::Noop)]),
    ];
    assert!(matches!(
        Coevolution::with_populations(&config, populations),
        Err(ConfigError::PopulationSize {
            side: Side::A,
            expected: 2,
            found: 1
        })
    ));
}

#[test]
fn test_plateau_stops_run_early() {
    let config = RunConfig {
        generations: 10,
        plateau: Some(PlateauConfig {
            generations: 1,
            min_improvement: 1.0e6,
        }),
        ..small_config(4)
    };
    let result = run(&config).unwrap();
    assert!(result.stopped_early);
    assert_eq!(result.generations.len(), 2);
}

#[test]
fn test_run_result_serializes() {
    let config = RunConfig {
        capture_matches: true,
        generations: 1,
        ..small_config(8)
    };
    let result = run(&config).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["generations"].as_array().unwrap().len(), 2);
    assert!(json["generations"][0]["matches"].as_array().is_some());
    assert!(json["final_populations"][0][0]["program"].is_object());
}
