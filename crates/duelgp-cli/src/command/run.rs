use std::path::PathBuf;

use anyhow::bail;
use chrono::{DateTime, Utc};
use duelgp_engine::Side;
use duelgp_training::{PairingScheme, RunConfig, RunResult};
use serde::Serialize;

use crate::util::{self, Output};

const DEFAULT_OPPONENTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum PairingKind {
    RoundRobin,
    RandomSample,
    BestOfPrevious,
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    /// JSON run configuration; other flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Individuals per population
    #[arg(long)]
    population: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    /// Tournament size
    #[arg(long)]
    tournament: Option<usize>,
    /// Crossover probability
    #[arg(long)]
    crossover: Option<f64>,
    /// Mutation probability
    #[arg(long)]
    mutation: Option<f64>,
    /// Individuals copied unchanged into the next generation
    #[arg(long)]
    elitism: Option<usize>,
    #[arg(long)]
    max_depth: Option<usize>,
    /// Tick limit of every match
    #[arg(long)]
    max_ticks: Option<u32>,
    #[arg(long, value_enum)]
    pairing: Option<PairingKind>,
    /// Opponents per individual for random-sample pairing
    #[arg(long)]
    opponents: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Leave out `if_action` and `if_number`
    #[arg(long)]
    no_conditionals: bool,
    /// Leave out comparisons and boolean logic
    #[arg(long)]
    no_comparisons: bool,
    /// Add `sin`, `cos` and angle constants
    #[arg(long)]
    trigonometry: bool,
    /// Keep every match in the report
    #[arg(long)]
    capture_matches: bool,
    /// Play matches on the current thread only
    #[arg(long)]
    sequential: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl RunArg {
    fn load_config(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("run configuration", path)?,
            None => RunConfig::default(),
        };
        self.apply(&mut config)?;
        Ok(config)
    }

    fn apply(&self, config: &mut RunConfig) -> anyhow::Result<()> {
        set(self.population, &mut config.population_size);
        set(self.generations, &mut config.generations);
        set(self.tournament, &mut config.tournament_size);
        set(self.crossover, &mut config.crossover_probability);
        set(self.mutation, &mut config.mutation_probability);
        set(self.elitism, &mut config.elitism);
        set(self.max_depth, &mut config.max_depth);
        set(self.max_ticks, &mut config.match_config.max_ticks);
        set(self.seed, &mut config.seed);

        let current_opponents = match config.pairing {
            PairingScheme::RandomSample { opponents } => Some(opponents),
            PairingScheme::RoundRobin | PairingScheme::BestOfPrevious => None,
        };
        config.pairing = match (self.pairing, self.opponents) {
            (Some(PairingKind::RoundRobin), None) => PairingScheme::RoundRobin,
            (Some(PairingKind::BestOfPrevious), None) => PairingScheme::BestOfPrevious,
            (Some(PairingKind::RandomSample), opponents) => PairingScheme::RandomSample {
                opponents: opponents
                    .or(current_opponents)
                    .unwrap_or(DEFAULT_OPPONENTS),
            },
            (None, Some(opponents)) if current_opponents.is_some() => {
                PairingScheme::RandomSample { opponents }
            }
            (_, Some(_)) => bail!("--opponents only applies to random-sample pairing"),
            (None, None) => config.pairing,
        };

        if self.no_conditionals {
            config.primitives.conditionals = false;
        }
        if self.no_comparisons {
            config.primitives.comparisons = false;
        }
        if self.trigonometry {
            config.primitives.trigonometry = true;
        }
        if self.capture_matches {
            config.capture_matches = true;
        }
        if self.sequential {
            config.parallel = false;
        }
        Ok(())
    }
}

fn set<T>(value: Option<T>, field: &mut T) {
    if let Some(value) = value {
        *field = value;
    }
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    finished_at: DateTime<Utc>,
    config: &'a RunConfig,
    result: &'a RunResult,
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let config = arg.load_config()?;
    let result = duelgp_training::run(&config)?;

    eprintln!("Co-evolution completed.");
    if let Some(last) = result.last_generation() {
        eprintln!("  Generations: {}", result.generations.len());
        eprintln!("  Stopped early: {}", result.stopped_early);
        for side in Side::ALL {
            let population = last.population(side);
            eprintln!(
                "  Population {side}: best {:.3}, mean {:.3}, worst {:.3}",
                population.fitness.best, population.fitness.mean, population.fitness.worst
            );
            eprintln!("    {}", population.best.program);
        }
    }

    let report = RunReport {
        finished_at: Utc::now(),
        config: &config,
        result: &result,
    };
    Output::save_json(&report, arg.output.clone())?;
    if let Some(path) = &arg.output {
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}
