use std::path::PathBuf;

use duelgp_engine::{MatchConfig, MatchResult, MatchSeed, Side, derive_seed, play};
use duelgp_program::{PrimitiveSet, Program, ramped_half_and_half};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::Serialize;
use tracing::info;

use crate::util::Output;

const PROGRAM_STREAM: u64 = 1;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DuelArg {
    /// Seed for both programs and the match
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 3)]
    min_depth: usize,
    #[arg(long, default_value_t = 5)]
    max_depth: usize,
    /// Tick limit of the match
    #[arg(long)]
    max_ticks: Option<u32>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DuelReport {
    seed: u64,
    programs: [Program; 2],
    expressions: [String; 2],
    result: MatchResult,
}

fn duel(arg: &DuelArg) -> DuelReport {
    let primitives = PrimitiveSet::default();
    let programs = Side::ALL.map(|side| {
        let mut rng = Pcg32::seed_from_u64(derive_seed(
            arg.seed,
            &[PROGRAM_STREAM, side.index() as u64],
        ));
        ramped_half_and_half(&primitives, arg.min_depth, arg.max_depth, &mut rng)
    });
    let mut config = MatchConfig::default();
    if let Some(max_ticks) = arg.max_ticks {
        config.max_ticks = max_ticks;
    }
    let [a, b] = &programs;
    let result = play(a, b, &config, MatchSeed::new(arg.seed));
    info!(
        seed = arg.seed,
        ticks = result.ticks,
        terminal = ?result.terminal,
        "duel finished"
    );
    DuelReport {
        seed: arg.seed,
        expressions: programs.each_ref().map(ToString::to_string),
        programs,
        result,
    }
}

pub(crate) fn run(arg: &DuelArg) -> anyhow::Result<()> {
    let report = duel(arg);
    for (side, expression) in Side::ALL.into_iter().zip(&report.expressions) {
        eprintln!("Robot {side}: {expression}");
    }
    eprintln!(
        "Finished after {} ticks: {:?}",
        report.result.ticks, report.result.terminal
    );
    Output::save_json(&report, arg.output.clone())
}
