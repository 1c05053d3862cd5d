use clap::{Parser, Subcommand};

use self::{duel::DuelArg, run::RunArg};

mod duel;
mod run;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Co-evolve two populations of robot programs
    Run(#[clap(flatten)] RunArg),
    /// Play one match between two randomly generated programs
    Duel(#[clap(flatten)] DuelArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Run(RunArg::default())) {
        Mode::Run(arg) => run::run(&arg)?,
        Mode::Duel(arg) => duel::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_run() {
        let args = CommandArgs::try_parse_from(["duelgp"]).unwrap();
        assert!(args.mode.is_none());
    }
}
