use clap::{Parser, Subcommand};

use self::{simulate::SimulateArg, trace::TraceArg};

mod simulate;
mod trace;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play games with random input and print per-game summaries
    Simulate(#[clap(flatten)] SimulateArg),
    /// Play one game and print every renderer call and the final board
    Trace(#[clap(flatten)] TraceArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Trace(arg) => trace::run(&arg)?,
    }
    Ok(())
}
