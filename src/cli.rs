mod compare;
mod probe;

use clap::{Parser, Subcommand};

pub use self::{
    compare::{CompareArgs, compare},
    probe::{ProbeArgs, probe},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: fetch the plans, price them, and write the comparison workbook.
    #[clap(name = "compare")]
    Compare(Box<CompareArgs>),

    /// Development tools.
    #[clap(name = "probe")]
    Probe(Box<ProbeArgs>),
}
