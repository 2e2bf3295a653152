use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;

use ebi_alignments::ebi_framework::ebi_command::EbiCommand;

pub fn main() -> Result<()> {
    let command = EbiCommand::parse();

    Builder::new().filter_level(command.verbose.log_level_filter()).init();

    log::info!("Ebi alignments starting");

    command.execute().context("Executing Ebi alignments")
}
