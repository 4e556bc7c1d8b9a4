mod cli;
mod color;
mod data;
mod error;
mod export;
mod pipeline;
mod profile;

use anyhow::Result;
use clap::Parser;

use profile::Profile;

fn main() -> Result<()> {
    env_logger::init();

    let cli = cli::Cli::parse();
    let profile = Profile::load(&cli.profile)?;
    log::info!(
        "Profile '{}': {} series over {} input(s)",
        profile.name,
        profile.series.len(),
        cli.inputs.len()
    );

    pipeline::run(&profile, &cli.inputs, &cli.output)
}
