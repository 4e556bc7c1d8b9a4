//! Command-line interface definitions.

use std::path::PathBuf;

use clap::Parser;

/// Turn benchmark logs into chart-ready series or aligned tables.
///
/// The output extension picks the artifact: `.json` writes the series
/// document for the plotting side, `.dat`/`.tsv`/`.txt` writes a
/// tab-separated aligned table.
#[derive(Parser, Debug)]
#[command(name = "bench-series", version, about)]
pub struct Cli {
    /// Preset name (e.g. `ddot-size`) or path to a `.toml` profile.
    pub profile: String,

    /// Benchmark log(s) or tables, in the order the profile's `input` indices expect.
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Artifact to write.
    pub output: PathBuf,
}
