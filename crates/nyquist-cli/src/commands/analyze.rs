//! Bandwidth analysis of a single file.

use clap::Args;
use std::path::{Path, PathBuf};

use super::common::{load_service, print_response, read_input};

/// Measure the bandwidth and Nyquist rate of an audio file.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input audio file (WAV, MP3, Ogg Vorbis, FLAC, AAC)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Run the analyze command.
pub fn run(args: AnalyzeArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let service = load_service(config)?;
    let audio = read_input(&args.file)?;
    print_response(service.analyze(&audio), |_| {})
}
