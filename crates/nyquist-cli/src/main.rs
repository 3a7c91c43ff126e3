//! nyquist CLI - measure a recording's bandwidth and hear it alias.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nyquist")]
#[command(author, version, about = "Nyquist rate and aliasing demonstrator", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure the bandwidth and Nyquist rate of an audio file
    Analyze(commands::analyze::AnalyzeArgs),

    /// Resample an audio file to an arbitrary rate, without anti-aliasing
    Resample(commands::resample::ResampleArgs),

    /// Answer JSON-lines requests on stdin until EOF
    Serve(commands::serve::ServeArgs),

    /// Display decoded audio metadata
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only replies
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init().ok();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args, config),
        Commands::Resample(args) => commands::resample::run(args, config),
        Commands::Serve(args) => commands::serve::run(args, config),
        Commands::Info(args) => commands::info::run(args),
    }
}
