//! Display decoded audio metadata.

use clap::Args;

use super::common::read_input;

/// Display decoded audio information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the audio file
    pub file: std::path::PathBuf,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let bytes = read_input(&args.file)?;
    let waveform = nyquist_io::decode(&bytes)?;

    println!("File:        {}", args.file.display());
    println!("Channels:    {} (mixed to mono)", waveform.source_channels());
    println!("Sample Rate: {} Hz", waveform.sample_rate());
    println!(
        "Duration:    {:.3}s ({} frames)",
        waveform.duration_secs(),
        waveform.len()
    );
    println!("File Size:   {}", format_bytes(bytes.len() as u64));

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
