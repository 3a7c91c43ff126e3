//! One-shot analyze and resample.

use anyhow::Context;
use clap::Args;
use nyquist_io::decode_data_uri;
use std::path::{Path, PathBuf};

use super::common::{load_service, print_response, read_input};

/// Resample an audio file to an arbitrary rate, without anti-aliasing.
#[derive(Args)]
pub struct ResampleArgs {
    /// Input audio file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Target sampling rate in Hz
    #[arg(short, long, allow_negative_numbers = true, default_value_t = nyquist_session::DEFAULT_SAMPLING_RATE)]
    pub rate: i64,

    /// Write the playback WAV here
    #[arg(short, long, value_name = "WAV")]
    pub output: Option<PathBuf>,

    /// Leave the base64 audio out of the printed reply
    #[arg(long)]
    pub omit_audio: bool,
}

/// Run the resample command.
pub fn run(args: ResampleArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let service = load_service(config)?;
    let audio = read_input(&args.file)?;

    let result = service
        .analyze(&audio)
        .and_then(|analyzed| service.resample(&analyzed.session_id.to_string(), args.rate));

    if let (Ok(reply), Some(output)) = (&result, &args.output) {
        let wav = decode_data_uri(&reply.audio_data)?;
        std::fs::write(output, wav).with_context(|| format!("writing '{}'", output.display()))?;
        tracing::info!(path = %output.display(), playback_sr = reply.playback_sr, "wrote playback WAV");
    }

    print_response(result, |value| {
        if args.omit_audio
            && let Some(fields) = value.as_object_mut()
        {
            fields.remove("audio_data");
        }
    })
}
