//! In-memory WAV reading and writing.

use crate::decode::{Waveform, check_duration, mix_to_mono};
use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::Cursor;

/// WAV container specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (e.g., 16, 24, 32).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

/// Decode a RIFF/WAVE byte buffer into a mono [`Waveform`].
///
/// Integer formats are scaled by `1 / 2^(bits - 1)`; float files are taken
/// as-is. Multi-channel files are mixed down to mono by averaging channels.
pub fn read_wav_bytes(bytes: &[u8]) -> Result<Waveform> {
    read_wav_limited(bytes, None)
}

/// [`read_wav_bytes`] that fails with [`Error::TooLong`] before reading any
/// sample when the header declares more than `max_duration_secs` of audio.
pub(crate) fn read_wav_limited(bytes: &[u8], max_duration_secs: Option<f64>) -> Result<Waveform> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = spec.channels;
    check_duration(u64::from(reader.duration()), spec.sample_rate, max_duration_secs)?;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    if samples.is_empty() {
        return Err(Error::Empty);
    }

    Ok(Waveform::new(
        mix_to_mono(samples, channels as usize),
        spec.sample_rate,
        channels,
    ))
}

/// Write 16-bit PCM samples into a canonical RIFF/WAVE container in memory.
///
/// `samples` are interleaved when `channels > 1`. An empty slice produces a
/// valid header with an empty data chunk.
pub fn encode_pcm16(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Read a 16-bit PCM WAV container back into raw integer samples.
pub fn read_pcm16(bytes: &[u8]) -> Result<(Vec<i16>, WavSpec)> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(Error::Decode(format!(
            "expected 16-bit PCM, found {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((samples, WavSpec::from(spec)))
}
