//! Turning a resampled float buffer into a playable, transportable WAV.
//!
//! The pipeline is fixed: peak-normalize to a headroom level, clip to
//! `[-1, 1]`, quantize to 16-bit PCM, wrap in a RIFF/WAVE container, then
//! base64-encode it behind a `data:audio/wav;base64,` prefix.
//!
//! Quantization is `(x * 32767.0) as i16`: truncation toward zero.
//!
//! # Example
//!
//! ```rust
//! use nyquist_io::{PlaybackEncoder, decode_data_uri, read_pcm16};
//!
//! let uri = PlaybackEncoder::new()
//!     .encode_data_uri(&[0.0, 2.0, -1.0], 8000, 1)
//!     .unwrap();
//!
//! let wav = decode_data_uri(&uri).unwrap();
//! let (pcm, spec) = read_pcm16(&wav).unwrap();
//! assert_eq!(spec.sample_rate, 8000);
//! assert_eq!(pcm, vec![0, 27851, -13925]);
//! ```

use crate::wav::encode_pcm16;
use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Peak level a non-silent buffer is normalized to.
pub const DEFAULT_HEADROOM: f32 = 0.85;

/// Prefix of every playback URI.
pub const WAV_DATA_URI_PREFIX: &str = "data:audio/wav;base64,";

/// Normalizes, quantizes, and encodes buffers for playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackEncoder {
    headroom: f32,
}

impl Default for PlaybackEncoder {
    fn default() -> Self {
        Self {
            headroom: DEFAULT_HEADROOM,
        }
    }
}

impl PlaybackEncoder {
    /// Encoder with the default 0.85 headroom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the normalization peak.
    pub fn with_headroom(mut self, headroom: f32) -> Self {
        self.headroom = headroom;
        self
    }

    /// Current normalization peak.
    pub fn headroom(&self) -> f32 {
        self.headroom
    }

    /// Scale `buffer` so its absolute peak equals the headroom level.
    ///
    /// All-zero input is returned unchanged.
    pub fn normalize(&self, buffer: &[f32]) -> Vec<f32> {
        let peak = buffer.iter().fold(0.0f32, |m, x| m.max(x.abs()));
        if peak > 0.0 {
            buffer.iter().map(|x| x / peak * self.headroom).collect()
        } else {
            buffer.to_vec()
        }
    }

    /// Normalize, clip, and quantize `buffer` into a 16-bit WAV container.
    pub fn encode_wav(&self, buffer: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
        let pcm = quantize_pcm16(&self.normalize(buffer));
        encode_pcm16(&pcm, sample_rate, channels)
    }

    /// Full playback encoding: WAV container as a base64 data URI.
    pub fn encode_data_uri(&self, buffer: &[f32], sample_rate: u32, channels: u16) -> Result<String> {
        let wav = self.encode_wav(buffer, sample_rate, channels)?;
        let mut uri = String::with_capacity(WAV_DATA_URI_PREFIX.len() + wav.len().div_ceil(3) * 4);
        uri.push_str(WAV_DATA_URI_PREFIX);
        STANDARD.encode_string(&wav, &mut uri);

        tracing::debug!(
            samples = buffer.len(),
            sample_rate,
            wav_bytes = wav.len(),
            "encoded playback buffer"
        );
        Ok(uri)
    }
}

/// Clip to `[-1, 1]` and scale by 32767, truncating toward zero.
pub fn quantize_pcm16(buffer: &[f32]) -> Vec<i16> {
    buffer
        .iter()
        .map(|&x| (x.clamp(-1.0, 1.0) * 32767.0) as i16)
        .collect()
}

/// Extract the WAV bytes from a `data:audio/wav;base64,` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = uri
        .strip_prefix(WAV_DATA_URI_PREFIX)
        .ok_or_else(|| Error::DataUri(format!("expected prefix '{}'", WAV_DATA_URI_PREFIX)))?;
    Ok(STANDARD.decode(payload)?)
}
