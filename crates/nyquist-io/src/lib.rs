//! Audio I/O layer for the Nyquist aliasing demonstrator.
//!
//! This crate provides:
//!
//! - **Decoding**: [`decode`] turns uploaded bytes into a mono [`Waveform`]
//!   (WAV through `hound`, compressed formats through `symphonia`)
//! - **WAV containers**: [`encode_pcm16`] and [`read_pcm16`] for in-memory
//!   16-bit PCM RIFF/WAVE files
//! - **Playback encoding**: [`PlaybackEncoder`] normalizes, quantizes, and
//!   wraps a buffer as a `data:audio/wav;base64,` URI
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nyquist_io::{PlaybackEncoder, decode};
//!
//! let bytes = std::fs::read("input.wav")?;
//! let waveform = decode(&bytes)?;
//!
//! let uri = PlaybackEncoder::new().encode_data_uri(waveform.samples(), waveform.sample_rate(), 1)?;
//! assert!(uri.starts_with("data:audio/wav;base64,"));
//! ```

mod decode;
mod playback;
mod wav;

pub use decode::{AutoDecoder, Decoder, SymphoniaDecoder, WavDecoder, Waveform, decode};
pub use playback::{
    DEFAULT_HEADROOM, PlaybackEncoder, WAV_DATA_URI_PREFIX, decode_data_uri, quantize_pcm16,
};
pub use wav::{WavSpec, encode_pcm16, read_pcm16, read_wav_bytes};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input contained no bytes, or decoded to no samples.
    #[error("no audio provided")]
    Empty,

    /// WAV container read/write error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// The container or codec could not be decoded.
    #[error("could not decode audio: {0}")]
    Decode(String),

    /// The recording runs past the configured duration limit.
    #[error("audio longer than the {limit_secs} s limit")]
    TooLong {
        /// Limit that was exceeded, in seconds.
        limit_secs: f64,
    },

    /// A playback data URI was malformed.
    #[error("invalid data URI: {0}")]
    DataUri(String),

    /// Base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
