//! Decoding uploaded audio bytes into a mono waveform.
//!
//! RIFF/WAVE input goes through `hound`; anything else is probed with
//! `symphonia` (MP3, Ogg Vorbis, FLAC, AAC/MP4, and the WAV encodings
//! `hound` rejects). Every decoder mixes down to mono by averaging channels
//! and can refuse input past a duration limit without decoding all of it.

use crate::wav::read_wav_limited;
use crate::{Error, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// A decoded, immutable mono sample buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
    source_channels: u16,
}

impl Waveform {
    /// Wrap already-decoded mono samples.
    ///
    /// `source_channels` records how many channels were mixed down to
    /// produce `samples`.
    pub fn new(samples: Vec<f32>, sample_rate: u32, source_channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            source_channels,
        }
    }

    /// Sample data.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Native sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of the buffer (always mono after decoding).
    pub fn channels(&self) -> u16 {
        1
    }

    /// Channel count of the uploaded file before mix-down.
    pub fn source_channels(&self) -> u16 {
        self.source_channels
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Turns raw container bytes into a [`Waveform`].
pub trait Decoder: Send + Sync {
    /// Decode `bytes`, failing on empty, unsupported, or corrupt input.
    fn decode(&self, bytes: &[u8]) -> Result<Waveform>;
}

/// RIFF/WAVE decoder backed by `hound`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder {
    max_duration_secs: Option<f64>,
}

impl WavDecoder {
    /// Decoder with no duration limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse files longer than `secs`, read from the header before any
    /// sample is decoded.
    pub fn with_max_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = Some(secs);
        self
    }
}

impl Decoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Waveform> {
        if bytes.is_empty() {
            return Err(Error::Empty);
        }
        read_wav_limited(bytes, self.max_duration_secs)
    }
}

/// Compressed-format decoder backed by `symphonia`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder {
    max_duration_secs: Option<f64>,
}

impl SymphoniaDecoder {
    /// Decoder with no duration limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop decoding as soon as more than `secs` of audio has come out of
    /// the codec.
    pub fn with_max_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = Some(secs);
        self
    }
}

impl Decoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Waveform> {
        if bytes.is_empty() {
            return Err(Error::Empty);
        }

        let source = Cursor::new(bytes.to_vec());
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(decode_error)?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("no supported audio track".into()))?;
        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        if let (Some(frames), Some(rate)) = (codec_params.n_frames, codec_params.sample_rate) {
            check_duration(frames, rate, self.max_duration_secs)?;
        }

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(decode_error)?;

        let mut sample_rate = codec_params.sample_rate;
        let mut source_channels = codec_params.channels.map(|c| c.count() as u16);
        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(decode_error(e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count();
                    sample_rate = Some(spec.rate);
                    source_channels = Some(channels as u16);

                    let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);
                    samples.extend(mix_to_mono(buffer.samples().to_vec(), channels));

                    // Headerless streams only reveal their length as they decode.
                    check_duration(samples.len() as u64, spec.rate, self.max_duration_secs)?;
                }
                Err(SymphoniaError::DecodeError(msg)) => {
                    tracing::warn!(reason = msg, "skipping undecodable packet");
                }
                Err(e) => return Err(decode_error(e)),
            }
        }

        if samples.is_empty() {
            return Err(Error::Empty);
        }
        let sample_rate =
            sample_rate.ok_or_else(|| Error::Decode("stream has no sample rate".into()))?;

        Ok(Waveform::new(samples, sample_rate, source_channels.unwrap_or(1)))
    }
}

/// Picks [`WavDecoder`] for RIFF/WAVE input and [`SymphoniaDecoder`] otherwise.
///
/// WAV files `hound` cannot read (mu-law, A-law, ADPCM and other non-PCM
/// encodings) are handed to `symphonia` before giving up.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecoder {
    max_duration_secs: Option<f64>,
}

impl AutoDecoder {
    /// Decoder with no duration limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse uploads longer than `secs`, stopping as early as the format
    /// allows.
    pub fn with_max_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = Some(secs);
        self
    }

    fn wav(&self) -> WavDecoder {
        WavDecoder {
            max_duration_secs: self.max_duration_secs,
        }
    }

    fn symphonia(&self) -> SymphoniaDecoder {
        SymphoniaDecoder {
            max_duration_secs: self.max_duration_secs,
        }
    }

    fn decode_riff(&self, bytes: &[u8]) -> Result<Waveform> {
        match self.wav().decode(bytes) {
            Err(Error::Wav(err @ (hound::Error::Unsupported | hound::Error::FormatError(_)))) => {
                tracing::debug!(error = %err, "hound cannot read this WAV, trying symphonia");
                match self.symphonia().decode(bytes) {
                    Ok(waveform) => Ok(waveform),
                    Err(too_long @ Error::TooLong { .. }) => Err(too_long),
                    Err(fallback) => {
                        tracing::debug!(error = %fallback, "symphonia cannot read it either");
                        Err(Error::Wav(err))
                    }
                }
            }
            other => other,
        }
    }
}

impl Decoder for AutoDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Waveform> {
        if bytes.is_empty() {
            return Err(Error::Empty);
        }

        let waveform = if is_riff_wave(bytes) {
            self.decode_riff(bytes)?
        } else {
            self.symphonia().decode(bytes)?
        };

        tracing::debug!(
            samples = waveform.len(),
            sample_rate = waveform.sample_rate(),
            channels = waveform.source_channels(),
            "decoded upload"
        );
        Ok(waveform)
    }
}

/// Decode `bytes` with the [`AutoDecoder`].
pub fn decode(bytes: &[u8]) -> Result<Waveform> {
    AutoDecoder::new().decode(bytes)
}

/// Fail with [`Error::TooLong`] once `frames` at `sample_rate` exceeds the limit.
pub(crate) fn check_duration(frames: u64, sample_rate: u32, limit_secs: Option<f64>) -> Result<()> {
    match limit_secs {
        Some(limit) if sample_rate > 0 && frames as f64 / f64::from(sample_rate) > limit => {
            Err(Error::TooLong { limit_secs: limit })
        }
        _ => Ok(()),
    }
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

fn decode_error(err: SymphoniaError) -> Error {
    Error::Decode(err.to_string())
}

/// Average interleaved frames down to one channel.
pub(crate) fn mix_to_mono(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::encode_pcm16;

    #[test]
    fn test_auto_routes_wav_to_hound() {
        let bytes = encode_pcm16(&[0, 8192, -8192], 16000, 1).unwrap();
        let waveform = decode(&bytes).unwrap();
        assert_eq!(waveform.sample_rate(), 16000);
        assert_eq!(waveform.samples(), &[0.0, 0.25, -0.25]);
    }

    #[test]
    fn test_empty_bytes() {
        assert!(matches!(decode(&[]), Err(Error::Empty)));
        assert!(matches!(WavDecoder::new().decode(&[]), Err(Error::Empty)));
        assert!(matches!(SymphoniaDecoder::new().decode(&[]), Err(Error::Empty)));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let garbage = b"this is definitely not an audio file, just some text bytes";
        assert!(matches!(decode(garbage), Err(Error::Decode(_))));
    }

    #[test]
    fn test_truncated_wav_header() {
        let bytes = encode_pcm16(&[1, 2, 3, 4], 8000, 1).unwrap();
        let truncated = &bytes[..20];
        let err = decode(truncated).unwrap_err();
        assert!(matches!(err, Error::Wav(_)), "got {:?}", err);
    }

    /// Hand-built 8 kHz mono G.711 mu-law file (format tag 7), which `hound`
    /// does not support.
    fn mulaw_wav(frames: usize) -> Vec<u8> {
        let data: Vec<u8> = (0..frames)
            .map(|i| if i % 2 == 0 { 0x80 } else { 0x00 })
            .collect();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(4 + 26 + 8 + data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&18u32.to_le_bytes());
        bytes.extend_from_slice(&7u16.to_le_bytes()); // WAVE_FORMAT_MULAW
        bytes.extend_from_slice(&1u16.to_le_bytes()); // channels
        bytes.extend_from_slice(&8000u32.to_le_bytes()); // sample rate
        bytes.extend_from_slice(&8000u32.to_le_bytes()); // byte rate
        bytes.extend_from_slice(&1u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&8u16.to_le_bytes()); // bits per sample
        bytes.extend_from_slice(&0u16.to_le_bytes()); // cbSize
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&data);
        bytes
    }

    #[test]
    fn test_mulaw_wav_falls_back_to_symphonia() {
        let bytes = mulaw_wav(800);
        assert!(matches!(
            WavDecoder::new().decode(&bytes),
            Err(Error::Wav(hound::Error::Unsupported))
        ));

        let waveform = decode(&bytes).unwrap();
        assert_eq!(waveform.len(), 800);
        assert_eq!(waveform.sample_rate(), 8000);
        assert_eq!(waveform.source_channels(), 1);
        let peak = waveform.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.5, "mu-law extremes decode near full scale, got {peak}");
    }

    #[test]
    fn test_unreadable_riff_keeps_hound_error() {
        // fmt chunk claims an unknown format tag and symphonia cannot use it either.
        let mut bytes = mulaw_wav(16);
        bytes[20..22].copy_from_slice(&0x1234u16.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(Error::Wav(hound::Error::Unsupported))
        ));
    }

    #[test]
    fn test_wav_duration_limit_reads_header_only() {
        let bytes = encode_pcm16(&[0; 16000], 8000, 1).unwrap();
        let err = WavDecoder::new().with_max_duration(1.5).decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::TooLong { limit_secs } if limit_secs == 1.5));

        // The header is checked before the data: a file cut short still reports the limit.
        let truncated = &bytes[..200];
        assert!(matches!(
            WavDecoder::new().with_max_duration(1.5).decode(truncated),
            Err(Error::TooLong { .. })
        ));

        let ok = WavDecoder::new().with_max_duration(2.0).decode(&bytes).unwrap();
        assert_eq!(ok.len(), 16000);
    }

    #[test]
    fn test_symphonia_duration_limit() {
        let bytes = encode_pcm16(&[100; 16000], 8000, 1).unwrap();
        let err = SymphoniaDecoder::new()
            .with_max_duration(0.5)
            .decode(&bytes)
            .unwrap_err();
        assert!(matches!(err, Error::TooLong { .. }), "got {err:?}");
        assert!(SymphoniaDecoder::new().with_max_duration(3.0).decode(&bytes).is_ok());
    }

    #[test]
    fn test_auto_decoder_limit_covers_fallback() {
        let bytes = mulaw_wav(8000);
        let err = AutoDecoder::new().with_max_duration(0.25).decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::TooLong { .. }), "got {err:?}");
        assert_eq!(
            AutoDecoder::new().with_max_duration(1.0).decode(&bytes).unwrap().len(),
            8000
        );
    }

    #[test]
    fn test_mix_to_mono_averages() {
        assert_eq!(mix_to_mono(vec![1.0, 3.0, -1.0, 1.0], 2), vec![2.0, 0.0]);
        assert_eq!(mix_to_mono(vec![0.5, 0.25], 1), vec![0.5, 0.25]);
    }

    #[test]
    fn test_waveform_duration() {
        let waveform = Waveform::new(vec![0.0; 22050], 44100, 1);
        assert_eq!(waveform.duration_secs(), 0.5);
        assert_eq!(waveform.len(), 22050);
        assert!(!waveform.is_empty());
    }
}
