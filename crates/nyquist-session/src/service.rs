//! The `analyze` / `resample` request pair.
//!
//! `analyze` decodes an upload, measures its bandwidth, and stores both as a
//! session. `resample` converts a stored waveform to an arbitrary rate with
//! no anti-aliasing filter, so targets under the Nyquist rate audibly alias,
//! then encodes the result for playback.
//!
//! Targets under the playback floor (8000 Hz by default) are converted a
//! second time, up to the playback rate (44100 Hz by default), because
//! players refuse very low rates. That second pass runs on the already
//! aliased buffer, so the folding stays audible.

use nyquist_analysis::{BandwidthAnalyzer, fourier_resample, output_len};
use nyquist_config::{LimitsConfig, PlaybackConfig, ServiceConfig};
use nyquist_io::{AutoDecoder, Decoder, PlaybackEncoder};

use crate::reply::{AnalyzeReply, ResampleReply, round2};
use crate::store::{EvictionPolicy, SessionId, SessionStore};
use crate::ServiceError;

/// Result of a service request.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Request handler owning the session store.
pub struct Service {
    store: SessionStore,
    decoder: Box<dyn Decoder>,
    analyzer: BandwidthAnalyzer,
    encoder: PlaybackEncoder,
    playback: PlaybackConfig,
    limits: LimitsConfig,
}

impl Default for Service {
    fn default() -> Self {
        Self::new(&ServiceConfig::default())
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("store", &self.store)
            .field("analyzer", &self.analyzer)
            .field("encoder", &self.encoder)
            .field("playback", &self.playback)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Service configured from `config`, with a store using its session policy.
    pub fn new(config: &ServiceConfig) -> Self {
        let policy = EvictionPolicy::from(&config.sessions);
        Self::with_store(config, SessionStore::new(policy))
    }

    /// Service backed by a caller-built store.
    pub fn with_store(config: &ServiceConfig, store: SessionStore) -> Self {
        let decoder = match config.limits.max_duration_secs {
            Some(secs) => AutoDecoder::new().with_max_duration(secs),
            None => AutoDecoder::new(),
        };
        Self {
            store,
            decoder: Box::new(decoder),
            analyzer: BandwidthAnalyzer::new()
                .with_significance_ratio(config.analysis.significance_ratio),
            encoder: PlaybackEncoder::new().with_headroom(config.playback.headroom),
            playback: config.playback,
            limits: config.limits,
        }
    }

    /// Replace the upload decoder.
    ///
    /// The configured duration limit is still checked on what `decoder`
    /// returns, but only after it has decoded everything.
    pub fn with_decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Decode and analyse an upload, creating a session.
    pub fn analyze(&self, audio: &[u8]) -> Result<AnalyzeReply> {
        if audio.is_empty() {
            return Err(reject("no audio provided"));
        }
        if let Some(max) = self.limits.max_input_bytes
            && audio.len() as u64 > max
        {
            return Err(reject(format!(
                "upload of {} bytes exceeds the {max}-byte limit",
                audio.len()
            )));
        }

        let waveform = self.decoder.decode(audio).inspect_err(|err| {
            tracing::warn!(bytes = audio.len(), error = %err, "rejected upload");
        })?;
        if waveform.is_empty() {
            return Err(reject("no audio provided"));
        }
        if let Some(max) = self.limits.max_duration_secs
            && waveform.duration_secs() > max
        {
            return Err(reject(format!(
                "recording of {:.1} s exceeds the {max} s limit",
                waveform.duration_secs()
            )));
        }

        let analysis = self
            .analyzer
            .analyze(waveform.samples(), waveform.sample_rate())?;

        let id = self.store.put(waveform, analysis);
        tracing::info!(
            session_id = %id,
            fmax = analysis.fmax,
            nyquist_freq = analysis.nyquist_freq,
            original_sr = analysis.original_sample_rate,
            "analyzed upload"
        );

        Ok(AnalyzeReply {
            fmax: round2(analysis.fmax),
            nyquist_freq: round2(analysis.nyquist_freq),
            original_sr: analysis.original_sample_rate,
            session_id: id,
        })
    }

    /// Convert a stored session to `sampling_rate` and encode it for playback.
    pub fn resample(&self, session_id: &str, sampling_rate: i64) -> Result<ResampleReply> {
        let target = self.target_rate(sampling_rate)?;
        let id: SessionId = session_id
            .parse()
            .map_err(|_| ServiceError::SessionNotFound(session_id.to_string()))?;
        let session = self.store.get(&id)?;

        let waveform = session.waveform();
        let analysis = session.analysis();
        let original_rate = waveform.sample_rate();

        let count = output_len(waveform.len(), original_rate, target);
        if count == 0 {
            return Err(reject(format!(
                "{target} Hz leaves no samples for {} samples at {original_rate} Hz",
                waveform.len()
            )));
        }
        let aliased = fourier_resample(waveform.samples(), count);

        let (buffer, playback_sr) = if target < self.playback.min_native_rate {
            let playback_rate = self.playback.playback_rate;
            let up = output_len(count, target, playback_rate);
            (fourier_resample(&aliased, up), playback_rate)
        } else {
            (aliased, target)
        };
        tracing::debug!(
            session_id = %id,
            output_count = count,
            playback_samples = buffer.len(),
            playback_sr,
            "resampled session"
        );

        let audio_data = self
            .encoder
            .encode_data_uri(&buffer, playback_sr, 1)
            .map_err(|err| ServiceError::Internal(err.to_string()))?;

        let is_below_nyquist = analysis.is_below_nyquist(target);
        tracing::info!(
            session_id = %id,
            current_sr = target,
            playback_sr,
            is_below_nyquist,
            "resample complete"
        );

        Ok(ResampleReply {
            audio_data,
            is_below_nyquist,
            current_sr: target,
            playback_sr,
            nyquist_freq: round2(analysis.nyquist_freq),
        })
    }

    fn target_rate(&self, sampling_rate: i64) -> Result<u32> {
        if sampling_rate <= 0 {
            return Err(reject(format!(
                "sampling rate must be a positive integer, got {sampling_rate}"
            )));
        }
        let rate = u32::try_from(sampling_rate)
            .map_err(|_| reject(format!("sampling rate {sampling_rate} Hz is out of range")))?;
        if let Some(max) = self.limits.max_target_rate
            && rate > max
        {
            return Err(reject(format!(
                "sampling rate {rate} Hz exceeds the {max} Hz limit"
            )));
        }
        Ok(rate)
    }
}

fn reject(msg: impl Into<String>) -> ServiceError {
    let err = ServiceError::invalid(msg);
    tracing::warn!(error = %err, "rejected request");
    err
}
