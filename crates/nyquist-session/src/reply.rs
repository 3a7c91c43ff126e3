//! JSON reply shapes.
//!
//! Every reply carries a `success` flag. Successful replies flatten their
//! payload next to it; failures carry only `error`:
//!
//! ```json
//! {"success":true,"fmax":440.0,"nyquist_freq":880.0,"original_sr":44100,"session_id":"..."}
//! {"success":false,"error":"session not found: ..."}
//! ```

use serde::Serialize;

use crate::{ServiceError, SessionId};

/// Payload of a successful `analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeReply {
    /// Highest significant frequency in Hz, two decimals.
    pub fmax: f64,
    /// Implied Nyquist rate in Hz, two decimals.
    pub nyquist_freq: f64,
    /// Native rate of the upload.
    pub original_sr: u32,
    /// Handle for follow-up `resample` requests.
    pub session_id: SessionId,
}

/// Payload of a successful `resample`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResampleReply {
    /// `data:audio/wav;base64,` playback URI.
    pub audio_data: String,
    /// Whether the requested rate is under the stored Nyquist rate.
    pub is_below_nyquist: bool,
    /// Requested sampling rate.
    pub current_sr: u32,
    /// Rate written into the WAV header.
    pub playback_sr: u32,
    /// Nyquist rate from the original analysis, two decimals.
    pub nyquist_freq: f64,
}

/// `success`-tagged envelope around a reply or an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T> {
    /// True when `body` is present.
    pub success: bool,
    /// Payload fields, flattened into the envelope.
    #[serde(flatten)]
    pub body: Option<T>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Response<T> {
    /// Failure envelope.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            body: None,
            error: Some(error.into()),
        }
    }
}

impl<T> From<Result<T, ServiceError>> for Response<T> {
    fn from(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(body) => Self {
                success: true,
                body: Some(body),
                error: None,
            },
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

/// Round to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
