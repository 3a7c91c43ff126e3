//! Line-delimited JSON requests.
//!
//! One request object per line, tagged by `op`:
//!
//! ```json
//! {"op":"analyze","path":"tone.wav"}
//! {"op":"analyze","audio_base64":"UklGR..."}
//! {"op":"resample","session_id":"0b6f...","sampling_rate":500}
//! ```
//!
//! Every line gets exactly one reply line, including lines that fail to
//! parse.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::reply::Response;
use crate::service::{Result, Service};
use crate::ServiceError;

/// Rate used when a resample request omits `sampling_rate`.
pub const DEFAULT_SAMPLING_RATE: i64 = 44100;

fn default_sampling_rate() -> i64 {
    DEFAULT_SAMPLING_RATE
}

/// A decoded request line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Analyse audio read from `path` or carried inline as base64.
    Analyze {
        /// File to read.
        #[serde(default)]
        path: Option<PathBuf>,
        /// Standard-alphabet base64 of the file contents.
        #[serde(default)]
        audio_base64: Option<String>,
    },
    /// Resample an analysed session.
    Resample {
        /// Id returned by `analyze`.
        session_id: String,
        /// Target rate in Hz.
        #[serde(default = "default_sampling_rate")]
        sampling_rate: i64,
    },
}

impl Request {
    /// Run the request and serialize its reply.
    pub fn dispatch(self, service: &Service) -> String {
        match self {
            Request::Analyze { path, audio_base64 } => {
                let result = load_audio(path, audio_base64).and_then(|bytes| service.analyze(&bytes));
                encode(&Response::from(result))
            }
            Request::Resample {
                session_id,
                sampling_rate,
            } => encode(&Response::from(service.resample(&session_id, sampling_rate))),
        }
    }
}

/// Parse one line and produce its reply line.
pub fn handle_line(service: &Service, line: &str) -> String {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => request.dispatch(service),
        Err(err) => {
            tracing::warn!(error = %err, "malformed request");
            encode(&Response::<()>::failure(format!("malformed request: {err}")))
        }
    }
}

fn load_audio(path: Option<PathBuf>, audio_base64: Option<String>) -> Result<Vec<u8>> {
    match (path, audio_base64) {
        (Some(path), None) => std::fs::read(&path).map_err(|err| {
            ServiceError::InvalidInput(format!("could not read '{}': {err}", path.display()))
        }),
        (None, Some(encoded)) => STANDARD
            .decode(encoded.trim())
            .map_err(|err| ServiceError::InvalidInput(format!("invalid base64 audio: {err}"))),
        (None, None) => Err(ServiceError::InvalidInput("no audio provided".into())),
        (Some(_), Some(_)) => Err(ServiceError::InvalidInput(
            "give either path or audio_base64, not both".into(),
        )),
    }
}

fn encode<T: Serialize>(response: &Response<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|err| {
        serde_json::json!({ "success": false, "error": err.to_string() }).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nyquist_io::encode_pcm16;
    use serde_json::Value;

    fn reply(service: &Service, line: &str) -> Value {
        serde_json::from_str(&handle_line(service, line)).unwrap()
    }

    fn tone_base64() -> String {
        let pcm: Vec<i16> = (0..4000)
            .map(|i| ((i as f32 * 0.2).sin() * 12000.0) as i16)
            .collect();
        STANDARD.encode(encode_pcm16(&pcm, 8000, 1).unwrap())
    }

    #[test]
    fn parses_tagged_requests() {
        let req: Request = serde_json::from_str(r#"{"op":"analyze","path":"a.wav"}"#).unwrap();
        assert_eq!(
            req,
            Request::Analyze {
                path: Some(PathBuf::from("a.wav")),
                audio_base64: None
            }
        );

        let req: Request = serde_json::from_str(r#"{"op":"resample","session_id":"x"}"#).unwrap();
        assert_eq!(
            req,
            Request::Resample {
                session_id: "x".into(),
                sampling_rate: 44100
            }
        );
    }

    #[test]
    fn inline_analyze_then_resample() {
        let service = Service::default();
        let analyzed = reply(
            &service,
            &format!(r#"{{"op":"analyze","audio_base64":"{}"}}"#, tone_base64()),
        );
        assert_eq!(analyzed["success"], true);
        assert_eq!(analyzed["original_sr"], 8000);

        let id = analyzed["session_id"].as_str().unwrap();
        let resampled = reply(
            &service,
            &format!(r#"{{"op":"resample","session_id":"{id}","sampling_rate":1000}}"#),
        );
        assert_eq!(resampled["success"], true);
        assert_eq!(resampled["current_sr"], 1000);
        assert_eq!(resampled["playback_sr"], 44100);
        assert!(
            resampled["audio_data"]
                .as_str()
                .unwrap()
                .starts_with("data:audio/wav;base64,")
        );
    }

    #[test]
    fn failures_are_replies() {
        let service = Service::default();

        let garbage = reply(&service, "{not json");
        assert_eq!(garbage["success"], false);
        assert!(garbage["error"].as_str().unwrap().starts_with("malformed request"));

        let unknown_op = reply(&service, r#"{"op":"transcode"}"#);
        assert_eq!(unknown_op["success"], false);

        let no_audio = reply(&service, r#"{"op":"analyze"}"#);
        assert_eq!(no_audio["error"], "invalid input: no audio provided");

        let missing = reply(
            &service,
            r#"{"op":"resample","session_id":"nope","sampling_rate":500}"#,
        );
        assert_eq!(missing["error"], "session not found: nope");
    }

    #[test]
    fn unreadable_path_is_invalid_input() {
        let service = Service::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wav");
        let line = serde_json::json!({"op": "analyze", "path": path}).to_string();

        let value = reply(&service, &line);
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().contains("could not read"));
    }
}
