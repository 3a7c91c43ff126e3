//! Session-backed analyze/resample service for the Nyquist aliasing
//! demonstrator.
//!
//! - [`store`] - [`SessionStore`], the in-memory map from [`SessionId`] to
//!   analysed uploads, with optional TTL or capacity eviction
//! - [`service`] - [`Service::analyze`] and [`Service::resample`]
//! - [`reply`] - JSON reply payloads and the `success` envelope
//! - [`request`] - line-delimited JSON requests for long-running use
//!
//! ## Example
//!
//! ```rust
//! use nyquist_io::encode_pcm16;
//! use nyquist_session::Service;
//!
//! let pcm: Vec<i16> = (0..16000)
//!     .map(|i| ((2.0 * std::f32::consts::PI * 440.0 * i as f32 / 8000.0).sin() * 16000.0) as i16)
//!     .collect();
//! let wav = encode_pcm16(&pcm, 8000, 1).unwrap();
//!
//! let service = Service::default();
//! let analyzed = service.analyze(&wav).unwrap();
//! assert!((analyzed.fmax - 440.0).abs() <= 0.5);
//!
//! let aliased = service.resample(&analyzed.session_id.to_string(), 500).unwrap();
//! assert!(aliased.is_below_nyquist);
//! assert_eq!(aliased.playback_sr, 44100);
//! ```

mod error;

pub mod reply;
pub mod request;
pub mod service;
pub mod store;

pub use error::{ErrorKind, ServiceError};
pub use reply::{AnalyzeReply, ResampleReply, Response};
pub use request::{DEFAULT_SAMPLING_RATE, Request, handle_line};
pub use service::Service;
pub use store::{Clock, EvictionPolicy, Session, SessionId, SessionStore, SystemClock};
