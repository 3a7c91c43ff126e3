//! Configuration for the nyquist analyze/resample service.
//!
//! A single TOML file controls the analysis threshold, playback encoding,
//! per-request limits, and session retention. Every value has a default, so
//! an empty or missing file is a valid configuration.
//!
//! # Example
//!
//! ```rust
//! use nyquist_config::ServiceConfig;
//!
//! let config = ServiceConfig::from_toml(
//!     r#"
//!     [playback]
//!     headroom = 0.9
//!
//!     [sessions]
//!     capacity = 16
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.playback.headroom, 0.9);
//! assert_eq!(config.playback.playback_rate, 44100);
//! assert_eq!(config.sessions.capacity, Some(16));
//! ```

mod config;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

pub use config::{AnalysisConfig, LimitsConfig, PlaybackConfig, ServiceConfig, SessionsConfig};
pub use error::ConfigError;
pub use paths::{default_config_path, user_config_dir};
