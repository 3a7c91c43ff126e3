//! Nyquist Analysis - Spectral bandwidth measurement and aliasing resampler
//!
//! This crate holds the numeric core of the aliasing demonstrator:
//!
//! - [`fft`] - Whole-buffer FFT wrapper
//! - [`bandwidth`] - Highest significant frequency and implied Nyquist rate
//! - [`resample`] - Fourier-domain rate conversion with no anti-aliasing filter
//!
//! ## Example Workflow
//!
//! ```rust
//! use nyquist_analysis::{analyze_bandwidth, resample_rate};
//!
//! let sr = 8000;
//! let tone: Vec<f32> = (0..8000)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sr as f32).sin())
//!     .collect();
//!
//! // 1. Measure the bandwidth
//! let analysis = analyze_bandwidth(&tone, sr).unwrap();
//!
//! // 2. Pick a rate under the implied Nyquist and convert
//! let target = 600;
//! assert!(analysis.is_below_nyquist(target));
//! let aliased = resample_rate(&tone, sr, target);
//! assert_eq!(aliased.len(), 600);
//! ```

pub mod bandwidth;
pub mod fft;
pub mod resample;

pub use bandwidth::{
    BandwidthAnalysis, BandwidthAnalyzer, DEFAULT_SIGNIFICANCE_RATIO, analyze_bandwidth,
};
pub use fft::{Fft, magnitudes};
pub use resample::{fourier_resample, output_len, resample_rate};

/// Error types for spectral analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The buffer or its parameters cannot be analysed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
