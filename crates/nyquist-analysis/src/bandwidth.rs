//! Effective bandwidth and implied Nyquist rate of a recording.
//!
//! The whole buffer goes through one unwindowed DFT. Bins `0..N/2` form the
//! non-negative half spectrum, bin `k` sitting at `k * fs / N` Hz. A bin is
//! *significant* when its magnitude is strictly greater than
//! `significance_ratio * max(magnitude)`; the highest significant bin gives
//! `fmax`, and the implied Nyquist rate is `2 * fmax`.
//!
//! When nothing is strictly above the threshold (only possible when every
//! magnitude equals the peak, e.g. digital silence) the peak bin itself is
//! used, taking the lowest index among ties. Silence therefore reports
//! `fmax == 0`.
//!
//! # Example
//!
//! ```rust
//! use nyquist_analysis::bandwidth::analyze_bandwidth;
//!
//! let sr = 8000;
//! let signal: Vec<f32> = (0..8000)
//!     .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / sr as f32).sin())
//!     .collect();
//!
//! let result = analyze_bandwidth(&signal, sr).unwrap();
//! assert!((result.fmax - 1000.0).abs() <= 1.0);
//! assert_eq!(result.nyquist_freq, 2.0 * result.fmax);
//! ```

use crate::fft::{Fft, magnitudes};
use crate::{AnalysisError, Result};

/// Fraction of the peak magnitude a bin must exceed to count as significant.
pub const DEFAULT_SIGNIFICANCE_RATIO: f32 = 0.01;

/// Bandwidth measurement for one recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandwidthAnalysis {
    /// Highest significant frequency in Hz.
    pub fmax: f64,
    /// Implied Nyquist rate in Hz, always exactly `2 * fmax`.
    pub nyquist_freq: f64,
    /// Sample rate of the analysed buffer.
    pub original_sample_rate: u32,
}

impl BandwidthAnalysis {
    fn from_fmax(fmax: f64, original_sample_rate: u32) -> Self {
        Self {
            fmax,
            nyquist_freq: 2.0 * fmax,
            original_sample_rate,
        }
    }

    /// Whether sampling at `rate` Hz falls below the implied Nyquist rate.
    pub fn is_below_nyquist(&self, rate: u32) -> bool {
        (rate as f64) < self.nyquist_freq
    }
}

/// Configurable bandwidth analyzer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandwidthAnalyzer {
    significance_ratio: f32,
}

impl Default for BandwidthAnalyzer {
    fn default() -> Self {
        Self {
            significance_ratio: DEFAULT_SIGNIFICANCE_RATIO,
        }
    }
}

impl BandwidthAnalyzer {
    /// Analyzer with the default 1% significance ratio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the significance ratio (fraction of peak magnitude).
    pub fn with_significance_ratio(mut self, ratio: f32) -> Self {
        self.significance_ratio = ratio;
        self
    }

    /// Current significance ratio.
    pub fn significance_ratio(&self) -> f32 {
        self.significance_ratio
    }

    /// Measure the effective bandwidth of `samples` recorded at `sample_rate`.
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> Result<BandwidthAnalysis> {
        if samples.is_empty() {
            return Err(AnalysisError::InvalidInput("empty buffer".into()));
        }
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput("sample rate must be positive".into()));
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(AnalysisError::InvalidInput(
                "buffer contains non-finite samples".into(),
            ));
        }

        let n = samples.len();
        let half = half_spectrum(samples);
        let bin = significant_bin(&half, self.significance_ratio);
        let fmax = bin as f64 * sample_rate as f64 / n as f64;

        Ok(BandwidthAnalysis::from_fmax(fmax, sample_rate))
    }
}

/// Measure bandwidth with the default significance ratio.
pub fn analyze_bandwidth(samples: &[f32], sample_rate: u32) -> Result<BandwidthAnalysis> {
    BandwidthAnalyzer::default().analyze(samples, sample_rate)
}

/// Magnitudes of bins `0..N/2`. A single-sample buffer keeps its DC bin.
fn half_spectrum(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    let fft = Fft::new(n);
    let spectrum = fft.spectrum(samples);
    let keep = (n / 2).max(1);
    magnitudes(&spectrum[..keep])
}

/// Index of the highest significant bin, or of the peak bin when none is.
fn significant_bin(magnitudes: &[f32], ratio: f32) -> usize {
    let mut peak_bin = 0;
    let mut peak = f32::NEG_INFINITY;
    for (i, &m) in magnitudes.iter().enumerate() {
        // Strict comparison keeps the lowest index on ties.
        if m > peak {
            peak = m;
            peak_bin = i;
        }
    }

    let threshold = peak * ratio;
    magnitudes
        .iter()
        .rposition(|&m| m > threshold)
        .unwrap_or(peak_bin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn test_bin_aligned_sine() {
        let sr = 44100;
        let result = analyze_bandwidth(&sine(440.0, sr, 88200), sr).unwrap();
        let bin_width = sr as f64 / 88200.0;

        assert!((result.fmax - 440.0).abs() <= bin_width, "fmax = {}", result.fmax);
        assert_eq!(result.nyquist_freq, 2.0 * result.fmax);
        assert_eq!(result.original_sample_rate, sr);
    }

    #[test]
    fn test_highest_of_two_tones_wins() {
        let sr = 8000;
        let a = sine(500.0, sr, 8000);
        let b = sine(2500.0, sr, 8000);
        let mixed: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + 0.2 * y).collect();

        let result = analyze_bandwidth(&mixed, sr).unwrap();
        assert!((result.fmax - 2500.0).abs() <= 1.0, "fmax = {}", result.fmax);
    }

    #[test]
    fn test_quiet_tone_below_threshold_is_ignored() {
        let sr = 8000;
        let a = sine(500.0, sr, 8000);
        let b = sine(2500.0, sr, 8000);
        // 0.5% of the main tone: under the 1% cut.
        let mixed: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + 0.005 * y).collect();

        let result = analyze_bandwidth(&mixed, sr).unwrap();
        assert!((result.fmax - 500.0).abs() <= 1.0, "fmax = {}", result.fmax);
    }

    #[test]
    fn test_custom_ratio_changes_cut() {
        let sr = 8000;
        let a = sine(500.0, sr, 8000);
        let b = sine(2500.0, sr, 8000);
        let mixed: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + 0.005 * y).collect();

        let analyzer = BandwidthAnalyzer::new().with_significance_ratio(0.001);
        let result = analyzer.analyze(&mixed, sr).unwrap();
        assert!((result.fmax - 2500.0).abs() <= 1.0, "fmax = {}", result.fmax);
    }

    #[test]
    fn test_silence_falls_back_to_lowest_bin() {
        let result = analyze_bandwidth(&[0.0; 1024], 8000).unwrap();
        assert_eq!(result.fmax, 0.0);
        assert_eq!(result.nyquist_freq, 0.0);
    }

    #[test]
    fn test_dc_only_signal() {
        let result = analyze_bandwidth(&[0.5; 64], 1000).unwrap();
        assert_eq!(result.fmax, 0.0);
    }

    #[test]
    fn test_single_sample() {
        let result = analyze_bandwidth(&[0.3], 44100).unwrap();
        assert_eq!(result.fmax, 0.0);
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let err = analyze_bandwidth(&[], 44100).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_zero_rate_rejected() {
        let err = analyze_bandwidth(&[0.1, 0.2], 0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_nan_rejected() {
        let err = analyze_bandwidth(&[0.1, f32::NAN, 0.2], 8000).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_significant_bin_ties_pick_lowest() {
        assert_eq!(significant_bin(&[0.0, 0.0, 0.0], 0.01), 0);
        assert_eq!(significant_bin(&[1.0, 3.0, 3.0, 0.0], 1.0), 1);
    }

    #[test]
    fn test_below_nyquist_uses_stored_rate() {
        let analysis = BandwidthAnalysis::from_fmax(440.0, 44100);
        assert!(analysis.is_below_nyquist(500));
        assert!(!analysis.is_below_nyquist(880));
        assert!(!analysis.is_below_nyquist(2000));
    }
}
