//! Fourier-domain sample-rate conversion with no anti-aliasing stage.
//!
//! The signal is transformed once, its spectrum truncated (downsampling) or
//! zero-padded (upsampling) to the output length, and transformed back. No
//! low-pass filter runs before the conversion; whatever the spectrum
//! truncation does to content above the new Nyquist is exactly what the
//! listener is meant to hear.
//!
//! For an output length `M` and input length `N`, bins `0..=min(M, N)/2` are
//! carried over. When `min(M, N)` is even the bin at `min(M, N)/2` is the
//! shared Nyquist component: it is doubled when shrinking and halved when
//! growing, so its energy is split/joined the same way the periodic signal
//! would be. The output is scaled by `M / N` to preserve amplitude.
//!
//! # Example
//!
//! ```rust
//! use nyquist_analysis::resample::{output_len, resample_rate};
//!
//! let signal = vec![0.0f32; 44100];
//! let out = resample_rate(&signal, 44100, 500);
//! assert_eq!(out.len(), output_len(44100, 44100, 500));
//! assert_eq!(out.len(), 500);
//! ```

use crate::fft::Fft;
use rustfft::num_complex::Complex;

/// Number of samples a buffer of `input_len` samples at `from_rate` occupies
/// at `to_rate`, rounded to the nearest integer.
pub fn output_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
    if from_rate == 0 {
        return 0;
    }
    (input_len as f64 * to_rate as f64 / from_rate as f64).round() as usize
}

/// Resample `signal` from `from_rate` to `to_rate` Hz.
///
/// Shorthand for [`fourier_resample`] with [`output_len`] samples.
pub fn resample_rate(signal: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    fourier_resample(signal, output_len(signal.len(), from_rate, to_rate))
}

/// Resample `signal` to exactly `num` samples in the frequency domain.
///
/// An empty input yields `num` zeros; `num == 0` yields an empty vector.
pub fn fourier_resample(signal: &[f32], num: usize) -> Vec<f32> {
    let nx = signal.len();
    if num == 0 {
        return Vec::new();
    }
    if nx == 0 {
        return vec![0.0; num];
    }

    let spectrum = Fft::new(nx).spectrum(signal);

    // Non-negative half of the output spectrum.
    let shared = num.min(nx);
    let carried = shared / 2 + 1;
    let mut half = vec![Complex::new(0.0f32, 0.0); num / 2 + 1];
    half[..carried].copy_from_slice(&spectrum[..carried]);

    if shared % 2 == 0 {
        let nyq = shared / 2;
        if num < nx {
            half[nyq] *= 2.0;
        } else if nx < num {
            half[nyq] *= 0.5;
        }
    }

    // Rebuild the Hermitian spectrum of length `num`.
    let mut full = Vec::with_capacity(num);
    full.extend_from_slice(&half);
    full.truncate(num);
    for k in full.len()..num {
        full.push(half[num - k].conj());
    }

    let fft = Fft::new(num);
    let scale = num as f32 / nx as f32;
    fft.inverse_real(full)
        .into_iter()
        .map(|x| x * scale)
        .collect()
}
