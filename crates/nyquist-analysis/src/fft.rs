//! FFT wrapper shared by the bandwidth analyzer and the Fourier resampler.
//!
//! Both consumers transform a whole recording at once, so a plan is created
//! per buffer length rather than per block.

use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Forward/inverse FFT pair planned for one transform length.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    ifft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Plan forward and inverse transforms of length `size`.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self { fft, ifft, size }
    }

    /// Transform length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Full complex spectrum of a real signal.
    ///
    /// The input is zero-padded or truncated to the transform length. All
    /// `size` bins are returned, negative frequencies included, with no
    /// window applied.
    pub fn spectrum(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);
        buffer
    }

    /// Inverse transform of a full spectrum, keeping only the real part.
    ///
    /// Output is normalized by `1 / size`, so `inverse_real(spectrum(x)) == x`
    /// up to rounding. Imaginary residue (from a spectrum that is not exactly
    /// Hermitian) is discarded.
    pub fn inverse_real(&self, mut spectrum: Vec<Complex<f32>>) -> Vec<f32> {
        spectrum.resize(self.size, Complex::new(0.0, 0.0));
        self.ifft.process(&mut spectrum);

        let scale = 1.0 / self.size as f32;
        spectrum.iter().map(|c| c.re * scale).collect()
    }
}

/// Magnitude (`|X[k]|`) of each bin.
pub fn magnitudes(spectrum: &[Complex<f32>]) -> Vec<f32> {
    spectrum.iter().map(|c| c.norm()).collect()
}
