//! Property-based tests for the bandwidth analyzer and resampler.
//!
//! Uses proptest to check the structural guarantees (Nyquist identity,
//! output lengths, finiteness) over randomized buffers and rates.

use nyquist_analysis::{analyze_bandwidth, fourier_resample, output_len, resample_rate};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The implied Nyquist rate is always exactly twice `fmax`, and `fmax`
    /// never leaves the non-negative half spectrum.
    #[test]
    fn nyquist_is_twice_fmax(
        samples in prop::collection::vec(-1.0f32..=1.0f32, 1..512),
        sample_rate in 1000u32..96000,
    ) {
        let result = analyze_bandwidth(&samples, sample_rate).unwrap();
        prop_assert_eq!(result.nyquist_freq, 2.0 * result.fmax);
        prop_assert!(result.fmax >= 0.0);
        prop_assert!(result.fmax <= sample_rate as f64 / 2.0);
        prop_assert_eq!(result.original_sample_rate, sample_rate);
    }

    /// Resampling produces exactly the rounded sample count.
    #[test]
    fn resample_length_matches_rounded_ratio(
        samples in prop::collection::vec(-1.0f32..=1.0f32, 1..400),
        from_rate in 1000u32..48000,
        to_rate in 1u32..96000,
    ) {
        let out = resample_rate(&samples, from_rate, to_rate);
        let expected = (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
        prop_assert!(out.len().abs_diff(expected) <= 1);
        prop_assert_eq!(out.len(), output_len(samples.len(), from_rate, to_rate));
    }

    /// Bounded input never produces NaN or infinity.
    #[test]
    fn resample_output_is_finite(
        samples in prop::collection::vec(-1.0f32..=1.0f32, 1..300),
        num in 1usize..600,
    ) {
        let out = fourier_resample(&samples, num);
        prop_assert_eq!(out.len(), num);
        prop_assert!(out.iter().all(|x| x.is_finite()));
    }
}
