//! Aliasing demo: measure a two-tone signal, then convert it to a range of
//! rates and report which ones fall under the implied Nyquist rate.
//!
//! Run with: cargo run -p nyquist-analysis --example aliasing_demo

use nyquist_analysis::{analyze_bandwidth, fft::Fft, magnitudes, resample_rate};
use std::f32::consts::PI;

fn main() {
    let sample_rate = 44100u32;
    let len = 2 * sample_rate as usize;

    // --- Two tones: 440 Hz and a quieter 3 kHz partial ---
    println!("=== Bandwidth of a 440 Hz + 3 kHz signal ===\n");

    let signal: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.8 * (2.0 * PI * 440.0 * t).sin() + 0.2 * (2.0 * PI * 3000.0 * t).sin()
        })
        .collect();

    let analysis = analyze_bandwidth(&signal, sample_rate).expect("non-empty signal");
    println!("Samples:       {} at {} Hz", len, sample_rate);
    println!("fmax:          {:.2} Hz", analysis.fmax);
    println!("Nyquist rate:  {:.2} Hz\n", analysis.nyquist_freq);

    // --- Sweep target rates ---
    println!("{:>8} {:>8} {:>14} {:>10}", "Rate", "Samples", "Peak (Hz)", "Aliased");
    println!("{:->8} {:->8} {:->14} {:->10}", "", "", "", "");

    for target in [44100u32, 16000, 8000, 6000, 4000, 1000] {
        let out = resample_rate(&signal, sample_rate, target);
        let fft = Fft::new(out.len());
        let mags = magnitudes(&fft.spectrum(&out));
        let half = &mags[..out.len() / 2];
        let peak_bin = half
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let peak_hz = peak_bin as f64 * target as f64 / out.len() as f64;

        println!(
            "{:>8} {:>8} {:>14.1} {:>10}",
            target,
            out.len(),
            peak_hz,
            if analysis.is_below_nyquist(target) { "yes" } else { "no" }
        );
    }
}
