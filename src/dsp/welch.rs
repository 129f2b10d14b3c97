use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::TAU;

use super::power_db;

/// Welch averaged-periodogram power spectrum in dB, restricted to the
/// audible range [20 Hz, min(20 kHz, Nyquist)].
///
/// Segments of `nperseg` samples (capped at the buffer length) with 50%
/// overlap, periodic Hann window, per-segment mean removal, and
/// power-spectrum scaling (1 / (sum w)^2, one-sided doubling except at DC
/// and Nyquist). Returns parallel (frequency, magnitude_db) vectors.
pub fn welch_power_db(samples: &[f32], sample_rate: u32, nperseg: usize) -> (Vec<f32>, Vec<f32>) {
    let n = samples.len();
    let nperseg = nperseg.min(n);
    if nperseg < 2 {
        return (Vec::new(), Vec::new());
    }
    let step = nperseg - nperseg / 2;

    let window: Vec<f64> = (0..nperseg)
        .map(|i| 0.5 * (1.0 - (TAU * i as f64 / nperseg as f64).cos()))
        .collect();
    let win_sum: f64 = window.iter().sum();
    let scale = 1.0 / (win_sum * win_sum);

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nperseg);

    let nbins = nperseg / 2 + 1;
    let mut acc = vec![0.0f64; nbins];
    let mut segments = 0usize;
    let mut pos = 0usize;
    while pos + nperseg <= n {
        let seg = &samples[pos..pos + nperseg];
        let mean = seg.iter().map(|&v| v as f64).sum::<f64>() / nperseg as f64;
        let mut buf: Vec<Complex64> = seg
            .iter()
            .zip(&window)
            .map(|(&v, &w)| Complex64::new((v as f64 - mean) * w, 0.0))
            .collect();
        fft.process(&mut buf);
        for (slot, value) in acc.iter_mut().zip(&buf[..nbins]) {
            *slot += value.norm_sqr() * scale;
        }
        segments += 1;
        pos += step;
    }
    if segments == 0 {
        return (Vec::new(), Vec::new());
    }

    let freq_step = sample_rate as f64 / nperseg as f64;
    let nyquist = sample_rate as f64 / 2.0;
    let upper = nyquist.min(20_000.0);
    let has_nyquist_bin = nperseg % 2 == 0;

    let mut freqs = Vec::new();
    let mut mags = Vec::new();
    for (k, &power) in acc.iter().enumerate() {
        let f = k as f64 * freq_step;
        if f < 20.0 || f > upper {
            continue;
        }
        let mut p = power / segments as f64;
        if k != 0 && !(has_nyquist_bin && k == nbins - 1) {
            p *= 2.0;
        }
        freqs.push(f as f32);
        mags.push(power_db(p) as f32);
    }
    (freqs, mags)
}

/// Spectral flatness of a signal: geometric mean over arithmetic mean of
/// the full-length FFT magnitude spectrum. Near 0 for a pure tone, near 1
/// for noise.
pub fn spectral_flatness(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buf: Vec<Complex64> = samples
        .iter()
        .map(|&v| Complex64::new(v as f64, 0.0))
        .collect();
    fft.process(&mut buf);

    let nbins = n / 2 + 1;
    let mut log_sum = 0.0f64;
    let mut sum = 0.0f64;
    for value in &buf[..nbins] {
        let magnitude = value.norm();
        log_sum += (magnitude + 1e-10).ln();
        sum += magnitude;
    }
    let geometric = (log_sum / nbins as f64).exp();
    let arithmetic = sum / nbins as f64;
    geometric / (arithmetic + 1e-10)
}
