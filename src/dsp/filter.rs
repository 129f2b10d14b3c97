use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// One second-order filter section (biquad), denominator normalized to a0 = 1.
#[derive(Clone, Copy, Debug)]
pub struct Sos {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// Designs a Butterworth bandpass filter as cascaded second-order sections.
///
/// Classic recipe: analog lowpass prototype poles, lowpass-to-bandpass
/// transform, bilinear transform, then conjugate pole pairs grouped into
/// real biquads. An order-4 design yields four sections. Gain is
/// normalized to unity at the (warped) center frequency.
pub fn butter_bandpass(order: usize, low_hz: f64, high_hz: f64, sample_rate: f64) -> Vec<Sos> {
    let fs2 = 2.0 * sample_rate;
    let w1 = fs2 * (PI * low_hz / sample_rate).tan();
    let w2 = fs2 * (PI * high_hz / sample_rate).tan();
    let bw = w2 - w1;
    let w0 = (w1 * w2).sqrt();

    // Analog lowpass prototype poles, left half-plane, then
    // s -> (s^2 + w0^2) / (bw * s) and bilinear into z.
    let mut z_poles: Vec<Complex64> = Vec::with_capacity(2 * order);
    let fs2_c = Complex64::new(fs2, 0.0);
    for k in 0..order {
        let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
        let p = Complex64::new(theta.cos(), theta.sin());
        let a = 0.5 * bw * p;
        let d = (a * a - Complex64::new(w0 * w0, 0.0)).sqrt();
        for s in [a + d, a - d] {
            z_poles.push((fs2_c + s) / (fs2_c - s));
        }
    }

    // Each section carries one zero at z = +1 and one at z = -1.
    let mut sections: Vec<Sos> = z_poles
        .iter()
        .filter(|p| p.im > 1e-12)
        .map(|p| Sos {
            b0: 1.0,
            b1: 0.0,
            b2: -1.0,
            a1: -2.0 * p.re,
            a2: p.norm_sqr(),
        })
        .collect();

    // Real poles only appear for degenerate bands; pair them up.
    let reals: Vec<f64> = z_poles
        .iter()
        .filter(|p| p.im.abs() <= 1e-12)
        .map(|p| p.re)
        .collect();
    for pair in reals.chunks(2) {
        let r1 = pair[0];
        let r2 = pair.get(1).copied().unwrap_or(0.0);
        sections.push(Sos {
            b0: 1.0,
            b1: 0.0,
            b2: -1.0,
            a1: -(r1 + r2),
            a2: r1 * r2,
        });
    }

    // Normalize |H| = 1 at the warped center frequency.
    let wc = 2.0 * (w0 / fs2).atan();
    let z_inv = Complex64::new(wc.cos(), -wc.sin());
    let z_inv2 = z_inv * z_inv;
    let mut response = Complex64::new(1.0, 0.0);
    for s in &sections {
        let num = Complex64::new(s.b0, 0.0) + s.b1 * z_inv + s.b2 * z_inv2;
        let den = Complex64::new(1.0, 0.0) + s.a1 * z_inv + s.a2 * z_inv2;
        response *= num / den;
    }
    let gain = response.norm();
    if gain > 0.0 {
        if let Some(first) = sections.first_mut() {
            first.b0 /= gain;
            first.b1 /= gain;
            first.b2 /= gain;
        }
    }

    sections
}

/// Runs a cascade of second-order sections over the input, direct form II
/// transposed with zero initial state.
pub fn sosfilt(sections: &[Sos], input: &[f32]) -> Vec<f32> {
    let mut data: Vec<f64> = input.iter().map(|&v| v as f64).collect();
    for s in sections {
        let mut z1 = 0.0f64;
        let mut z2 = 0.0f64;
        for v in data.iter_mut() {
            let x = *v;
            let y = s.b0 * x + z1;
            z1 = s.b1 * x - s.a1 * y + z2;
            z2 = s.b2 * x - s.a2 * y;
            *v = y;
        }
    }
    data.into_iter().map(|v| v as f32).collect()
}

/// 4th-order Butterworth bandpass with the analysis-wide Nyquist policy:
/// the upper edge is clamped to nyquist - 100 Hz, and a band lying at or
/// above Nyquist (or collapsing to nothing after the clamp) yields `None`
/// so the caller can emit its zero-energy placeholder.
pub fn bandpass(samples: &[f32], low_hz: f64, high_hz: f64, sample_rate: u32) -> Option<Vec<f32>> {
    let nyquist = sample_rate as f64 / 2.0;
    if low_hz >= nyquist {
        return None;
    }
    let high = high_hz.min(nyquist - 100.0);
    if high <= low_hz {
        return None;
    }
    let sections = butter_bandpass(4, low_hz, high, sample_rate as f64);
    Some(sosfilt(&sections, samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::rms;
    use std::f32::consts::TAU;

    fn sine(freq: f32, sample_rate: u32, seconds: f32, amplitude: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| amplitude * (TAU * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn passband_tone_survives() {
        let signal = sine(1000.0, 22050, 1.0, 0.5);
        let filtered = bandpass(&signal, 500.0, 2000.0, 22050).unwrap();
        let ratio = rms(&filtered) / rms(&signal);
        assert!(ratio > 0.9, "in-band tone attenuated: ratio {ratio}");
    }

    #[test]
    fn stopband_tone_is_rejected() {
        let signal = sine(1000.0, 22050, 1.0, 0.5);
        let filtered = bandpass(&signal, 4000.0, 6000.0, 22050).unwrap();
        let ratio = rms(&filtered) / rms(&signal);
        assert!(ratio < 0.05, "out-of-band tone leaked: ratio {ratio}");
    }

    #[test]
    fn band_above_nyquist_is_skipped() {
        let signal = sine(1000.0, 8000, 0.5, 0.5);
        assert!(bandpass(&signal, 4000.0, 6000.0, 8000).is_none());
        assert!(bandpass(&signal, 6000.0, 20000.0, 8000).is_none());
        // Below Nyquist still works at this rate.
        assert!(bandpass(&signal, 500.0, 2000.0, 8000).is_some());
    }

    #[test]
    fn order_four_yields_four_sections() {
        let sections = butter_bandpass(4, 60.0, 250.0, 22050.0);
        assert_eq!(sections.len(), 4);
    }
}
