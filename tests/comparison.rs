//! End-to-end engine scenarios: synthetic buffers through the full
//! analyze/compare/suggest pipeline.

use approx::assert_relative_eq;
use std::f32::consts::TAU;

use mixref::analysis::dynamics::CompressionStatus;
use mixref::analysis::stereo::StereoComparison;
use mixref::analysis::{self, Severity};
use mixref::audio::AudioBuffer;
use mixref::compare::compare_features;
use mixref::report::FileInfo;
use mixref::run_comparison;

const SAMPLE_RATE: u32 = 22050;

fn sine(freq: f32, amplitude: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let n = (sample_rate as f32 * seconds) as usize;
    (0..n)
        .map(|i| amplitude * (TAU * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

fn lcg_noise(n: usize, seed: u32, amplitude: f32) -> Vec<f32> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            amplitude * ((state >> 8) as f32 / 8_388_608.0 - 1.0)
        })
        .collect()
}

/// A deterministic music-like test signal: a few partials over a noise bed.
fn music_like(seconds: f32, seed: u32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * seconds) as usize;
    let noise = lcg_noise(n, seed, 0.05);
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.2 * (TAU * 110.0 * t).sin()
                + 0.15 * (TAU * 440.0 * t).sin()
                + 0.1 * (TAU * 1320.0 * t).sin()
                + noise[i]
        })
        .collect()
}

fn mono_buffer(samples: Vec<f32>) -> AudioBuffer {
    AudioBuffer::new(vec![samples], SAMPLE_RATE).unwrap()
}

fn stereo_buffer(left: Vec<f32>, right: Vec<f32>) -> AudioBuffer {
    AudioBuffer::new(vec![left, right], SAMPLE_RATE).unwrap()
}

fn file_info(name: &str, buffer: &AudioBuffer) -> FileInfo {
    FileInfo {
        filename: name.to_string(),
        duration_seconds: buffer.duration_seconds(),
        format: "WAV (pcm_s16le)".to_string(),
        sample_rate: buffer.sample_rate(),
        channels: buffer.channel_count(),
        codec: None,
        bit_rate: None,
    }
}

#[test]
fn energy_percentages_close_to_one_hundred() {
    let buffer = mono_buffer(music_like(3.0, 7));
    let report = analysis::analyze(&buffer);
    let total: f64 = report
        .frequency_balance
        .bands
        .iter()
        .map(|b| b.energy_percent)
        .sum();
    assert_relative_eq!(total, 100.0, epsilon = 0.1);
}

#[test]
fn analysis_is_deterministic() {
    let buffer = mono_buffer(music_like(2.0, 99));
    let first = analysis::analyze(&buffer);
    let second = analysis::analyze(&buffer);
    assert_eq!(first, second);
}

#[test]
fn scalar_differences_are_sign_symmetric() {
    let a = stereo_buffer(music_like(2.0, 1), music_like(2.0, 2));
    let b = stereo_buffer(
        music_like(2.0, 3).iter().map(|v| v * 0.5).collect(),
        music_like(2.0, 4).iter().map(|v| v * 0.45).collect(),
    );
    let (ra, rb) = (analysis::analyze(&a), analysis::analyze(&b));
    let ab = compare_features(&ra, &rb);
    let ba = compare_features(&rb, &ra);

    assert_relative_eq!(ab.dynamics.differences.rms_db, -ba.dynamics.differences.rms_db);
    assert_relative_eq!(ab.dynamics.differences.lufs, -ba.dynamics.differences.lufs);
    assert_relative_eq!(
        ab.dynamics.differences.crest_factor,
        -ba.dynamics.differences.crest_factor
    );
    assert_relative_eq!(ab.dynamics.differences.plr, -ba.dynamics.differences.plr);

    for (x, y) in ab
        .frequency_balance
        .differences
        .iter()
        .zip(&ba.frequency_balance.differences)
    {
        assert_relative_eq!(x.difference_db, -y.difference_db);
    }

    let (StereoComparison::Stereo(ab_stereo), StereoComparison::Stereo(ba_stereo)) =
        (&ab.stereo, &ba.stereo)
    else {
        panic!("expected stereo comparisons");
    };
    assert_relative_eq!(
        ab_stereo.overall_width_difference,
        -ba_stereo.overall_width_difference
    );
    assert_relative_eq!(
        ab_stereo.phase_correlation_difference,
        -ba_stereo.phase_correlation_difference
    );
}

#[test]
fn mono_buffer_sets_the_mono_boundary_fields() {
    let mono = mono_buffer(music_like(1.0, 5));
    let report = analysis::analyze(&mono);
    assert!(report.stereo.is_mono);
    assert_eq!(report.stereo.overall_width_pct, 0.0);
    assert_eq!(report.stereo.phase_correlation, 1.0);

    // Comparing against a stereo reference must not panic, only take the
    // qualitative path.
    let stereo = stereo_buffer(music_like(1.0, 6), music_like(1.0, 8));
    let comparison = compare_features(&report, &analysis::analyze(&stereo));
    match comparison.stereo {
        StereoComparison::YourMixMono { message } => assert!(message.contains("mono")),
        other => panic!("expected qualitative mono result, got {other:?}"),
    }
}

#[test]
fn nyquist_safety_at_8_khz() {
    let n = 8000;
    let samples = lcg_noise(n, 11, 0.3);
    let buffer = AudioBuffer::new(vec![samples], 8000).unwrap();
    let report = analysis::analyze(&buffer);

    // highs (6-20 kHz) lies entirely above the 4 kHz Nyquist.
    let highs = report
        .frequency_balance
        .bands
        .iter()
        .find(|b| b.name == "highs")
        .unwrap();
    assert_eq!(highs.level_db, -80.0);
    assert_eq!(highs.energy_percent, 0.0);

    // Critical bands from Brightness (4 kHz) upward are dropped.
    assert_eq!(report.masking.bands.len(), 8);
    assert!(report
        .masking
        .bands
        .iter()
        .all(|b| b.low_hz < 4000.0));
}

// Scenario A: a track compared to itself is a clean bill of health.
#[test]
fn identical_tracks_compare_clean() {
    let buffer = stereo_buffer(music_like(3.0, 21), music_like(3.0, 22));
    let report = analysis::analyze(&buffer);
    let comparison = compare_features(&report, &report);

    assert!(comparison.frequency_balance.problem_bands.is_empty());
    assert!(comparison
        .frequency_balance
        .differences
        .iter()
        .all(|d| d.difference_db == 0.0));
    assert!(comparison.resonances.problem_resonances.is_empty());
    assert!(comparison.masking.suggestions.is_empty());
    assert_eq!(comparison.masking.clarity_difference, 0);
    assert_eq!(
        comparison.dynamics.compression.status,
        CompressionStatus::WellMatched
    );
    assert!(comparison.dynamics.suggestions.compression.is_none());
    assert!(comparison.dynamics.suggestions.gain.is_none());
    assert!(comparison.dynamics.suggestions.limiting.is_none());

    let info = file_info("mix.wav", &buffer);
    let result = run_comparison(&buffer, info.clone(), &buffer, info, 200);
    assert!(result.suggestions.eq_adjustments.is_empty());
    assert!(result.suggestions.stereo.is_some());
    assert_eq!(
        result.suggestions.summary,
        vec!["Your mix is well-balanced overall! Minor tweaks suggested below.".to_string()]
    );
}

// Scenario B: the same sine 6 dB apart.
#[test]
fn level_gap_shows_up_as_a_gain_suggestion() {
    let loud = mono_buffer(sine(1000.0, 0.5, 5.0, SAMPLE_RATE));
    let quiet = mono_buffer(sine(1000.0, 0.25, 5.0, SAMPLE_RATE));
    let comparison = compare_features(&analysis::analyze(&loud), &analysis::analyze(&quiet));

    assert_relative_eq!(comparison.dynamics.differences.rms_db, 6.0, epsilon = 0.2);
    assert_relative_eq!(comparison.dynamics.differences.lufs, 6.0, epsilon = 0.2);
    assert_relative_eq!(
        comparison.dynamics.differences.crest_factor,
        0.0,
        epsilon = 0.2
    );

    let gain = comparison
        .dynamics
        .suggestions
        .gain
        .expect("gain suggestion should fire for a 6 dB loudness gap");
    assert_relative_eq!(gain.amount_db.unwrap().abs(), 6.0, epsilon = 0.2);
}

// Scenario C: white noise vs a pure tone at matched RMS.
#[test]
fn tone_reads_tonal_and_resonant_where_noise_does_not() {
    let tone_samples = sine(1500.0, 0.4, 5.0, SAMPLE_RATE);
    let tone_rms = {
        let sum: f64 = tone_samples.iter().map(|&v| v as f64 * v as f64).sum();
        (sum / tone_samples.len() as f64).sqrt()
    };
    let mut noise_samples = lcg_noise(tone_samples.len(), 31, 1.0);
    let noise_rms = {
        let sum: f64 = noise_samples.iter().map(|&v| v as f64 * v as f64).sum();
        (sum / noise_samples.len() as f64).sqrt()
    };
    let scale = (tone_rms / noise_rms) as f32;
    for v in noise_samples.iter_mut() {
        *v *= scale;
    }

    // The tone's own critical band reads far more tonal (lower flatness).
    let band_flatness = |samples: &[f32]| {
        let filtered = mixref::dsp::bandpass(samples, 1000.0, 2000.0, SAMPLE_RATE).unwrap();
        mixref::dsp::spectral_flatness(&filtered)
    };
    let tone_flatness = band_flatness(&tone_samples);
    let noise_flatness = band_flatness(&noise_samples);
    assert!(
        tone_flatness < noise_flatness * 0.5,
        "tone flatness {tone_flatness} vs noise flatness {noise_flatness}"
    );

    let tone = analysis::analyze(&mono_buffer(tone_samples));
    let noise = analysis::analyze(&mono_buffer(noise_samples));

    // A clear peak at the tone frequency, nothing severe in the noise.
    let top = tone.resonances.first().expect("tone resonance");
    assert!((top.frequency_hz - 1500.0).abs() < 20.0);
    assert_eq!(top.severity, Severity::High);
    assert!(noise
        .resonances
        .iter()
        .all(|r| r.severity != Severity::High));
}

// Scenario D: hard-panned stereo, one channel silent.
#[test]
fn hard_panned_stereo_is_wide_with_neutral_phase() {
    let left = sine(440.0, 0.9, 2.0, SAMPLE_RATE);
    let right = vec![0.0f32; left.len()];
    let report = analysis::analyze(&stereo_buffer(left, right));

    // One silent channel: no defined correlation, resolved to neutral.
    assert_eq!(report.stereo.phase_correlation, 0.0);
    // Mid and side energy are equal, the formula's hard-pan maximum.
    assert_relative_eq!(report.stereo.overall_width_pct, 50.0, epsilon = 0.5);
    assert!(report.stereo.mono_compatible);
}

#[test]
fn full_pipeline_produces_a_complete_report() {
    let mix = stereo_buffer(music_like(2.0, 41), music_like(2.0, 42));
    let reference = stereo_buffer(
        music_like(2.0, 43).iter().map(|v| v * 0.4).collect(),
        music_like(2.0, 44).iter().map(|v| v * 0.4).collect(),
    );

    let result = run_comparison(
        &mix,
        file_info("mix.wav", &mix),
        &reference,
        file_info("reference.flac", &reference),
        120,
    );

    assert!(result.your_mix.spectrum.frequencies.len() <= 120);
    assert!(result.reference.spectrum.frequencies.len() <= 120);
    assert_eq!(result.your_mix.file.filename, "mix.wav");

    // ~8 dB hotter mix: the gain axis must fire.
    assert!(result.suggestions.gain.is_some());
    assert!(!result.suggestions.summary.is_empty());

    // The report serializes for the transport layer.
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"suggestions\""));
    assert!(json.contains("\"frequency_balance\""));
}
