//! Dynamic range and loudness: RMS, peak, crest factor, integrated LUFS
//! and PLR, plus the compression/gain/limiting comparison.

use ebur128::{EbuR128, Mode};
use serde::Serialize;

use crate::audio::AudioBuffer;
use crate::dsp;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DynamicsProfile {
    pub rms_db: f64,
    pub peak_db: f64,
    pub crest_factor_db: f64,
    pub integrated_loudness_lufs: f64,
    pub plr_db: f64,
}

pub fn analyze(buffer: &AudioBuffer) -> DynamicsProfile {
    let mut sum_sq = 0.0f64;
    let mut peak = 0.0f32;
    let mut count = 0usize;
    for channel in buffer.channels() {
        for &v in channel {
            sum_sq += v as f64 * v as f64;
            peak = peak.max(v.abs());
        }
        count += channel.len();
    }

    let rms_db = dsp::amplitude_db((sum_sq / count as f64).sqrt());
    let peak_db = dsp::amplitude_db(peak as f64);
    let crest_factor_db = peak_db - rms_db;

    // Degenerate input (all-silence, absurd rates) falls back to an RMS
    // approximation rather than failing the whole report.
    let lufs = integrated_lufs(buffer).unwrap_or(rms_db + 3.0);
    let plr_db = peak_db - lufs;

    DynamicsProfile {
        rms_db: dsp::round1(rms_db),
        peak_db: dsp::round1(peak_db),
        crest_factor_db: dsp::round1(crest_factor_db),
        integrated_loudness_lufs: dsp::round1(lufs),
        plr_db: dsp::round1(plr_db),
    }
}

/// ITU-R BS.1770 gated integrated loudness.
fn integrated_lufs(buffer: &AudioBuffer) -> Option<f64> {
    let channels = buffer.channel_count();
    let mut meter = EbuR128::new(channels as u32, buffer.sample_rate(), Mode::I).ok()?;

    let frames = buffer.len();
    let mut interleaved = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        for channel in buffer.channels() {
            interleaved.push(channel[i]);
        }
    }
    meter.add_frames_f32(&interleaved).ok()?;

    let lufs = meter.loudness_global().ok()?;
    lufs.is_finite().then_some(lufs)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStatus {
    MuchMoreCompressed,
    MoreCompressed,
    WellMatched,
    LessCompressed,
    MuchLessCompressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoudnessStatus {
    MuchLouder,
    Louder,
    WellMatched,
    Quieter,
    MuchQuieter,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DynamicsDifferences {
    pub rms_db: f64,
    pub lufs: f64,
    pub crest_factor: f64,
    pub plr: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompressionComparison {
    pub status: CompressionStatus,
    pub description: &'static str,
    pub crest_factor_difference: f64,
    pub dynamic_range_difference: f64,
    pub your_crest_factor: f64,
    pub reference_crest_factor: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoudnessComparison {
    pub status: LoudnessStatus,
    pub description: &'static str,
    pub lufs_difference: f64,
    pub rms_difference: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DynamicsSuggestion {
    pub action: &'static str,
    pub amount_db: Option<f64>,
    pub difference_db: f64,
    pub message: String,
    pub recommended_plugins: &'static str,
}

/// The three suggestion axes are independent and can all fire at once.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DynamicsSuggestions {
    pub compression: Option<DynamicsSuggestion>,
    pub gain: Option<DynamicsSuggestion>,
    pub limiting: Option<DynamicsSuggestion>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DynamicsComparison {
    pub differences: DynamicsDifferences,
    pub compression: CompressionComparison,
    pub loudness: LoudnessComparison,
    pub suggestions: DynamicsSuggestions,
}

pub fn compare(yours: &DynamicsProfile, reference: &DynamicsProfile) -> DynamicsComparison {
    let rms_diff = yours.rms_db - reference.rms_db;
    let lufs_diff = yours.integrated_loudness_lufs - reference.integrated_loudness_lufs;
    let crest_diff = yours.crest_factor_db - reference.crest_factor_db;
    let plr_diff = yours.plr_db - reference.plr_db;
    let peak_diff = yours.peak_db - reference.peak_db;

    let (compression_status, compression_description) = classify_compression(crest_diff);
    let (loudness_status, loudness_description) = classify_loudness(lufs_diff);

    DynamicsComparison {
        differences: DynamicsDifferences {
            rms_db: dsp::round1(rms_diff),
            lufs: dsp::round1(lufs_diff),
            crest_factor: dsp::round1(crest_diff),
            plr: dsp::round1(plr_diff),
        },
        compression: CompressionComparison {
            status: compression_status,
            description: compression_description,
            crest_factor_difference: dsp::round1(crest_diff),
            dynamic_range_difference: dsp::round1(plr_diff),
            your_crest_factor: yours.crest_factor_db,
            reference_crest_factor: reference.crest_factor_db,
        },
        loudness: LoudnessComparison {
            status: loudness_status,
            description: loudness_description,
            lufs_difference: dsp::round1(lufs_diff),
            rms_difference: dsp::round1(rms_diff),
        },
        suggestions: build_suggestions(crest_diff, lufs_diff, peak_diff),
    }
}

/// Positive crest difference means the mix is more dynamic (less
/// compressed) than the reference.
fn classify_compression(crest_diff: f64) -> (CompressionStatus, &'static str) {
    if crest_diff > 3.0 {
        (
            CompressionStatus::MuchLessCompressed,
            "Your mix is significantly less compressed than the reference",
        )
    } else if crest_diff > 1.0 {
        (
            CompressionStatus::LessCompressed,
            "Your mix is less compressed than the reference",
        )
    } else if crest_diff < -3.0 {
        (
            CompressionStatus::MuchMoreCompressed,
            "Your mix is significantly more compressed than the reference",
        )
    } else if crest_diff < -1.0 {
        (
            CompressionStatus::MoreCompressed,
            "Your mix is more compressed than the reference",
        )
    } else {
        (
            CompressionStatus::WellMatched,
            "Your mix has well-matched compression to the reference",
        )
    }
}

fn classify_loudness(lufs_diff: f64) -> (LoudnessStatus, &'static str) {
    if lufs_diff > 3.0 {
        (
            LoudnessStatus::MuchLouder,
            "Your mix is significantly louder than the reference",
        )
    } else if lufs_diff > 1.0 {
        (
            LoudnessStatus::Louder,
            "Your mix is louder than the reference",
        )
    } else if lufs_diff < -3.0 {
        (
            LoudnessStatus::MuchQuieter,
            "Your mix is significantly quieter than the reference",
        )
    } else if lufs_diff < -1.0 {
        (
            LoudnessStatus::Quieter,
            "Your mix is quieter than the reference",
        )
    } else {
        (
            LoudnessStatus::WellMatched,
            "Your mix has well-matched loudness to the reference",
        )
    }
}

struct CrestTier {
    min_diff: f64,
    action: &'static str,
    with_target: bool,
    plugins: &'static str,
    message: fn(f64) -> String,
}

/// Tiers for a mix that is more dynamic than the reference. Ordered by
/// descending threshold; first match wins.
const OVER_DYNAMIC_TIERS: [CrestTier; 3] = [
    CrestTier {
        min_diff: 3.0,
        action: "add_compression",
        with_target: true,
        plugins: "iZotope Ozone Dynamics, FabFilter Pro-C 2, Waves SSL G-Master Buss Compressor, UAD Neve 33609",
        message: strong_compression_message,
    },
    CrestTier {
        min_diff: 1.5,
        action: "add_compression",
        with_target: true,
        plugins: "iZotope Ozone Dynamics, FabFilter Pro-C 2, Slate Digital FG-X, Waves API 2500",
        message: moderate_compression_message,
    },
    CrestTier {
        min_diff: 0.5,
        action: "add_light_compression",
        with_target: false,
        plugins: "iZotope Ozone Dynamics, FabFilter Pro-C 2, Waves CLA-76",
        message: light_compression_message,
    },
];

/// Mirrored tiers for an over-compressed mix; thresholds apply to |diff|.
const OVER_COMPRESSED_TIERS: [CrestTier; 3] = [
    CrestTier {
        min_diff: 3.0,
        action: "reduce_compression",
        with_target: false,
        plugins: "Review settings in: iZotope Ozone Maximizer, FabFilter Pro-L 2, Waves L2/L3",
        message: strong_reduce_message,
    },
    CrestTier {
        min_diff: 1.5,
        action: "reduce_compression",
        with_target: false,
        plugins: "Adjust: iZotope Ozone Dynamics/Maximizer, FabFilter Pro-C 2/Pro-L 2",
        message: moderate_reduce_message,
    },
    CrestTier {
        min_diff: 0.5,
        action: "reduce_light_compression",
        with_target: false,
        plugins: "Fine-tune: iZotope Ozone Dynamics, FabFilter Pro-C 2",
        message: light_reduce_message,
    },
];

fn strong_compression_message(diff: f64) -> String {
    format!(
        "Your mix is {:.1}dB more dynamic than reference. Add {:.1}dB of parallel compression on the mix bus. Try a ratio of 4:1 with slow attack (30-50ms) and medium release (auto or 100-200ms). This will reduce the crest factor while maintaining transient punch.",
        diff,
        dsp::round1(diff * 0.6)
    )
}

fn moderate_compression_message(diff: f64) -> String {
    format!(
        "Your mix is {:.1}dB more dynamic than reference. Add gentle compression (2-3:1 ratio) on the mix bus with slow attack (30ms+) to bring peaks closer to the average level. Target {:.1}dB of gain reduction.",
        diff,
        dsp::round1(diff * 0.6)
    )
}

fn light_compression_message(diff: f64) -> String {
    format!(
        "Your mix is {:.1}dB more dynamic than reference. Consider adding very gentle compression (2:1 ratio, slow attack) or subtle parallel compression to slightly reduce dynamic range.",
        diff
    )
}

fn strong_reduce_message(diff: f64) -> String {
    format!(
        "Your mix is {:.1}dB more compressed than reference. Reduce mix bus compression/limiting significantly. Check individual track compression and ease off threshold/ratio settings. Your mix may sound squashed - aim for more breathing room.",
        diff
    )
}

fn moderate_reduce_message(diff: f64) -> String {
    format!(
        "Your mix is {:.1}dB more compressed than reference. Reduce mix bus compression by lowering ratio or raising threshold. If using a limiter, reduce gain into it or increase ceiling. This will restore some dynamic range.",
        diff
    )
}

fn light_reduce_message(diff: f64) -> String {
    format!(
        "Your mix is {:.1}dB more compressed than reference. Try slightly reducing mix bus compression (lower ratio or ease threshold) to allow a bit more dynamic variation.",
        diff
    )
}

fn build_suggestions(crest_diff: f64, lufs_diff: f64, peak_diff: f64) -> DynamicsSuggestions {
    let mut suggestions = DynamicsSuggestions::default();

    let (tiers, magnitude) = if crest_diff > 0.0 {
        (&OVER_DYNAMIC_TIERS, crest_diff)
    } else {
        (&OVER_COMPRESSED_TIERS, -crest_diff)
    };
    for tier in tiers {
        if magnitude > tier.min_diff {
            suggestions.compression = Some(DynamicsSuggestion {
                action: tier.action,
                amount_db: tier.with_target.then(|| dsp::round1(magnitude * 0.6)),
                difference_db: dsp::round1(magnitude),
                message: (tier.message)(magnitude),
                recommended_plugins: tier.plugins,
            });
            break;
        }
    }

    if lufs_diff.abs() > 1.0 {
        let gain = dsp::round1(-lufs_diff);
        suggestions.gain = Some(DynamicsSuggestion {
            action: "adjust_gain",
            amount_db: Some(gain),
            difference_db: dsp::round1(lufs_diff),
            message: format!(
                "{} overall level by {:.1}dB to match reference loudness",
                if gain > 0.0 { "Increase" } else { "Decrease" },
                gain.abs()
            ),
            recommended_plugins: "Utility/Gain plugin (stock DAW), iZotope Ozone Maximizer (for final loudness), FabFilter Pro-L 2",
        });
    }

    if peak_diff > 1.0 {
        suggestions.limiting = Some(DynamicsSuggestion {
            action: "add_limiting",
            amount_db: None,
            difference_db: dsp::round1(peak_diff),
            message: format!(
                "Your peaks are {:.1}dB higher than reference. Consider using a limiter to control peaks.",
                dsp::round1(peak_diff)
            ),
            recommended_plugins: "iZotope Ozone Maximizer, FabFilter Pro-L 2, Waves L2 Ultramaximizer, LoudMax (free)",
        });
    }

    suggestions
}
