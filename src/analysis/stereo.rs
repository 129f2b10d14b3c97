//! Stereo width and phase correlation, overall and per frequency band.

use serde::Serialize;

use super::Severity;
use crate::audio::AudioBuffer;
use crate::dsp;

pub struct StereoBandSpec {
    pub name: &'static str,
    pub low_hz: f64,
    pub high_hz: f64,
}

/// Low end is called out separately: low-frequency stereo content is
/// conventionally kept near-mono.
pub const STEREO_BANDS: [StereoBandSpec; 5] = [
    StereoBandSpec { name: "low_end", low_hz: 20.0, high_hz: 250.0 },
    StereoBandSpec { name: "low_mids", low_hz: 250.0, high_hz: 500.0 },
    StereoBandSpec { name: "mids", low_hz: 500.0, high_hz: 2000.0 },
    StereoBandSpec { name: "high_mids", low_hz: 2000.0, high_hz: 6000.0 },
    StereoBandSpec { name: "highs", low_hz: 6000.0, high_hz: 20000.0 },
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandWidth {
    pub band: &'static str,
    pub low_hz: f64,
    pub high_hz: f64,
    pub width_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StereoProfile {
    pub is_mono: bool,
    /// 0 = mono, 100 = all side energy.
    pub overall_width_pct: f64,
    /// Pearson correlation of L/R; negative values risk mono cancellation.
    pub phase_correlation: f64,
    pub per_band_width: Vec<BandWidth>,
    pub mono_compatible: bool,
    pub assessment: String,
}

pub fn analyze(buffer: &AudioBuffer) -> StereoProfile {
    if buffer.is_mono() {
        return StereoProfile {
            is_mono: true,
            overall_width_pct: 0.0,
            phase_correlation: 1.0,
            per_band_width: STEREO_BANDS
                .iter()
                .map(|spec| BandWidth {
                    band: spec.name,
                    low_hz: spec.low_hz,
                    high_hz: spec.high_hz,
                    width_pct: 0.0,
                })
                .collect(),
            mono_compatible: true,
            assessment: "File is mono - no stereo width".to_string(),
        };
    }

    let left = &buffer.channels()[0];
    let right = &buffer.channels()[1];

    let overall_width_pct = dsp::round1(width_percentage(left, right));
    let phase_correlation = dsp::round3(pearson(left, right));

    let per_band_width: Vec<BandWidth> = STEREO_BANDS
        .iter()
        .map(|spec| {
            let width_pct = match (
                dsp::bandpass(left, spec.low_hz, spec.high_hz, buffer.sample_rate()),
                dsp::bandpass(right, spec.low_hz, spec.high_hz, buffer.sample_rate()),
            ) {
                (Some(l), Some(r)) => dsp::round1(width_percentage(&l, &r)),
                _ => 0.0,
            };
            BandWidth {
                band: spec.name,
                low_hz: spec.low_hz,
                high_hz: spec.high_hz,
                width_pct,
            }
        })
        .collect();

    let assessment = assessment(overall_width_pct, phase_correlation, &per_band_width);

    StereoProfile {
        is_mono: false,
        overall_width_pct,
        phase_correlation,
        per_band_width,
        mono_compatible: phase_correlation > -0.5,
        assessment,
    }
}

/// Side energy share of the mid/side decomposition, as a percentage.
fn width_percentage(left: &[f32], right: &[f32]) -> f64 {
    let mut mid_energy = 0.0f64;
    let mut side_energy = 0.0f64;
    for (&l, &r) in left.iter().zip(right) {
        let mid = (l as f64 + r as f64) * 0.5;
        let side = (l as f64 - r as f64) * 0.5;
        mid_energy += mid * mid;
        side_energy += side * side;
    }
    let total = mid_energy + side_energy;
    if total < 1e-10 {
        return 0.0;
    }
    side_energy / total * 100.0
}

/// Pearson correlation of the mean-centred channels. A silent or constant
/// channel has no defined correlation; that resolves to 0 (neutral).
fn pearson(left: &[f32], right: &[f32]) -> f64 {
    let n = left.len().min(right.len());
    if n == 0 {
        return 0.0;
    }
    let mean_l = left[..n].iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let mean_r = right[..n].iter().map(|&v| v as f64).sum::<f64>() / n as f64;

    let mut covariance = 0.0f64;
    let mut var_l = 0.0f64;
    let mut var_r = 0.0f64;
    for (&l, &r) in left[..n].iter().zip(&right[..n]) {
        let dl = l as f64 - mean_l;
        let dr = r as f64 - mean_r;
        covariance += dl * dr;
        var_l += dl * dl;
        var_r += dr * dr;
    }

    let denominator = (var_l * var_r).sqrt();
    if denominator < 1e-20 {
        return 0.0;
    }
    covariance / denominator
}

fn assessment(width: f64, correlation: f64, per_band: &[BandWidth]) -> String {
    let mut parts: Vec<&str> = Vec::new();

    parts.push(if width < 20.0 {
        "Very narrow stereo image (mostly mono)"
    } else if width < 40.0 {
        "Narrow stereo image"
    } else if width < 60.0 {
        "Moderate stereo width"
    } else if width < 80.0 {
        "Wide stereo image"
    } else {
        "Very wide stereo image"
    });

    if correlation < -0.5 {
        parts.push("Severe phase issues - will cancel out in mono");
    } else if correlation < 0.0 {
        parts.push("Some phase issues - check mono compatibility");
    } else if correlation > 0.9 {
        parts.push("Mostly mono content");
    }

    if let Some(low_end) = per_band.iter().find(|b| b.band == "low_end") {
        if low_end.width_pct > 50.0 {
            parts.push("Low end is too wide - should be centered for power");
        } else if low_end.width_pct < 30.0 {
            parts.push("Low end is properly centered");
        }
    }

    parts.join(". ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthStatus {
    Wider,
    Narrower,
    Similar,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandWidthDiff {
    pub band: &'static str,
    pub your_width_pct: f64,
    pub reference_width_pct: f64,
    pub difference: f64,
    pub status: WidthStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StereoProblemBand {
    pub band: &'static str,
    pub your_width_pct: f64,
    pub reference_width_pct: f64,
    pub difference: f64,
    pub severity: Severity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthAction {
    Widen,
    Narrow,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WidthSuggestion {
    pub action: WidthAction,
    pub amount_pct: f64,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandWidthSuggestion {
    pub band: &'static str,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseSeverity {
    Critical,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhaseWarning {
    pub severity: PhaseSeverity,
    pub message: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StereoSuggestions {
    pub overall: Option<WidthSuggestion>,
    pub per_band: Vec<BandWidthSuggestion>,
    pub phase: Option<PhaseWarning>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StereoDiff {
    pub overall_width_difference: f64,
    pub phase_correlation_difference: f64,
    pub band_comparisons: Vec<BandWidthDiff>,
    pub problem_bands: Vec<StereoProblemBand>,
    pub suggestions: StereoSuggestions,
    pub assessment: String,
}

/// The stereo comparison is asymmetric: a mono track on either side only
/// produces a qualitative result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StereoComparison {
    BothMono { message: &'static str },
    YourMixMono { message: &'static str },
    ReferenceMono { message: &'static str },
    Stereo(StereoDiff),
}

pub fn compare(yours: &StereoProfile, reference: &StereoProfile) -> StereoComparison {
    if yours.is_mono && reference.is_mono {
        return StereoComparison::BothMono {
            message: "Both files are mono - no stereo comparison possible",
        };
    }
    if yours.is_mono {
        return StereoComparison::YourMixMono {
            message: "Your mix is mono while reference is stereo - consider adding stereo width",
        };
    }
    if reference.is_mono {
        return StereoComparison::ReferenceMono {
            message: "Reference is mono - stereo comparison not applicable",
        };
    }

    let width_diff = yours.overall_width_pct - reference.overall_width_pct;
    let phase_diff = yours.phase_correlation - reference.phase_correlation;

    let mut band_comparisons = Vec::with_capacity(STEREO_BANDS.len());
    let mut problem_bands = Vec::new();
    for (your_band, ref_band) in yours.per_band_width.iter().zip(&reference.per_band_width) {
        let diff = your_band.width_pct - ref_band.width_pct;
        let status = if diff > 10.0 {
            WidthStatus::Wider
        } else if diff < -10.0 {
            WidthStatus::Narrower
        } else {
            WidthStatus::Similar
        };
        band_comparisons.push(BandWidthDiff {
            band: your_band.band,
            your_width_pct: your_band.width_pct,
            reference_width_pct: ref_band.width_pct,
            difference: dsp::round1(diff),
            status,
        });
        if diff.abs() > 15.0 {
            problem_bands.push(StereoProblemBand {
                band: your_band.band,
                your_width_pct: your_band.width_pct,
                reference_width_pct: ref_band.width_pct,
                difference: dsp::round1(diff),
                severity: if diff.abs() > 30.0 {
                    Severity::High
                } else {
                    Severity::Moderate
                },
            });
        }
    }

    let suggestions = build_suggestions(width_diff, &problem_bands, yours, reference);
    let assessment = comparison_assessment(width_diff, phase_diff, problem_bands.len());

    StereoComparison::Stereo(StereoDiff {
        overall_width_difference: dsp::round1(width_diff),
        phase_correlation_difference: dsp::round3(phase_diff),
        band_comparisons,
        problem_bands,
        suggestions,
        assessment,
    })
}

fn build_suggestions(
    width_diff: f64,
    problem_bands: &[StereoProblemBand],
    yours: &StereoProfile,
    reference: &StereoProfile,
) -> StereoSuggestions {
    let mut suggestions = StereoSuggestions::default();

    if width_diff < -15.0 {
        suggestions.overall = Some(WidthSuggestion {
            action: WidthAction::Widen,
            amount_pct: dsp::round1(width_diff.abs()),
            message: format!(
                "Your mix is {:.1}% narrower than reference. Consider using stereo widener or mid-side processing.",
                width_diff.abs()
            ),
        });
    } else if width_diff > 15.0 {
        suggestions.overall = Some(WidthSuggestion {
            action: WidthAction::Narrow,
            amount_pct: dsp::round1(width_diff),
            message: format!(
                "Your mix is {:.1}% wider than reference. Consider reducing stereo enhancement or check for phase issues.",
                width_diff
            ),
        });
    }

    for problem in problem_bands {
        let diff = problem.difference;
        if problem.band == "low_end" {
            if diff > 0.0 {
                suggestions.per_band.push(BandWidthSuggestion {
                    band: problem.band,
                    message: format!(
                        "Low end is {:.1}% too wide. Use mid-side EQ to make bass/kick more mono for better power and punch.",
                        diff
                    ),
                });
            }
        } else if diff > 15.0 {
            suggestions.per_band.push(BandWidthSuggestion {
                band: problem.band,
                message: format!(
                    "{} is {:.1}% wider. Consider narrowing this range slightly.",
                    title_case(problem.band),
                    diff
                ),
            });
        } else if diff < -15.0 {
            suggestions.per_band.push(BandWidthSuggestion {
                band: problem.band,
                message: format!(
                    "{} is {:.1}% narrower. Consider widening this range for more spaciousness.",
                    title_case(problem.band),
                    diff.abs()
                ),
            });
        }
    }

    // Phase trouble in the mix is flagged regardless of the reference.
    if yours.phase_correlation < -0.5 {
        suggestions.phase = Some(PhaseWarning {
            severity: PhaseSeverity::Critical,
            message: "Critical phase issues detected. Mix will collapse in mono. Check for out-of-phase stereo processing.",
        });
    } else if yours.phase_correlation < 0.0 && reference.phase_correlation > 0.0 {
        suggestions.phase = Some(PhaseWarning {
            severity: PhaseSeverity::Warning,
            message: "Your mix has phase issues that reference doesn't. Check stereo wideners and verify mono compatibility.",
        });
    }

    suggestions
}

fn comparison_assessment(width_diff: f64, phase_diff: f64, problem_count: usize) -> String {
    if width_diff.abs() < 10.0 && phase_diff.abs() < 0.2 && problem_count == 0 {
        return "Your mix has similar stereo characteristics to the reference - good balance!"
            .to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    if width_diff.abs() > 20.0 {
        if width_diff > 0.0 {
            parts.push(format!(
                "Your mix is significantly wider ({:.1}% more)",
                width_diff
            ));
        } else {
            parts.push(format!(
                "Your mix is significantly narrower ({:.1}% less)",
                width_diff.abs()
            ));
        }
    }
    if problem_count > 0 {
        parts.push(format!(
            "{} frequency band(s) have mismatched width",
            problem_count
        ));
    }
    if phase_diff.abs() > 0.3 {
        parts.push("Phase correlation differs notably from reference".to_string());
    }

    if parts.is_empty() {
        "Minor stereo differences from reference".to_string()
    } else {
        parts.join(". ")
    }
}

fn title_case(band: &str) -> String {
    band.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
