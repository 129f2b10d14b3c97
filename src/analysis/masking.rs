//! Frequency masking detection over overlapping critical bands.
//!
//! Adjacent critical bands that are both loud and nearly equal in level
//! indicate instruments fighting for the same spectral space.

use serde::Serialize;

use super::{BandEnergy, Severity};
use crate::dsp;

pub struct CriticalBand {
    pub name: &'static str,
    pub low_hz: f64,
    pub high_hz: f64,
}

/// Simplified Bark-scale critical bands.
pub const CRITICAL_BANDS: [CriticalBand; 11] = [
    CriticalBand { name: "Sub Bass", low_hz: 20.0, high_hz: 100.0 },
    CriticalBand { name: "Bass Fundamentals", low_hz: 100.0, high_hz: 200.0 },
    CriticalBand { name: "Low Mids / Mud Zone", low_hz: 200.0, high_hz: 400.0 },
    CriticalBand { name: "Low-Mid Body", low_hz: 400.0, high_hz: 600.0 },
    CriticalBand { name: "Mid Clarity", low_hz: 600.0, high_hz: 1000.0 },
    CriticalBand { name: "Vocal Presence", low_hz: 1000.0, high_hz: 2000.0 },
    CriticalBand { name: "High Mids Clarity", low_hz: 2000.0, high_hz: 3000.0 },
    CriticalBand { name: "Articulation", low_hz: 3000.0, high_hz: 4000.0 },
    CriticalBand { name: "Brightness", low_hz: 4000.0, high_hz: 6000.0 },
    CriticalBand { name: "Air", low_hz: 6000.0, high_hz: 10000.0 },
    CriticalBand { name: "Sparkle", low_hz: 10000.0, high_hz: 20000.0 },
];

/// Both bands must exceed this floor before an overlap counts as masking.
const AUDIBILITY_FLOOR_DB: f64 = -20.0;
/// Separation under this is considered overlapping energy.
const SEPARATION_THRESHOLD_DB: f64 = 3.0;
/// High severity when the quieter band is still above this.
const HIGH_SEVERITY_FLOOR_DB: f64 = -15.0;
/// Per-pair cap on the clarity contribution.
const CLARITY_CAP_DB: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaskingIssue {
    pub band_pair: [&'static str; 2],
    pub low_hz: f64,
    pub high_hz: f64,
    pub severity: Severity,
    pub first_energy_db: f64,
    pub second_energy_db: f64,
    pub separation_db: f64,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaskingProfile {
    pub bands: Vec<BandEnergy>,
    pub issues: Vec<MaskingIssue>,
    /// 0-100, higher means better inter-band separation.
    pub clarity_score: u32,
}

pub fn analyze(mono: &[f32], sample_rate: u32) -> MaskingProfile {
    let mut bands: Vec<BandEnergy> = Vec::with_capacity(CRITICAL_BANDS.len());
    let mut energies: Vec<f64> = Vec::with_capacity(CRITICAL_BANDS.len());

    for spec in &CRITICAL_BANDS {
        // Bands the sample rate cannot represent are dropped entirely.
        let Some(filtered) = dsp::bandpass(mono, spec.low_hz, spec.high_hz, sample_rate) else {
            continue;
        };
        let level_db = dsp::round1(dsp::amplitude_db(dsp::rms(&filtered)));
        let spectral_flatness = dsp::round3(dsp::spectral_flatness(&filtered));
        let energy: f64 = filtered.iter().map(|&v| v as f64 * v as f64).sum();
        energies.push(energy);
        bands.push(BandEnergy {
            name: spec.name,
            low_hz: spec.low_hz,
            high_hz: spec.high_hz,
            level_db,
            energy_percent: 0.0,
            spectral_flatness,
        });
    }

    let total_energy: f64 = energies.iter().sum();
    if total_energy > 0.0 {
        for (band, energy) in bands.iter_mut().zip(&energies) {
            band.energy_percent = energy / total_energy * 100.0;
        }
    }

    let mut issues = Vec::new();
    for pair in bands.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let separation = (current.level_db - next.level_db).abs();
        if current.level_db > AUDIBILITY_FLOOR_DB
            && next.level_db > AUDIBILITY_FLOOR_DB
            && separation < SEPARATION_THRESHOLD_DB
        {
            let quieter = current.level_db.min(next.level_db);
            let severity = if quieter > HIGH_SEVERITY_FLOOR_DB {
                Severity::High
            } else {
                Severity::Moderate
            };
            issues.push(MaskingIssue {
                band_pair: [current.name, next.name],
                low_hz: current.low_hz,
                high_hz: next.high_hz,
                severity,
                first_energy_db: current.level_db,
                second_energy_db: next.level_db,
                separation_db: dsp::round1(separation),
                message: format!(
                    "High energy overlap between {:.0}-{:.0}Hz and {:.0}-{:.0}Hz",
                    current.low_hz, current.high_hz, next.low_hz, next.high_hz
                ),
            });
        }
    }

    MaskingProfile {
        clarity_score: clarity_score(&bands),
        bands,
        issues,
    }
}

/// Average inter-band separation, each pair capped at 10 dB, scaled to
/// 0-100. The cap keeps one well-separated pair from dominating the score.
fn clarity_score(bands: &[BandEnergy]) -> u32 {
    if bands.len() < 2 {
        return 0;
    }
    let total: f64 = bands
        .windows(2)
        .map(|pair| (pair[0].level_db - pair[1].level_db).abs().min(CLARITY_CAP_DB))
        .sum();
    let score = (total / (bands.len() - 1) as f64 * 10.0) as i64;
    score.clamp(0, 100) as u32
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaskingSuggestion {
    pub band_pair: [&'static str; 2],
    pub low_hz: f64,
    pub high_hz: f64,
    pub severity: Severity,
    pub message: String,
    pub technique: &'static str,
    pub recommended_plugins: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaskingComparison {
    pub your_clarity: u32,
    pub reference_clarity: u32,
    pub clarity_difference: i64,
    pub your_issue_count: usize,
    pub reference_issue_count: usize,
    pub suggestions: Vec<MaskingSuggestion>,
    pub assessment: &'static str,
}

/// Flags masking present in the mix but absent from the reference, with
/// band-pair-specific advice.
pub fn compare(yours: &MaskingProfile, reference: &MaskingProfile) -> MaskingComparison {
    let mut suggestions = Vec::new();
    for issue in &yours.issues {
        let reference_has_it = reference
            .issues
            .iter()
            .any(|ri| ri.low_hz == issue.low_hz && ri.high_hz == issue.high_hz);
        if reference_has_it {
            continue;
        }
        let advice = advice_for(issue.band_pair);
        suggestions.push(MaskingSuggestion {
            band_pair: issue.band_pair,
            low_hz: issue.low_hz,
            high_hz: issue.high_hz,
            severity: issue.severity,
            message: advice.message,
            technique: advice.technique,
            recommended_plugins: advice.plugins,
        });
    }

    let clarity_difference = yours.clarity_score as i64 - reference.clarity_score as i64;

    MaskingComparison {
        your_clarity: yours.clarity_score,
        reference_clarity: reference.clarity_score,
        clarity_difference,
        your_issue_count: yours.issues.len(),
        reference_issue_count: reference.issues.len(),
        suggestions,
        assessment: clarity_assessment(clarity_difference),
    }
}

struct PairAdvice {
    message: String,
    technique: &'static str,
    plugins: &'static str,
}

struct PairAdviceRow {
    pair: [&'static str; 2],
    message: &'static str,
    technique: &'static str,
    plugins: &'static str,
}

const SPACING_PLUGINS: &str =
    "Wavesfactory Trackspacer, iDX Intelligent Dynamics, FabFilter Pro-Q 3, iZotope Neutron EQ";
const RESONANCE_PLUGINS: &str =
    "Oeksound Soothe2, FabFilter Pro-Q 3, iZotope Ozone EQ";

const PAIR_ADVICE: [PairAdviceRow; 10] = [
    PairAdviceRow {
        pair: ["Sub Bass", "Bass Fundamentals"],
        message: "Sub bass and bass fundamentals are competing. Use high-pass filters to separate kick and bass, keeping kick centered below 60Hz and bass above.",
        technique: "HPF bass at 40-60Hz, cut kick at 80-120Hz where bass sits, or use sidechain compression. Consider multiband sidechain techniques for frequency-specific ducking.",
        plugins: SPACING_PLUGINS,
    },
    PairAdviceRow {
        pair: ["Bass Fundamentals", "Low Mids / Mud Zone"],
        message: "Bass bleeding into low-mids creates muddiness. Cut 200-400Hz on bass to make room for guitars/keys.",
        technique: "Cut 200-300Hz on bass (2-4dB), boost same range slightly on rhythm instruments for clarity. Consider multiband sidechain to dynamically duck bass when other instruments play.",
        plugins: SPACING_PLUGINS,
    },
    PairAdviceRow {
        pair: ["Low Mids / Mud Zone", "Low-Mid Body"],
        message: "The \"mud zone\" is cluttered. This is the most common masking problem. Use subtractive EQ to carve space.",
        technique: "Cut 250-400Hz on competing elements. Identify the most important element and cut others in this range. Consider multiband sidechain techniques for dynamic control.",
        plugins: "Wavesfactory Trackspacer, iDX Intelligent Dynamics, Oeksound Soothe2, FabFilter Pro-Q 3, iZotope Neutron EQ",
    },
    PairAdviceRow {
        pair: ["Low-Mid Body", "Mid Clarity"],
        message: "Low-mids competing with mid clarity. Thin out body frequencies on background elements.",
        technique: "HPF non-essential tracks at 200-300Hz, cut 400-600Hz on rhythm guitars/pads. Use multiband sidechain to create dynamic space.",
        plugins: SPACING_PLUGINS,
    },
    PairAdviceRow {
        pair: ["Mid Clarity", "Vocal Presence"],
        message: "Instruments masking vocal presence. Cut 1-2kHz on instruments to create vocal space.",
        technique: "Notch cut at vocal fundamental frequency on guitars/keys, boost 1-3kHz on vocals. Consider multiband sidechain techniques to duck instruments when vocals are present.",
        plugins: "Wavesfactory Trackspacer, iDX Intelligent Dynamics, Oeksound Soothe2, FabFilter Pro-Q 3, iZotope Neutron EQ",
    },
    PairAdviceRow {
        pair: ["Vocal Presence", "High Mids Clarity"],
        message: "Vocal presence competing with high-mid instruments. Use dynamic EQ or automation.",
        technique: "Side-chain dynamic EQ: duck 2-4kHz on instruments when vocals are present. Multiband sidechain is ideal for this application.",
        plugins: "Wavesfactory Trackspacer, iDX Intelligent Dynamics, Oeksound Soothe2, iZotope Neutron (Masking Meter), FabFilter Pro-Q 3",
    },
    PairAdviceRow {
        pair: ["High Mids Clarity", "Articulation"],
        message: "Consonants and articulation are masked. Reduce 3-4kHz on instruments, preserve on vocals.",
        technique: "Cut 3-4kHz on dense instruments (synths, guitars), boost 3.5kHz on vocals for clarity. Use dynamic processing to tame resonances.",
        plugins: "Oeksound Soothe2, Wavesfactory Trackspacer, iDX Intelligent Dynamics, FabFilter Pro-Q 3",
    },
    PairAdviceRow {
        pair: ["Articulation", "Brightness"],
        message: "Too much energy in upper-mids. De-ess vocals and tame harsh instruments.",
        technique: "De-ess vocals at 5-7kHz, cut 4-6kHz on harsh synths/guitars. Use dynamic resonance suppression for problem frequencies.",
        plugins: "Oeksound Soothe2, FabFilter Pro-DS, Waves Renaissance DeEsser, iZotope Neutron EQ",
    },
    PairAdviceRow {
        pair: ["Brightness", "Air"],
        message: "High frequencies are congested. Use shelving EQ to control excessive brightness.",
        technique: "HPF non-essential elements above 8kHz, use gentle high-shelf cut on busy mixes. Dynamic resonance control helps tame harshness.",
        plugins: RESONANCE_PLUGINS,
    },
    PairAdviceRow {
        pair: ["Air", "Sparkle"],
        message: "Extreme highs are competing. Preserve air only on key elements (vocals, cymbals).",
        technique: "HPF most tracks above 10kHz, keep sparkle only on vocals, overheads, and featured instruments. Use dynamic processing to control excessive sibilance.",
        plugins: RESONANCE_PLUGINS,
    },
];

fn advice_for(pair: [&'static str; 2]) -> PairAdvice {
    for row in &PAIR_ADVICE {
        if row.pair == pair {
            return PairAdvice {
                message: row.message.to_string(),
                technique: row.technique,
                plugins: row.plugins,
            };
        }
    }
    PairAdvice {
        message: format!(
            "Overlapping energy between {} + {}. Create separation by reducing one frequency range.",
            pair[0], pair[1]
        ),
        technique: "Use EQ to cut competing frequencies on less important elements, or use dynamic EQ to duck when conflicts occur. Consider multiband sidechain techniques for frequency-specific control.",
        plugins: "Wavesfactory Trackspacer, iDX Intelligent Dynamics, Oeksound Soothe2, FabFilter Pro-Q 3, iZotope Neutron EQ",
    }
}

fn clarity_assessment(clarity_difference: i64) -> &'static str {
    if clarity_difference >= 10 {
        "Your mix has excellent frequency separation - better than the reference!"
    } else if clarity_difference >= 0 {
        "Your mix has similar frequency separation to the reference."
    } else if clarity_difference >= -10 {
        "Your mix has slightly more frequency overlap than the reference."
    } else if clarity_difference >= -20 {
        "Your mix has noticeably more frequency masking than the reference. Consider carving out space for individual elements."
    } else {
        "Your mix has significant frequency masking issues compared to the reference. Focus on creating separation between instruments."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(name: &'static str, low: f64, high: f64, level_db: f64) -> BandEnergy {
        BandEnergy {
            name,
            low_hz: low,
            high_hz: high,
            level_db,
            energy_percent: 0.0,
            spectral_flatness: 0.5,
        }
    }

    fn profile(levels: &[(usize, f64)]) -> MaskingProfile {
        let bands: Vec<BandEnergy> = levels
            .iter()
            .map(|&(i, level)| {
                let spec = &CRITICAL_BANDS[i];
                band(spec.name, spec.low_hz, spec.high_hz, level)
            })
            .collect();

        let mut issues = Vec::new();
        for pair in bands.windows(2) {
            let (cur, next) = (&pair[0], &pair[1]);
            let separation = (cur.level_db - next.level_db).abs();
            if cur.level_db > -20.0 && next.level_db > -20.0 && separation < 3.0 {
                let quieter = cur.level_db.min(next.level_db);
                issues.push(MaskingIssue {
                    band_pair: [cur.name, next.name],
                    low_hz: cur.low_hz,
                    high_hz: next.high_hz,
                    severity: if quieter > -15.0 {
                        Severity::High
                    } else {
                        Severity::Moderate
                    },
                    first_energy_db: cur.level_db,
                    second_energy_db: next.level_db,
                    separation_db: separation,
                    message: String::new(),
                });
            }
        }
        MaskingProfile {
            clarity_score: clarity_score(&bands),
            bands,
            issues,
        }
    }

    #[test]
    fn quiet_bands_never_mask() {
        let p = profile(&[(0, -30.0), (1, -30.5)]);
        assert!(p.issues.is_empty());
    }

    #[test]
    fn close_loud_bands_raise_issue_with_severity() {
        let moderate = profile(&[(0, -18.0), (1, -16.5)]);
        assert_eq!(moderate.issues.len(), 1);
        assert_eq!(moderate.issues[0].severity, Severity::Moderate);

        let high = profile(&[(0, -12.0), (1, -13.5)]);
        assert_eq!(high.issues.len(), 1);
        assert_eq!(high.issues[0].severity, Severity::High);
    }

    #[test]
    fn clarity_caps_single_pair_contribution() {
        // One enormous separation cannot exceed the 10 dB cap.
        let spread = profile(&[(0, 0.0), (1, -50.0)]);
        assert_eq!(spread.clarity_score, 100);

        let flat = profile(&[(0, -10.0), (1, -10.0), (2, -10.0)]);
        assert_eq!(flat.clarity_score, 0);
    }

    #[test]
    fn compare_flags_only_issues_unique_to_the_mix() {
        let yours = profile(&[(0, -10.0), (1, -11.0), (2, -12.0)]);
        let reference = profile(&[(0, -10.0), (1, -11.0), (2, -40.0)]);
        let comparison = compare(&yours, &reference);
        // Pair (0,1) exists in both; pair (1,2) is unique to the mix.
        assert_eq!(comparison.suggestions.len(), 1);
        assert_eq!(
            comparison.suggestions[0].band_pair,
            ["Bass Fundamentals", "Low Mids / Mud Zone"]
        );
    }

    #[test]
    fn advice_table_covers_known_pairs_and_falls_back() {
        let known = advice_for(["Sub Bass", "Bass Fundamentals"]);
        assert!(known.message.contains("kick"));

        let unknown = advice_for(["Sub Bass", "Sparkle"]);
        assert!(unknown.message.contains("Overlapping energy"));
    }

    #[test]
    fn assessment_tracks_clarity_difference() {
        assert!(clarity_assessment(12).contains("excellent"));
        assert!(clarity_assessment(-25).contains("significant"));
    }
}
