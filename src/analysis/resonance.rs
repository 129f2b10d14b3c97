//! Resonance detection: narrow spectral peaks that read as harshness,
//! ringing or boxiness.

use serde::Serialize;

use super::{EqAction, EqSuggestion, Severity};
use crate::dsp;

/// Welch segment size; capped at the buffer length for short files.
const SPECTRUM_NFFT: usize = 8192;
/// Minimum peak prominence above the local baseline, dB.
const MIN_PROMINENCE_DB: f32 = 3.0;
/// Peaks below this absolute level are ignored, dB.
const MIN_HEIGHT_DB: f32 = -40.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resonance {
    pub frequency_hz: f64,
    pub level_db: f64,
    pub prominence_db: f64,
    pub q_factor: f64,
    pub severity: Severity,
}

pub fn detect(mono: &[f32], sample_rate: u32) -> Vec<Resonance> {
    let (freqs, mags) = dsp::welch_power_db(mono, sample_rate, SPECTRUM_NFFT.min(mono.len().max(1)));
    if mags.len() < 3 {
        return Vec::new();
    }

    // At least ~100 Hz apart at the default resolution.
    let distance = (freqs.len() / 200).max(1);
    let peaks = find_peaks(&mags, MIN_HEIGHT_DB, MIN_PROMINENCE_DB, distance);

    let mut resonances: Vec<Resonance> = peaks
        .into_iter()
        .map(|peak| {
            let frequency = freqs[peak.index] as f64;
            let q_factor = estimate_q(&mags, &freqs, peak.index);
            let prominence = peak.prominence as f64;
            Resonance {
                frequency_hz: dsp::round1(frequency),
                level_db: dsp::round1(mags[peak.index] as f64),
                prominence_db: dsp::round1(prominence),
                q_factor: dsp::round1(q_factor),
                severity: classify(prominence, q_factor, frequency),
            }
        })
        .collect();

    resonances.sort_by(|a, b| {
        a.severity
            .rank()
            .cmp(&b.severity.rank())
            .then(b.prominence_db.total_cmp(&a.prominence_db))
    });
    resonances
}

struct Peak {
    index: usize,
    prominence: f32,
}

/// Local maxima filtered by height, minimum spacing (taller peaks win),
/// then prominence. Plateaus resolve to their midpoint.
fn find_peaks(mags: &[f32], min_height: f32, min_prominence: f32, distance: usize) -> Vec<Peak> {
    let n = mags.len();
    let mut candidates: Vec<usize> = Vec::new();
    let mut i = 1;
    while i < n - 1 {
        if mags[i - 1] < mags[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && mags[ahead] == mags[i] {
                ahead += 1;
            }
            if mags[ahead] < mags[i] {
                candidates.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }

    candidates.retain(|&idx| mags[idx] >= min_height);

    // Enforce spacing by descending height priority.
    let mut keep = vec![true; candidates.len()];
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| mags[candidates[a]].total_cmp(&mags[candidates[b]]));
    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && candidates[j] - candidates[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < candidates.len() && candidates[k] - candidates[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter(|&(_, kept)| kept)
        .map(|(index, _)| Peak {
            index,
            prominence: prominence(mags, index),
        })
        .filter(|peak| peak.prominence >= min_prominence)
        .collect()
}

/// Topographic prominence: height above the higher of the two valley
/// minima reached before a taller sample on either side.
fn prominence(mags: &[f32], peak: usize) -> f32 {
    let height = mags[peak];

    let mut left_min = height;
    let mut i = peak;
    while i > 0 {
        i -= 1;
        if mags[i] > height {
            break;
        }
        left_min = left_min.min(mags[i]);
    }

    let mut right_min = height;
    let mut i = peak;
    while i < mags.len() - 1 {
        i += 1;
        if mags[i] > height {
            break;
        }
        right_min = right_min.min(mags[i]);
    }

    height - left_min.max(right_min)
}

/// Q from the -3 dB bandwidth: walk outward until the magnitude drops 3 dB
/// on each side. Capped at 20; defaults to 1.0 when either half-power
/// point runs off the spectrum.
fn estimate_q(mags: &[f32], freqs: &[f32], peak: usize) -> f64 {
    let target = mags[peak] - 3.0;

    let mut left = peak;
    while left > 0 && mags[left] > target {
        left -= 1;
    }
    let mut right = peak;
    while right < mags.len() - 1 && mags[right] > target {
        right += 1;
    }

    if left > 0 && right < mags.len() - 1 {
        let bandwidth = (freqs[right] - freqs[left]) as f64;
        if bandwidth > 0.0 {
            return (freqs[peak] as f64 / bandwidth).min(20.0);
        }
    }
    1.0
}

/// Ranges where resonances read as harsh rather than merely uneven.
const HARSH_RANGES: [(f64, f64); 2] = [(2000.0, 4000.0), (6000.0, 8000.0)];

struct SeverityRule {
    min_prominence: f64,
    min_q: f64,
    harsh_only: bool,
    severity: Severity,
}

/// Ordered; first matching row wins.
const SEVERITY_RULES: [SeverityRule; 4] = [
    SeverityRule { min_prominence: 6.0, min_q: 2.0, harsh_only: false, severity: Severity::High },
    SeverityRule { min_prominence: 5.0, min_q: 0.0, harsh_only: true, severity: Severity::High },
    SeverityRule { min_prominence: 4.0, min_q: 0.0, harsh_only: false, severity: Severity::Moderate },
    SeverityRule { min_prominence: 3.0, min_q: 2.0, harsh_only: false, severity: Severity::Moderate },
];

fn classify(prominence: f64, q_factor: f64, frequency: f64) -> Severity {
    let harsh = HARSH_RANGES
        .iter()
        .any(|&(low, high)| (low..=high).contains(&frequency));
    for rule in &SEVERITY_RULES {
        if prominence >= rule.min_prominence
            && q_factor >= rule.min_q
            && (!rule.harsh_only || harsh)
        {
            return rule.severity;
        }
    }
    Severity::Low
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProblemResonance {
    pub frequency_hz: f64,
    pub level_db: f64,
    pub prominence_db: f64,
    pub severity: Severity,
    pub suggestion: EqSuggestion,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResonanceComparison {
    pub your_total: usize,
    pub reference_total: usize,
    pub your_high_severity: usize,
    pub your_moderate_severity: usize,
    pub reference_high_severity: usize,
    pub reference_moderate_severity: usize,
    pub problem_resonances: Vec<ProblemResonance>,
    pub assessment: &'static str,
}

/// A mix resonance is a problem only when the reference has nothing within
/// 50 Hz of it and its severity is at least moderate.
pub fn compare(yours: &[Resonance], reference: &[Resonance]) -> ResonanceComparison {
    let mut problem_resonances = Vec::new();
    for res in yours {
        let reference_has_similar = reference
            .iter()
            .any(|r| (r.frequency_hz - res.frequency_hz).abs() < 50.0);
        if !reference_has_similar && res.severity != Severity::Low {
            problem_resonances.push(ProblemResonance {
                frequency_hz: res.frequency_hz,
                level_db: res.level_db,
                prominence_db: res.prominence_db,
                severity: res.severity,
                suggestion: cut_suggestion(res),
            });
        }
    }

    let count = |list: &[Resonance], severity: Severity| {
        list.iter().filter(|r| r.severity == severity).count()
    };
    let your_high = count(yours, Severity::High);
    let reference_high = count(reference, Severity::High);

    ResonanceComparison {
        your_total: yours.len(),
        reference_total: reference.len(),
        your_high_severity: your_high,
        your_moderate_severity: count(yours, Severity::Moderate),
        reference_high_severity: reference_high,
        reference_moderate_severity: count(reference, Severity::Moderate),
        problem_resonances,
        assessment: assessment(yours.len(), reference.len(), your_high, reference_high),
    }
}

fn cut_suggestion(res: &Resonance) -> EqSuggestion {
    let gain = dsp::round1(-(res.prominence_db * 0.8).min(8.0));
    let q = dsp::round1((res.q_factor * 0.8).min(5.0));
    EqSuggestion {
        action: EqAction::Cut,
        frequency_hz: res.frequency_hz,
        gain_db: gain,
        q,
        message: format!(
            "Cut {:.0}Hz by {:.1}dB (Q={:.1}) to reduce {}",
            res.frequency_hz,
            gain,
            q,
            describe_frequency(res.frequency_hz)
        ),
    }
}

fn describe_frequency(frequency_hz: f64) -> &'static str {
    if frequency_hz < 100.0 {
        "rumble/sub-bass resonance"
    } else if frequency_hz < 250.0 {
        "bass resonance"
    } else if frequency_hz < 500.0 {
        "mud/boxiness"
    } else if frequency_hz < 1000.0 {
        "low-mid resonance"
    } else if frequency_hz < 2000.0 {
        "mid-range resonance"
    } else if frequency_hz < 4000.0 {
        "presence harshness"
    } else if frequency_hz < 8000.0 {
        "sibilance/brightness"
    } else {
        "high-frequency harshness"
    }
}

fn assessment(
    your_total: usize,
    reference_total: usize,
    your_high: usize,
    reference_high: usize,
) -> &'static str {
    if your_high == 0 && your_total <= reference_total {
        "Your mix has a smooth frequency response - no significant resonances detected!"
    } else if your_high == 0 {
        "Your mix has no severe resonances, similar to the reference."
    } else if your_high <= reference_high {
        "Your mix has a similar number of resonances as the reference."
    } else if your_high <= reference_high + 2 {
        "Your mix has slightly more resonances than the reference. Consider smoothing the frequency response."
    } else {
        "Your mix has significantly more resonances than the reference. Focus on reducing harsh peaks for a smoother sound."
    }
}
