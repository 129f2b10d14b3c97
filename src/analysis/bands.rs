//! Frequency balance across the six standard mixing bands.

use serde::Serialize;

use super::{BandEnergy, EqAction, EqSuggestion, Severity};
use crate::dsp;

pub struct BandSpec {
    pub name: &'static str,
    pub low_hz: f64,
    pub high_hz: f64,
    /// Representative frequency for EQ suggestions.
    pub center_hz: f64,
}

pub const MIX_BANDS: [BandSpec; 6] = [
    BandSpec { name: "sub_bass", low_hz: 20.0, high_hz: 60.0, center_hz: 40.0 },
    BandSpec { name: "bass", low_hz: 60.0, high_hz: 250.0, center_hz: 120.0 },
    BandSpec { name: "low_mids", low_hz: 250.0, high_hz: 500.0, center_hz: 350.0 },
    BandSpec { name: "mids", low_hz: 500.0, high_hz: 2000.0, center_hz: 1000.0 },
    BandSpec { name: "high_mids", low_hz: 2000.0, high_hz: 6000.0, center_hz: 3500.0 },
    BandSpec { name: "highs", low_hz: 6000.0, high_hz: 20000.0, center_hz: 10000.0 },
];

/// Placeholder level for bands the sample rate cannot represent.
const SKIPPED_BAND_DB: f64 = -80.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrequencyBalance {
    pub bands: Vec<BandEnergy>,
}

pub fn analyze(mono: &[f32], sample_rate: u32) -> FrequencyBalance {
    let mut measured: Vec<(f64, f64, f64)> = Vec::with_capacity(MIX_BANDS.len());
    let mut total_energy = 0.0f64;

    for spec in &MIX_BANDS {
        match dsp::bandpass(mono, spec.low_hz, spec.high_hz, sample_rate) {
            Some(filtered) => {
                let level_db = dsp::round1(dsp::amplitude_db(dsp::rms(&filtered)));
                let energy: f64 = filtered.iter().map(|&v| v as f64 * v as f64).sum();
                let flatness = dsp::round3(dsp::spectral_flatness(&filtered));
                total_energy += energy;
                measured.push((level_db, energy, flatness));
            }
            None => measured.push((SKIPPED_BAND_DB, 0.0, 0.0)),
        }
    }

    let bands = MIX_BANDS
        .iter()
        .zip(measured)
        .map(|(spec, (level_db, energy, spectral_flatness))| BandEnergy {
            name: spec.name,
            low_hz: spec.low_hz,
            high_hz: spec.high_hz,
            level_db,
            energy_percent: if total_energy > 0.0 {
                energy / total_energy * 100.0
            } else {
                0.0
            },
            spectral_flatness,
        })
        .collect();

    FrequencyBalance { bands }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelStatus {
    Louder,
    Quieter,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandDiff {
    pub band: &'static str,
    pub your_level_db: f64,
    pub reference_level_db: f64,
    pub difference_db: f64,
    pub status: LevelStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProblemBand {
    pub band: &'static str,
    pub low_hz: f64,
    pub high_hz: f64,
    pub difference_db: f64,
    pub severity: Severity,
    pub suggestion: EqSuggestion,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandComparison {
    pub differences: Vec<BandDiff>,
    pub problem_bands: Vec<ProblemBand>,
}

/// Per-band dB difference, flagging bands more than 3 dB apart (high
/// severity above 6 dB).
pub fn compare(yours: &FrequencyBalance, reference: &FrequencyBalance) -> BandComparison {
    let mut differences = Vec::with_capacity(MIX_BANDS.len());
    let mut problem_bands = Vec::new();

    for ((spec, your_band), ref_band) in MIX_BANDS.iter().zip(&yours.bands).zip(&reference.bands) {
        let diff = your_band.level_db - ref_band.level_db;
        let status = if diff > 0.5 {
            LevelStatus::Louder
        } else if diff < -0.5 {
            LevelStatus::Quieter
        } else {
            LevelStatus::Matched
        };

        differences.push(BandDiff {
            band: spec.name,
            your_level_db: your_band.level_db,
            reference_level_db: ref_band.level_db,
            difference_db: dsp::round1(diff),
            status,
        });

        if diff.abs() > 3.0 {
            let severity = if diff.abs() > 6.0 {
                Severity::High
            } else {
                Severity::Moderate
            };
            problem_bands.push(ProblemBand {
                band: spec.name,
                low_hz: spec.low_hz,
                high_hz: spec.high_hz,
                difference_db: dsp::round1(diff),
                severity,
                suggestion: eq_suggestion(spec, diff),
            });
        }
    }

    BandComparison {
        differences,
        problem_bands,
    }
}

/// Cut or boost at the band center by 70% of the measured difference; the
/// partial correction keeps suggested moves conservative.
fn eq_suggestion(spec: &BandSpec, difference_db: f64) -> EqSuggestion {
    let gain = dsp::round1(-difference_db * 0.7);
    let action = if difference_db > 0.0 {
        EqAction::Cut
    } else {
        EqAction::Boost
    };
    let verb = match action {
        EqAction::Cut => "Cut",
        EqAction::Boost => "Boost",
    };
    EqSuggestion {
        action,
        frequency_hz: spec.center_hz,
        gain_db: gain,
        q: 1.0,
        message: format!(
            "{} {:.0}Hz by {:.1}dB to match reference",
            verb, spec.center_hz, gain
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pseudo_noise(n: usize) -> Vec<f32> {
        let mut state = 0x9e3779b9u32;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                ((state >> 8) as f32 / 8_388_608.0 - 1.0) * 0.5
            })
            .collect()
    }

    fn balance_with_levels(levels: [f64; 6]) -> FrequencyBalance {
        let bands = MIX_BANDS
            .iter()
            .zip(levels)
            .map(|(spec, level_db)| BandEnergy {
                name: spec.name,
                low_hz: spec.low_hz,
                high_hz: spec.high_hz,
                level_db,
                energy_percent: 100.0 / 6.0,
                spectral_flatness: 0.5,
            })
            .collect();
        FrequencyBalance { bands }
    }

    #[test]
    fn energy_percent_sums_to_one_hundred() {
        let noise = pseudo_noise(22050);
        let balance = analyze(&noise, 22050);
        let total: f64 = balance.bands.iter().map(|b| b.energy_percent).sum();
        assert_relative_eq!(total, 100.0, epsilon = 0.1);
    }

    #[test]
    fn bands_above_nyquist_get_placeholder() {
        let noise = pseudo_noise(8000);
        let balance = analyze(&noise, 8000);
        // Nyquist is 4000; high_mids (2k-6k) still runs clamped, highs does not.
        let highs = &balance.bands[5];
        assert_eq!(highs.level_db, -80.0);
        assert_eq!(highs.energy_percent, 0.0);
        assert!(balance.bands[4].level_db > -80.0);
    }

    #[test]
    fn identical_balances_have_no_problems() {
        let noise = pseudo_noise(22050);
        let balance = analyze(&noise, 22050);
        let comparison = compare(&balance, &balance);
        assert!(comparison.problem_bands.is_empty());
        assert!(comparison
            .differences
            .iter()
            .all(|d| d.difference_db == 0.0 && d.status == LevelStatus::Matched));
    }

    #[test]
    fn large_differences_become_problem_bands() {
        let yours = balance_with_levels([-10.0, -10.0, -10.0, -10.0, -10.0, -10.0]);
        let reference = balance_with_levels([-14.0, -10.0, -18.0, -10.2, -10.0, -10.0]);
        let comparison = compare(&yours, &reference);
        assert_eq!(comparison.problem_bands.len(), 2);

        let sub = &comparison.problem_bands[0];
        assert_eq!(sub.band, "sub_bass");
        assert_eq!(sub.severity, Severity::Moderate);
        assert_eq!(sub.suggestion.action, EqAction::Cut);
        assert_relative_eq!(sub.suggestion.gain_db, -2.8, epsilon = 1e-9);
        assert_eq!(sub.suggestion.q, 1.0);

        let low_mids = &comparison.problem_bands[1];
        assert_eq!(low_mids.band, "low_mids");
        assert_eq!(low_mids.severity, Severity::High);
        assert_eq!(low_mids.suggestion.action, EqAction::Boost);
        assert_relative_eq!(low_mids.suggestion.gain_db, 5.6, epsilon = 1e-9);
    }

    #[test]
    fn comparison_differences_are_sign_symmetric() {
        let a = balance_with_levels([-10.0, -12.0, -8.0, -20.0, -15.0, -30.0]);
        let b = balance_with_levels([-13.0, -10.0, -8.5, -14.0, -15.0, -31.0]);
        let ab = compare(&a, &b);
        let ba = compare(&b, &a);
        for (x, y) in ab.differences.iter().zip(&ba.differences) {
            assert_relative_eq!(x.difference_db, -y.difference_db, epsilon = 1e-9);
        }
    }
}
