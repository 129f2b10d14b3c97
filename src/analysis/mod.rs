pub mod bands;
pub mod dynamics;
pub mod masking;
pub mod resonance;
pub mod stereo;

use serde::Serialize;

use crate::audio::AudioBuffer;

/// Problem severity shared by every analyzer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    /// Sort rank, high first.
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Moderate => 1,
            Severity::Low => 2,
        }
    }
}

/// Per-band measurement shared by the mixing-band and critical-band
/// analyzers. Energy percentages across one analyzer's band set sum to 100.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandEnergy {
    pub name: &'static str,
    pub low_hz: f64,
    pub high_hz: f64,
    pub level_db: f64,
    pub energy_percent: f64,
    pub spectral_flatness: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EqAction {
    Cut,
    Boost,
}

/// A single corrective EQ move. Produced by the band comparison (broad
/// bell at a band center) and the resonance comparison (narrow cut).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EqSuggestion {
    pub action: EqAction,
    pub frequency_hz: f64,
    pub gain_db: f64,
    pub q: f64,
    pub message: String,
}

/// Everything the engine measures about one track. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureReport {
    pub frequency_balance: bands::FrequencyBalance,
    pub masking: masking::MaskingProfile,
    pub resonances: Vec<resonance::Resonance>,
    pub dynamics: dynamics::DynamicsProfile,
    pub stereo: stereo::StereoProfile,
}

/// Runs the five analyzers over one track. The analyzers are independent
/// of each other; the mono fold feeds the spectral ones and the full
/// buffer feeds dynamics and stereo.
pub fn analyze(buffer: &AudioBuffer) -> FeatureReport {
    let mono = buffer.to_mono();
    let sample_rate = buffer.sample_rate();
    FeatureReport {
        frequency_balance: bands::analyze(&mono, sample_rate),
        masking: masking::analyze(&mono, sample_rate),
        resonances: resonance::detect(&mono, sample_rate),
        dynamics: dynamics::analyze(buffer),
        stereo: stereo::analyze(buffer),
    }
}
