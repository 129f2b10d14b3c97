//! Top-level result object handed to the transport layer, plus the
//! visualization spectrum curve.

use serde::Serialize;

use crate::analysis::FeatureReport;
use crate::compare::ComparisonReport;
use crate::dsp;
use crate::suggestions::SuggestionSet;

/// File metadata for one track. `codec`/`bit_rate` come from the
/// best-effort container probe and may be absent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileInfo {
    pub filename: String,
    pub duration_seconds: f64,
    pub format: String,
    pub sample_rate: u32,
    pub channels: usize,
    pub codec: Option<String>,
    pub bit_rate: Option<u64>,
}

/// Down-sampled Welch spectrum for plotting, at most the requested number
/// of points.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpectrumCurve {
    pub frequencies: Vec<f32>,
    pub magnitudes_db: Vec<f32>,
}

pub fn spectrum_curve(mono: &[f32], sample_rate: u32, max_points: usize) -> SpectrumCurve {
    let (freqs, mags) = dsp::welch_power_db(mono, sample_rate, 8192);
    if max_points == 0 || freqs.len() <= max_points {
        return SpectrumCurve {
            frequencies: freqs.iter().map(|&f| round1_f32(f)).collect(),
            magnitudes_db: mags.iter().map(|&m| round1_f32(m)).collect(),
        };
    }

    let last = freqs.len() - 1;
    let mut frequencies = Vec::with_capacity(max_points);
    let mut magnitudes_db = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let idx = i * last / (max_points - 1);
        frequencies.push(round1_f32(freqs[idx]));
        magnitudes_db.push(round1_f32(mags[idx]));
    }
    SpectrumCurve {
        frequencies,
        magnitudes_db,
    }
}

fn round1_f32(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackReport {
    pub file: FileInfo,
    #[serde(flatten)]
    pub features: FeatureReport,
    pub spectrum: SpectrumCurve,
}

/// Everything one comparison request produces. Built fresh per request and
/// discarded after serialization; nothing in here is shared or mutable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub your_mix: TrackReport,
    pub reference: TrackReport,
    pub comparison: ComparisonReport,
    pub suggestions: SuggestionSet,
}
