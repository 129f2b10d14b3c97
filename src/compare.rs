//! Two-track orchestration: analyze both tracks concurrently, pair every
//! analyzer's reports through its compare step, compile suggestions.

use serde::Serialize;

use crate::analysis::{self, bands, dynamics, masking, resonance, stereo, FeatureReport};
use crate::audio::AudioBuffer;
use crate::report::{spectrum_curve, ComparisonResult, FileInfo, SpectrumCurve, TrackReport};
use crate::suggestions;

/// The five per-analyzer diff reports.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub frequency_balance: bands::BandComparison,
    pub masking: masking::MaskingComparison,
    pub resonances: resonance::ResonanceComparison,
    pub dynamics: dynamics::DynamicsComparison,
    pub stereo: stereo::StereoComparison,
}

pub fn compare_features(yours: &FeatureReport, reference: &FeatureReport) -> ComparisonReport {
    ComparisonReport {
        frequency_balance: bands::compare(&yours.frequency_balance, &reference.frequency_balance),
        masking: masking::compare(&yours.masking, &reference.masking),
        resonances: resonance::compare(&yours.resonances, &reference.resonances),
        dynamics: dynamics::compare(&yours.dynamics, &reference.dynamics),
        stereo: stereo::compare(&yours.stereo, &reference.stereo),
    }
}

/// Runs the full comparison pipeline over two validated buffers. The two
/// per-track passes share nothing, so they run on separate rayon workers
/// and join before the compare phase.
pub fn run_comparison(
    your_mix: &AudioBuffer,
    your_info: FileInfo,
    reference: &AudioBuffer,
    reference_info: FileInfo,
    spectrum_points: usize,
) -> ComparisonResult {
    log::info!("Analyzing your mix and reference...");
    let (your_pass, reference_pass) = rayon::join(
        || analyze_track(your_mix, spectrum_points),
        || analyze_track(reference, spectrum_points),
    );
    let (your_features, your_spectrum) = your_pass;
    let (reference_features, reference_spectrum) = reference_pass;

    log::info!("Comparing results...");
    let comparison = compare_features(&your_features, &reference_features);
    let suggestions = suggestions::compile(&comparison);

    ComparisonResult {
        your_mix: TrackReport {
            file: your_info,
            features: your_features,
            spectrum: your_spectrum,
        },
        reference: TrackReport {
            file: reference_info,
            features: reference_features,
            spectrum: reference_spectrum,
        },
        comparison,
        suggestions,
    }
}

fn analyze_track(buffer: &AudioBuffer, spectrum_points: usize) -> (FeatureReport, SpectrumCurve) {
    let features = analysis::analyze(buffer);
    let curve = spectrum_curve(&buffer.to_mono(), buffer.sample_rate(), spectrum_points);
    (features, curve)
}
