//! Suggestion Compiler: folds the five diff reports into one prioritized,
//! de-duplicated advice set plus a short summary.

use serde::Serialize;

use crate::analysis::dynamics::{CompressionStatus, DynamicsSuggestion};
use crate::analysis::masking::MaskingSuggestion;
use crate::analysis::stereo::{StereoComparison, StereoSuggestions};
use crate::analysis::{EqSuggestion, Severity};
use crate::compare::ComparisonReport;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SuggestionSet {
    /// Broad band corrections first, then narrow resonance cuts.
    pub eq_adjustments: Vec<EqSuggestion>,
    pub compression: Option<DynamicsSuggestion>,
    pub gain: Option<DynamicsSuggestion>,
    pub limiting: Option<DynamicsSuggestion>,
    pub masking: Vec<MaskingSuggestion>,
    pub stereo: Option<StereoSuggestions>,
    /// Ordered, human-readable headline issues.
    pub summary: Vec<String>,
}

/// Never fails: absent or qualitative-only diff categories simply yield
/// empty entries.
pub fn compile(comparison: &ComparisonReport) -> SuggestionSet {
    let mut eq_adjustments: Vec<EqSuggestion> = Vec::new();
    for problem in &comparison.frequency_balance.problem_bands {
        eq_adjustments.push(problem.suggestion.clone());
    }
    for problem in &comparison.resonances.problem_resonances {
        eq_adjustments.push(problem.suggestion.clone());
    }

    let stereo = match &comparison.stereo {
        StereoComparison::Stereo(diff) => Some(diff.suggestions.clone()),
        _ => None,
    };

    SuggestionSet {
        eq_adjustments,
        compression: comparison.dynamics.suggestions.compression.clone(),
        gain: comparison.dynamics.suggestions.gain.clone(),
        limiting: comparison.dynamics.suggestions.limiting.clone(),
        masking: comparison.masking.suggestions.clone(),
        stereo,
        summary: summary(comparison),
    }
}

/// Headline issues, worst first; degrades to a single well-balanced
/// message when nothing crosses a materiality threshold.
fn summary(comparison: &ComparisonReport) -> Vec<String> {
    let mut lines = Vec::new();

    let high_bands: Vec<String> = comparison
        .frequency_balance
        .problem_bands
        .iter()
        .filter(|p| p.severity == Severity::High)
        .map(|p| p.band.replace('_', " "))
        .collect();
    if !high_bands.is_empty() {
        lines.push(format!(
            "Major frequency imbalance in: {}",
            high_bands.join(", ")
        ));
    }

    if comparison.masking.clarity_difference < -15 {
        lines.push(format!(
            "Significant frequency masking detected (clarity score: {}/100)",
            comparison.masking.your_clarity
        ));
    }

    if comparison.resonances.your_high_severity > comparison.resonances.reference_high_severity + 1
    {
        lines.push(format!(
            "Multiple harsh resonances detected ({} severe peaks)",
            comparison.resonances.your_high_severity
        ));
    }

    let compression = &comparison.dynamics.compression;
    if matches!(
        compression.status,
        CompressionStatus::MuchMoreCompressed | CompressionStatus::MuchLessCompressed
    ) {
        lines.push(compression.description.to_string());
    }

    if lines.is_empty() {
        lines.push("Your mix is well-balanced overall! Minor tweaks suggested below.".to_string());
    }

    lines
}
