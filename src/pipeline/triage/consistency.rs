// Post-hoc consistency review of a coerced triage result (logged, never applied).
// The "missing vitals never raise priority" rule lives only in the prompt, so
// outputs that look overconfident on thin data are flagged for reviewers.

use super::types::{Priority, TriageResult};
use super::vitals::NormalizedVitals;

/// Confidence at or above this is "high".
pub const HIGH_CONFIDENCE: f64 = 0.85;

/// Missing vital groups at or above this make high confidence suspicious.
pub const SPARSE_VITALS_MISSING: usize = 3;

/// Review a result against the vitals it was produced from.
/// Returns human-readable warnings; an empty list means nothing to flag.
pub fn review_consistency(result: &TriageResult, vitals: &NormalizedVitals) -> Vec<String> {
    let mut warnings = Vec::new();
    let missing = vitals.missing_count();

    if result.confidence >= HIGH_CONFIDENCE && missing >= SPARSE_VITALS_MISSING {
        warnings.push(format!(
            "High confidence {:.2} with {missing} of 6 vital groups missing",
            result.confidence
        ));
    }

    if result.priority == Priority::CriticalUrgent && result.red_flags.is_empty() {
        warnings.push("Critical priority without any red flags".to_string());
    }

    if !warnings.is_empty() {
        tracing::warn!(
            priority = result.priority.as_str(),
            confidence = result.confidence,
            missing_vitals = missing,
            warning_count = warnings.len(),
            "Triage result consistency warnings"
        );
    }

    warnings
}
