//! Confidence arithmetic and the review gate

use crate::model::RuleEffect;

/// Apply one fired rule's confidence effect: scale first, then add
pub fn adjust(confidence: f64, effect: &RuleEffect) -> f64 {
    let scaled = confidence * effect.confidence_factor.unwrap_or(1.0);
    scaled + effect.confidence_delta.unwrap_or(0.0)
}

/// Clamp to [0, 1] and round to two decimals.
///
/// Non-finite input (e.g. a NaN factor from config) collapses to 0.
pub fn finalize(confidence: f64) -> f64 {
    if !confidence.is_finite() {
        return 0.0;
    }
    let clamped = confidence.clamp(0.0, 1.0);
    (clamped * 100.0).round() / 100.0
}

/// The threshold is exclusive: a confidence equal to it passes the gate
pub fn below_threshold(confidence: f64, threshold: f64) -> bool {
    confidence < threshold
}
