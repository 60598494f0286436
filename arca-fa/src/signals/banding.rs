//! Confidence banding
//!
//! Pure function of (scores, reliabilities, metadata-integrity). Kept
//! separate from the detector panel so the banding rule survives detector
//! substitution unchanged.
//!
//! Bands:
//! - `High`: at least 4 scores, population variance below 0.05, at least 3
//!   detectors with reliability above 0.7, and metadata integrity
//! - `Medium`: at least 3 scores and metadata integrity
//! - `Low`: everything else (including an empty score list)

use crate::types::ConfidenceBand;

/// Variance ceiling for the High band
pub const HIGH_VARIANCE_CEILING: f64 = 0.05;

/// Reliability floor counted toward the High band
pub const HIGH_RELIABILITY_FLOOR: f64 = 0.7;

/// Classify an aggregate into a discrete confidence band
pub fn band_confidence(
    scores: &[f64],
    reliabilities: &[f64],
    metadata_integrity: bool,
) -> ConfidenceBand {
    if scores.is_empty() {
        return ConfidenceBand::Low;
    }

    let variance = population_variance(scores);
    let reliable_detectors = reliabilities
        .iter()
        .filter(|r| **r > HIGH_RELIABILITY_FLOOR)
        .count();

    if scores.len() >= 4
        && variance < HIGH_VARIANCE_CEILING
        && reliable_detectors >= 3
        && metadata_integrity
    {
        ConfidenceBand::High
    } else if scores.len() >= 3 && metadata_integrity {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

/// Population variance (not sample variance) of the score list
pub fn population_variance(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64
}
