//! Signal Aggregator (Stage 2)
//!
//! Runs the fixed detector panel against an extracted metadata record,
//! aggregates the per-detector signals into one reliability-weighted score,
//! and bands the aggregate into a discrete confidence level. Aggregation
//! and banding are independent of how individual detector scores are
//! produced; substituting real detectors touches nothing here.

pub mod banding;
pub mod detectors;

use tracing::debug;

use crate::types::{Detector, SignalBundle, SignalResult, TechnicalMetadataRecord};

/// Version of the signal analysis output (placeholder detector panel)
pub const SIGNAL_VERSION: &str = "0.7.0";

/// Record must carry more than this many populated fields for the
/// metadata-integrity gate to pass
pub const INTEGRITY_FIELD_FLOOR: usize = 5;

/// Fixed panel of technical detectors
pub struct SignalPanel {
    detectors: Vec<Box<dyn Detector>>,
}

impl SignalPanel {
    /// Standard five-detector panel
    pub fn standard() -> Self {
        Self {
            detectors: vec![
                Box::new(detectors::ModelFingerprintDetector),
                Box::new(detectors::PromptResidueDetector),
                Box::new(detectors::ExportChainDetector),
                Box::new(detectors::CameraSignatureDetector),
                Box::new(detectors::ContainerProfileDetector),
            ],
        }
    }

    /// Panel with injected detectors (tests use deterministic fakes)
    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Run every detector and aggregate the results
    pub fn run(&self, record: &TechnicalMetadataRecord) -> SignalResult {
        let mut bundle = SignalBundle::default();
        for detector in &self.detectors {
            let signal = detector.detect(record);
            debug!(
                detector = detector.name(),
                score = signal.score,
                reliability = signal.reliability,
                "Detector complete"
            );
            bundle.insert(detector.name(), signal);
        }

        let aggregated_score = aggregate_score(&bundle);
        let metadata_integrity = record.populated_field_count() > INTEGRITY_FIELD_FLOOR;
        let confidence =
            banding::band_confidence(&bundle.scores(), &bundle.reliabilities(), metadata_integrity);

        debug!(
            aggregated_score,
            ?confidence,
            metadata_integrity,
            "Signal aggregation complete"
        );

        SignalResult {
            ai_signals: bundle,
            aggregated_score,
            confidence,
            analysis_version: SIGNAL_VERSION.to_string(),
        }
    }
}

/// Reliability-weighted mean of the bundle scores
///
/// `Σ(score·reliability) / Σ(reliability)`, 0 when the reliability mass is
/// zero. Non-finite entries are excluded rather than poisoning the mean.
pub fn aggregate_score(bundle: &SignalBundle) -> f64 {
    let mut weighted_sum = 0.0;
    let mut reliability_sum = 0.0;
    for (_, signal) in bundle.iter() {
        if signal.score.is_finite() && signal.reliability.is_finite() {
            weighted_sum += signal.score * signal.reliability;
            reliability_sum += signal.reliability;
        }
    }
    if reliability_sum == 0.0 {
        0.0
    } else {
        weighted_sum / reliability_sum
    }
}
