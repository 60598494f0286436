//! Placeholder detector panel
//!
//! Deterministic heuristics over the metadata record, standing in for real
//! content-level detectors. Each one is a pure function of the record and
//! infallible: degenerate input lowers score and reliability, it never
//! errors. Production detectors replace these behind the `Detector` trait
//! without touching aggregation or banding.

use serde_json::json;

use crate::types::{Detector, Signal, TechnicalMetadataRecord};

/// Closed list of known generator names for model fingerprinting
pub const KNOWN_GENERATORS: [&str; 12] = [
    "midjourney",
    "stable diffusion",
    "stable-diffusion",
    "sdxl",
    "dall-e",
    "dalle",
    "firefly",
    "runway",
    "leonardo",
    "flux",
    "comfyui",
    "novelai",
];

/// Generator parameter keys left behind by text-to-image pipelines
const GENERATOR_PARAMETER_KEYS: [&str; 9] = [
    "parameters",
    "prompt",
    "negative_prompt",
    "seed",
    "sampler",
    "steps",
    "cfg_scale",
    "model_hash",
    "denoising_strength",
];

/// Capture-hardware keys expected from camera originals
const CAPTURE_KEYS: [&str; 8] = [
    "make",
    "model",
    "exposure_time",
    "f_number",
    "iso",
    "focal_length",
    "lens_model",
    "gps_latitude",
];

/// Matches software-identity fields against the known generator list
///
/// The only detector that reports a matched-model label: all matches go
/// into `extra.matched_models` for the tooling dimension downstream.
pub struct ModelFingerprintDetector;

impl Detector for ModelFingerprintDetector {
    fn name(&self) -> &'static str {
        "model_fingerprint"
    }

    fn detect(&self, record: &TechnicalMetadataRecord) -> Signal {
        let identities = record.software_identities();
        let mut matched: Vec<&str> = Vec::new();
        for (_, value) in &identities {
            let lowered = value.to_lowercase();
            for generator in KNOWN_GENERATORS {
                if lowered.contains(generator) && !matched.contains(&generator) {
                    matched.push(generator);
                }
            }
        }

        if !matched.is_empty() {
            Signal::new(0.9, 0.85).with_extra(json!({ "matched_models": matched }))
        } else if !identities.is_empty() {
            // Software present, none of it a known generator
            Signal::new(0.1, 0.3)
        } else {
            Signal::new(0.05, 0.2)
        }
    }
}

/// Looks for generator sampling parameters in the record keys
pub struct PromptResidueDetector;

impl Detector for PromptResidueDetector {
    fn name(&self) -> &'static str {
        "prompt_residue"
    }

    fn detect(&self, record: &TechnicalMetadataRecord) -> Signal {
        let hits = GENERATOR_PARAMETER_KEYS
            .iter()
            .filter(|key| record.fields.contains_key(**key))
            .count();

        match hits {
            0 => Signal::new(0.05, 0.5),
            1 => Signal::new(0.6, 0.6),
            _ => Signal::new(0.95, 0.9),
        }
    }
}

/// Reads the derived export-chain marker
pub struct ExportChainDetector;

impl Detector for ExportChainDetector {
    fn name(&self) -> &'static str {
        "export_chain"
    }

    fn detect(&self, record: &TechnicalMetadataRecord) -> Signal {
        if record.export_chain_detected {
            Signal::new(0.4, 0.45)
        } else if !record.software_identities().is_empty() {
            Signal::new(0.2, 0.4)
        } else {
            Signal::new(0.1, 0.25)
        }
    }
}

/// Scores the presence of capture-hardware fields
///
/// A rich capture block is strong evidence of a camera original; its
/// absence is only weak evidence of generation.
pub struct CameraSignatureDetector;

impl Detector for CameraSignatureDetector {
    fn name(&self) -> &'static str {
        "camera_signature"
    }

    fn detect(&self, record: &TechnicalMetadataRecord) -> Signal {
        let hits = CAPTURE_KEYS
            .iter()
            .filter(|key| record.fields.contains_key(**key))
            .count();

        match hits {
            0 => Signal::new(0.6, 0.4),
            1 | 2 => Signal::new(0.3, 0.5),
            _ => Signal::new(0.05, 0.8),
        }
    }
}

/// Container profile heuristic over type, color space, and geometry
pub struct ContainerProfileDetector;

impl Detector for ContainerProfileDetector {
    fn name(&self) -> &'static str {
        "container_profile"
    }

    fn detect(&self, record: &TechnicalMetadataRecord) -> Signal {
        let has_type = record.get_str("file_type").is_some();
        let has_profile =
            record.fields.contains_key("color_space") && record.fields.contains_key("resolution");

        if has_type && has_profile {
            Signal::new(0.25, 0.45)
        } else if has_type {
            Signal::new(0.35, 0.3)
        } else {
            Signal::new(0.1, 0.15)
        }
    }
}
