//! Evidence manifest supplied by the evidence-registration workflow
//!
//! The manifest describes what evidence artifacts exist for a case. It is
//! produced outside the analysis core and consumed read-only by the
//! consistency engine.

use serde::{Deserialize, Serialize};

/// One registered evidence artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Evidence kind (e.g. "sketch", "layered_file")
    pub kind: String,
    /// Optional artifact name (e.g. original filename)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Caller-supplied description of available evidence for a case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceManifest {
    #[serde(default)]
    pub has_source_files: bool,
    #[serde(default)]
    pub has_process_evidence: bool,
    #[serde(default)]
    pub has_iteration_files: bool,
    #[serde(default)]
    pub has_layered_files: bool,
    #[serde(default)]
    pub has_multiple_versions: bool,
    /// Registered evidence items
    #[serde(default)]
    pub items: Vec<EvidenceItem>,
}

impl EvidenceManifest {
    /// True when any of the iteration-style control evidence kinds is present
    pub fn has_control_evidence(&self) -> bool {
        self.has_iteration_files || self.has_layered_files || self.has_multiple_versions
    }
}
