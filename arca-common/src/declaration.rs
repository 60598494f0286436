//! Frozen artist declaration document
//!
//! A declaration is submitted once, timestamped and hashed by the intake
//! service, and never modified afterwards. Analysis services treat it as
//! read-only input: nothing in ARCA writes to a declaration, and no analysis
//! output ever carries a GIT level or confidence grade of its own.
//!
//! The canonical hash is SHA-256 over the canonical JSON serialization of the
//! document. `serde_json` maps are ordered, so serializing a deserialized
//! document always yields identical bytes regardless of the key order of the
//! original submission.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Declared level of human control over execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlLevel {
    High,
    Medium,
    Low,
}

/// One declared AI tool (engine name and/or free-form label)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredTool {
    /// Engine name from the intake catalogue (e.g. "midjourney")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Custom label supplied by the artist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DeclaredTool {
    /// Names of this tool usable for signature matching
    pub fn matchable_names(&self) -> impl Iterator<Item = &str> {
        self.engine
            .as_deref()
            .into_iter()
            .chain(self.label.as_deref())
    }
}

/// Evidence item the artist promises to supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromisedEvidence {
    /// Evidence kind (e.g. "sketch", "layered_file", "screen_recording")
    pub kind: String,
    /// Optional human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Genesis declaration: how the work came into being
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisDeclaration {
    /// Declared GIT level (0-5); input to analysis, never computed by it
    pub git_level: u8,
    /// AI tools declared as part of the genesis process
    #[serde(default)]
    pub ai_tools: Vec<DeclaredTool>,
}

/// Process declaration: the declared production workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDeclaration {
    /// Software the artist declares having used
    #[serde(default)]
    pub software: Vec<String>,
    /// Artist asserts no AI contribution is present in the final artifact
    #[serde(default)]
    pub no_ai_in_final: bool,
    /// Evidence the artist promises to supply
    #[serde(default)]
    pub promised_evidence: Vec<PromisedEvidence>,
    /// Declared level of human control over execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_control: Option<ControlLevel>,
}

/// Artist declaration: facts about the submitted artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistDeclaration {
    /// Year the work was executed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_year: Option<i32>,
    /// Declared file format (e.g. "PNG", "TIFF")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_format: Option<String>,
}

/// Complete frozen declaration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub genesis: GenesisDeclaration,
    pub process: ProcessDeclaration,
    pub artist: ArtistDeclaration,
}

impl Declaration {
    /// All declared tool names usable for software-signature matching
    ///
    /// Combines the process software list with genesis AI tool names
    /// (engine and custom label both count).
    pub fn declared_tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.process.software.iter().map(String::as_str).collect();
        for tool in &self.genesis.ai_tools {
            names.extend(tool.matchable_names());
        }
        names
    }

    /// True when the declaration names no tools or software at all
    pub fn declares_no_tools(&self) -> bool {
        self.declared_tool_names().is_empty()
    }

    /// Canonical SHA-256 hash of the declaration (lowercase hex)
    ///
    /// Serialization goes through `serde_json::Value` so map keys are sorted;
    /// two submissions differing only in JSON key order hash identically.
    pub fn canonical_hash(&self) -> Result<String> {
        let value = serde_json::to_value(self)?;
        let canonical = serde_json::to_string(&value)?;
        let digest = Sha256::digest(canonical.as_bytes());
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Validate structural invariants of a submitted declaration
    pub fn validate(&self) -> Result<()> {
        if self.genesis.git_level > 5 {
            return Err(Error::InvalidInput(format!(
                "GIT level out of range: {}",
                self.genesis.git_level
            )));
        }
        Ok(())
    }
}
