//! Core Types and Trait Definitions for ARCA-FA
//!
//! Defines the data contracts between the three pipeline stages:
//! - **Stage 1:** Metadata extraction (ContainerReader implementations)
//! - **Stage 2:** Signal aggregation (Detector panel)
//! - **Stage 3:** Consistency evaluation (dimension evaluators)
//!
//! Every output type here is advisory data for a human reviewer. None of
//! them carries a GIT level, a confidence grade, or a validity flag — those
//! determinations live entirely outside this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// File references
// ============================================================================

/// Locator for a submitted artifact
///
/// Remote URLs are resolved by the bounded fetcher; local paths are read
/// directly (used by the one-shot binary and tests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileReference {
    Url(String),
    Local(PathBuf),
}

impl FileReference {
    /// Interpret a CLI argument: anything with a URL scheme is remote,
    /// everything else is a local path.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::Local(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for FileReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

// ============================================================================
// Technical metadata record
// ============================================================================

/// Canonical software-identity field names
///
/// A record with two or more of these present is treated as carrying an
/// export chain (the file passed through more than one tool).
pub const SOFTWARE_IDENTITY_KEYS: [&str; 4] = [
    "software",
    "creator_tool",
    "application",
    "processing_software",
];

/// Date-like canonical keys in timeline-check priority order
pub const DATE_KEY_PRIORITY: [&str; 4] = [
    "date_time_original",
    "create_date",
    "metadata_date",
    "modify_date",
];

/// Scalar or nested value extracted from a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
    /// String view of this value, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True for values that carry no information (empty string/list/map)
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Flat technical-metadata record for one submitted file
///
/// Keys are normalized (lowercase, non-alphanumeric runs collapsed to `_`);
/// well-known fields sit under stable canonical keys, unknown fields pass
/// through with a derived key. Recomputed per analysis call, persisted
/// verbatim by the external store, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalMetadataRecord {
    /// Normalized field name → value
    pub fields: BTreeMap<String, MetadataValue>,
    /// Two or more distinct software-identity fields are present
    pub export_chain_detected: bool,
}

impl TechnicalMetadataRecord {
    /// Empty record (extraction failure fallback)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a record from normalized entries and derive the export chain
    pub fn from_fields(fields: BTreeMap<String, MetadataValue>) -> Self {
        let export_chain_detected = Self::count_software_fields(&fields) >= 2;
        Self {
            fields,
            export_chain_detected,
        }
    }

    fn count_software_fields(fields: &BTreeMap<String, MetadataValue>) -> usize {
        SOFTWARE_IDENTITY_KEYS
            .iter()
            .filter(|key| fields.get(**key).map(|v| !v.is_empty()).unwrap_or(false))
            .count()
    }

    /// String value under a canonical key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(MetadataValue::as_str)
    }

    /// Present software-identity values as (canonical key, value) pairs
    pub fn software_identities(&self) -> Vec<(&'static str, &str)> {
        SOFTWARE_IDENTITY_KEYS
            .iter()
            .filter_map(|key| self.get_str(key).map(|v| (*key, v)))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect()
    }

    /// First present date-like value in priority order
    pub fn first_date_value(&self) -> Option<&str> {
        DATE_KEY_PRIORITY.iter().find_map(|key| self.get_str(key))
    }

    /// Number of fields carrying a non-empty value
    pub fn populated_field_count(&self) -> usize {
        self.fields.values().filter(|v| !v.is_empty()).count()
    }

    /// True when the container type could be identified from content
    pub fn has_identifiable_type(&self) -> bool {
        self.get_str("file_type").is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// Technical flags
// ============================================================================

/// Discrete technical observation raised by the metadata analysis
///
/// Flags are facts, never weights: each one names an objectively checkable
/// mismatch between the declaration and the extracted record. The set is
/// closed; matching on it is exhaustive by construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TechnicalFlag {
    /// No file, unidentifiable container, or failed extraction
    MetadataMissing,
    /// Detected software signature matches no declared tool
    UndeclaredSoftware,
    /// Embedded date year contradicts the declared execution year
    TimelineInconsistency,
    /// Detected file type contradicts the declared format
    FormatVersionMismatch,
    /// Software signature present but the declaration names no tools
    SoftwareSignatureUnknown,
    /// Declared multi-tool workflow with a single-exporter record
    ExportChainBreak,
}

// ============================================================================
// Signals
// ============================================================================

/// Single detector output: a score with its reliability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Detector score (0.0-1.0)
    pub score: f64,
    /// Reliability of this detector's score (0.0-1.0)
    pub reliability: f64,
    /// Detector-specific detail (e.g. matched model labels)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl Signal {
    /// Create a signal with both values clamped to [0.0, 1.0]
    pub fn new(score: f64, reliability: f64) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            reliability: reliability.clamp(0.0, 1.0),
            extra: None,
        }
    }

    /// Attach detector-specific detail
    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// Fixed-key mapping from detector name to its signal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalBundle(pub BTreeMap<String, Signal>);

impl SignalBundle {
    pub fn insert(&mut self, name: impl Into<String>, signal: Signal) {
        self.0.insert(name.into(), signal);
    }

    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Signal)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Present detector scores in detector-name order
    pub fn scores(&self) -> Vec<f64> {
        self.0.values().map(|s| s.score).collect()
    }

    /// Present detector reliabilities in detector-name order
    pub fn reliabilities(&self) -> Vec<f64> {
        self.0.values().map(|s| s.reliability).collect()
    }
}

/// Discrete confidence band for an aggregated signal score
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

// ============================================================================
// Consistency verdicts
// ============================================================================

/// Per-dimension and global consistency verdict
///
/// Variant order carries the precedence rule: `Contradictory` outranks
/// `Weak` outranks `Consistent`, so the global verdict is the `max` of the
/// dimension verdicts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsistencyVerdict {
    Consistent,
    Weak,
    Contradictory,
}

/// Independent axis of declaration/evidence comparison
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Process,
    Control,
    Tooling,
    EvidenceCompleteness,
}

impl Dimension {
    /// All dimensions in evaluation order
    pub const ALL: [Dimension; 4] = [
        Dimension::Process,
        Dimension::Control,
        Dimension::Tooling,
        Dimension::EvidenceCompleteness,
    ];
}

// ============================================================================
// Stage outputs (externally consumed, JSON-serializable)
// ============================================================================

/// Pure extraction result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub metadata: TechnicalMetadataRecord,
    pub extraction_version: String,
    pub extracted_at: DateTime<Utc>,
    /// Present when fetch/sniff/read failed; the record is then empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

impl ExtractionOutcome {
    pub fn is_failure(&self) -> bool {
        self.extraction_error.is_some()
    }
}

/// Combined flagging result (legacy analyze mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataAnalysis {
    pub case_id: Uuid,
    pub metadata_flags: BTreeSet<TechnicalFlag>,
    pub analysis_version: String,
    pub generated_at: DateTime<Utc>,
}

/// Aggregated signal result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResult {
    pub ai_signals: SignalBundle,
    pub aggregated_score: f64,
    pub confidence: ConfidenceBand,
    pub analysis_version: String,
}

/// Global consistency result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyResult {
    pub case_id: Uuid,
    pub consistency_result: ConsistencyVerdict,
    /// Dimensions whose verdict is not CONSISTENT, in evaluation order
    pub affected_dimensions: Vec<Dimension>,
    pub engine_version: String,
    pub evaluated_at: DateTime<Utc>,
}

// ============================================================================
// Stage 1: Container reader seam
// ============================================================================

/// Container-format reader: bytes in, raw key/value pairs out
///
/// Readers are best-effort by contract — a reader either produces a flat
/// record (raw keys, normalized later) or fails, and the extractor absorbs
/// the failure. Readers never see the declaration.
pub trait ContainerReader: Send + Sync {
    /// Reader name for provenance tracking
    fn name(&self) -> &'static str;

    /// Read raw metadata entries from the artifact bytes
    fn read(&self, bytes: &[u8]) -> Result<Vec<(String, MetadataValue)>, ReaderError>;
}

/// Container reader error
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Container structure is damaged or truncated
    #[error("Malformed container: {0}")]
    Malformed(String),

    /// Reader cannot handle this container
    #[error("Unsupported container: {0}")]
    Unsupported(String),
}

// ============================================================================
// Stage 2: Detector seam
// ============================================================================

/// Technical detector: pure function of the metadata record
///
/// Detectors are infallible — degenerate input yields a low-score,
/// low-reliability signal, never an error. The current panel is simulated;
/// production detectors substitute behind this trait without touching
/// aggregation or banding.
pub trait Detector: Send + Sync {
    /// Detector name (key in the signal bundle)
    fn name(&self) -> &'static str;

    /// Compute this detector's signal for the record
    fn detect(&self, record: &TechnicalMetadataRecord) -> Signal;
}

// ============================================================================
// Tests
// ============================================================================
