//! Error types for arca-fa
//!
//! Internal errors carry detail for tracing; anything surfaced to an end
//! user goes through `public_message()`, which is deliberately generic so
//! detection heuristics cannot be probed by scripting declarations against
//! error text.

use thiserror::Error;

use crate::store::StoreError;

/// Generic user-visible failure text
pub const PUBLIC_FAILURE_MESSAGE: &str = "technical analysis failed";

/// Top-level analysis error
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Required input is missing (no file reference, unknown case)
    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    /// Case store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Output serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Common error
    #[error("Common error: {0}")]
    Common(#[from] arca_common::Error),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Message safe to show outside the service boundary
    pub fn public_message(&self) -> &'static str {
        PUBLIC_FAILURE_MESSAGE
    }
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
