//! # ARCA Common Library
//!
//! Shared code for the ARCA analysis services including:
//! - Declaration document model (frozen, hash-addressed)
//! - Evidence manifest types
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod declaration;
pub mod error;
pub mod manifest;

pub use declaration::{
    ArtistDeclaration, ControlLevel, Declaration, DeclaredTool, GenesisDeclaration,
    ProcessDeclaration, PromisedEvidence,
};
pub use error::{Error, Result};
pub use manifest::{EvidenceItem, EvidenceManifest};
