//! Case record store interface
//!
//! The durable backend is owned by the case-management service; this module
//! defines the contract the pipeline writes through, plus an in-memory
//! reference implementation used by the one-shot binary and tests.
//!
//! Discipline: declarations are content-addressed and write-once (a
//! duplicate submission is an expected outcome, not an error); analysis
//! records are append-only per case and never mutated.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

use arca_common::Declaration;

/// Store error
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (I/O, lock, connection)
    #[error("Store backend error: {0}")]
    Backend(String),

    /// Requested entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Outcome of a write-once declaration put
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Declaration stored under its hash
    Stored,
    /// Identical declaration already present — expected, not exceptional
    Duplicate,
}

/// One appended analysis record
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub kind: String,
    pub payload: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only case record store
pub trait CaseStore: Send + Sync {
    /// Write-once declaration storage keyed by canonical hash
    fn put_declaration(
        &self,
        hash: &str,
        declaration: &Declaration,
    ) -> Result<WriteOutcome, StoreError>;

    /// Fetch a declaration by canonical hash
    fn get_declaration(&self, hash: &str) -> Result<Option<Declaration>, StoreError>;

    /// Append an analysis record for a case
    fn append_record(
        &self,
        case_id: Uuid,
        kind: &str,
        payload: serde_json::Value,
    ) -> Result<(), StoreError>;

    /// All records appended for a case, in append order
    fn records_for(&self, case_id: Uuid) -> Result<Vec<StoredRecord>, StoreError>;
}

/// In-memory reference implementation
#[derive(Default)]
pub struct MemoryCaseStore {
    declarations: RwLock<HashMap<String, Declaration>>,
    records: RwLock<HashMap<Uuid, Vec<StoredRecord>>>,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaseStore for MemoryCaseStore {
    fn put_declaration(
        &self,
        hash: &str,
        declaration: &Declaration,
    ) -> Result<WriteOutcome, StoreError> {
        let mut declarations = self
            .declarations
            .write()
            .map_err(|_| StoreError::Backend("declaration lock poisoned".to_string()))?;

        if declarations.contains_key(hash) {
            return Ok(WriteOutcome::Duplicate);
        }
        declarations.insert(hash.to_string(), declaration.clone());
        Ok(WriteOutcome::Stored)
    }

    fn get_declaration(&self, hash: &str) -> Result<Option<Declaration>, StoreError> {
        let declarations = self
            .declarations
            .read()
            .map_err(|_| StoreError::Backend("declaration lock poisoned".to_string()))?;
        Ok(declarations.get(hash).cloned())
    }

    fn append_record(
        &self,
        case_id: Uuid,
        kind: &str,
        payload: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Backend("record lock poisoned".to_string()))?;

        records.entry(case_id).or_default().push(StoredRecord {
            kind: kind.to_string(),
            payload,
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    fn records_for(&self, case_id: Uuid) -> Result<Vec<StoredRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Backend("record lock poisoned".to_string()))?;
        Ok(records.get(&case_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arca_common::{ArtistDeclaration, GenesisDeclaration, ProcessDeclaration};
    use serde_json::json;

    fn declaration() -> Declaration {
        Declaration {
            genesis: GenesisDeclaration {
                git_level: 1,
                ai_tools: vec![],
            },
            process: ProcessDeclaration {
                software: vec!["Krita".to_string()],
                no_ai_in_final: true,
                promised_evidence: vec![],
                human_control: None,
            },
            artist: ArtistDeclaration {
                execution_year: Some(2025),
                file_format: Some("PNG".to_string()),
            },
        }
    }

    #[test]
    fn test_put_declaration_is_write_once() {
        let store = MemoryCaseStore::new();
        let decl = declaration();
        let hash = decl.canonical_hash().unwrap();

        assert_eq!(
            store.put_declaration(&hash, &decl).unwrap(),
            WriteOutcome::Stored
        );
        assert_eq!(
            store.put_declaration(&hash, &decl).unwrap(),
            WriteOutcome::Duplicate
        );
        assert_eq!(store.get_declaration(&hash).unwrap(), Some(decl));
    }

    #[test]
    fn test_append_records_preserves_order() {
        let store = MemoryCaseStore::new();
        let case_id = Uuid::new_v4();

        store
            .append_record(case_id, "extraction", json!({"n": 1}))
            .unwrap();
        store
            .append_record(case_id, "signals", json!({"n": 2}))
            .unwrap();

        let records = store.records_for(case_id).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, "extraction");
        assert_eq!(records[1].kind, "signals");
    }

    #[test]
    fn test_records_for_unknown_case_is_empty() {
        let store = MemoryCaseStore::new();
        assert!(store.records_for(Uuid::new_v4()).unwrap().is_empty());
    }
}
