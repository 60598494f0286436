//! Pipeline orchestrator
//!
//! Composes the three stages as ordinary in-process function calls:
//! extraction → flagging → signal aggregation → consistency evaluation.
//! Stages for different cases share nothing mutable; within one case the
//! order is a hard dependency. Persistence runs through the `CaseStore`
//! trait, but a store failure never invalidates the computed in-memory
//! result — downstream retries persistence, not recomputation.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use arca_common::{Declaration, EvidenceManifest};

use crate::config::AnalysisConfig;
use crate::consistency::ConsistencyEngine;
use crate::error::AnalysisResult;
use crate::extractor::{checks, MetadataExtractor, ANALYSIS_VERSION};
use crate::signals::SignalPanel;
use crate::store::{CaseStore, WriteOutcome};
use crate::types::{
    ConsistencyResult, ExtractionOutcome, FileReference, MetadataAnalysis, SignalResult,
    TechnicalFlag, TechnicalMetadataRecord,
};

/// Complete per-case pipeline output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseAnalysis {
    pub case_id: Uuid,
    /// Canonical declaration hash, when hashing succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration_hash: Option<String>,
    /// Pure extraction result (absent when no file reference was supplied)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionOutcome>,
    pub metadata_analysis: MetadataAnalysis,
    pub signals: SignalResult,
    pub consistency: ConsistencyResult,
    /// Per-item evidence processing errors (isolated, non-fatal)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_errors: Vec<String>,
}

/// Four-stage forensic analysis pipeline
pub struct Pipeline {
    extractor: MetadataExtractor,
    panel: SignalPanel,
    engine: ConsistencyEngine,
    store: Option<Arc<dyn CaseStore>>,
}

impl Pipeline {
    /// Pipeline with the standard detector panel and no store
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            extractor: MetadataExtractor::new(config),
            panel: SignalPanel::standard(),
            engine: ConsistencyEngine::new(),
            store: None,
        }
    }

    /// Attach a case store for record persistence
    pub fn with_store(mut self, store: Arc<dyn CaseStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Substitute the detector panel (tests inject deterministic fakes)
    pub fn with_panel(mut self, panel: SignalPanel) -> Self {
        self.panel = panel;
        self
    }

    /// Run the full pipeline for one case
    ///
    /// Each stage is a pure function of its declared inputs; re-running
    /// produces a new, independent record set rather than mutating an old
    /// one.
    pub async fn run_case(
        &self,
        case_id: Uuid,
        declaration: &Declaration,
        file_ref: Option<&FileReference>,
        manifest: &EvidenceManifest,
    ) -> AnalysisResult<CaseAnalysis> {
        info!(%case_id, has_file = file_ref.is_some(), "Pipeline starting");

        let declaration_hash = self.record_declaration(declaration);

        // Stage 1: extraction + flagging
        let (extraction, metadata_flags) = match file_ref {
            Some(file_ref) => {
                let outcome = self.extractor.extract(file_ref).await;
                let flags = checks::compute_flags(declaration, &outcome);
                (Some(outcome), flags)
            }
            None => {
                debug!(%case_id, "No file reference; skipping extraction");
                (None, BTreeSet::from([TechnicalFlag::MetadataMissing]))
            }
        };

        let metadata_analysis = MetadataAnalysis {
            case_id,
            metadata_flags,
            analysis_version: ANALYSIS_VERSION.to_string(),
            generated_at: Utc::now(),
        };

        // Stage 2: signal aggregation over the extracted record (an empty
        // record when extraction was skipped or failed)
        let empty_record = TechnicalMetadataRecord::empty();
        let record = extraction
            .as_ref()
            .map(|outcome| &outcome.metadata)
            .unwrap_or(&empty_record);
        let signals = self.panel.run(record);

        // Stage 3: consistency evaluation
        let evaluation = self.engine.evaluate(
            declaration,
            &metadata_analysis.metadata_flags,
            &signals,
            manifest,
        );
        let item_errors = evaluation.item_errors.clone();
        let consistency = evaluation.into_result(case_id);

        let analysis = CaseAnalysis {
            case_id,
            declaration_hash,
            extraction,
            metadata_analysis,
            signals,
            consistency,
            item_errors,
        };

        self.persist(&analysis);

        info!(
            %case_id,
            verdict = ?analysis.consistency.consistency_result,
            confidence = ?analysis.signals.confidence,
            "Pipeline complete"
        );

        Ok(analysis)
    }

    /// Content-addressed, write-once declaration storage
    fn record_declaration(&self, declaration: &Declaration) -> Option<String> {
        let hash = match declaration.canonical_hash() {
            Ok(hash) => hash,
            Err(e) => {
                warn!(error = %e, "Declaration hashing failed");
                return None;
            }
        };

        if let Some(store) = &self.store {
            match store.put_declaration(&hash, declaration) {
                Ok(WriteOutcome::Stored) => debug!(hash = %hash, "Declaration stored"),
                Ok(WriteOutcome::Duplicate) => {
                    // Expected for re-runs of the same case
                    debug!(hash = %hash, "Declaration already stored")
                }
                Err(e) => warn!(error = %e, "Declaration persistence failed"),
            }
        }

        Some(hash)
    }

    /// Append stage records; failures are logged, never propagated
    fn persist(&self, analysis: &CaseAnalysis) {
        let Some(store) = &self.store else { return };

        let records: [(&str, Result<serde_json::Value, serde_json::Error>); 4] = [
            ("extraction", serde_json::to_value(&analysis.extraction)),
            (
                "metadata_analysis",
                serde_json::to_value(&analysis.metadata_analysis),
            ),
            ("signals", serde_json::to_value(&analysis.signals)),
            ("consistency", serde_json::to_value(&analysis.consistency)),
        ];

        for (kind, payload) in records {
            let payload = match payload {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(kind, error = %e, "Record serialization failed");
                    continue;
                }
            };
            if let Err(e) = store.append_record(analysis.case_id, kind, payload) {
                // The computed result is still returned to the invoker;
                // persistence is retried downstream.
                warn!(kind, error = %e, "Record persistence failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCaseStore, StoreError, StoredRecord};
    use crate::types::{ConfidenceBand, ConsistencyVerdict};
    use arca_common::{ArtistDeclaration, GenesisDeclaration, ProcessDeclaration};

    fn declaration(git_level: u8) -> Declaration {
        Declaration {
            genesis: GenesisDeclaration {
                git_level,
                ai_tools: vec![],
            },
            process: ProcessDeclaration {
                software: vec![],
                no_ai_in_final: false,
                promised_evidence: vec![],
                human_control: None,
            },
            artist: ArtistDeclaration {
                execution_year: None,
                file_format: None,
            },
        }
    }

    #[tokio::test]
    async fn test_no_file_short_circuits_and_still_evaluates() {
        let pipeline = Pipeline::new(&AnalysisConfig::default());
        let analysis = pipeline
            .run_case(
                Uuid::new_v4(),
                &declaration(0),
                None,
                &EvidenceManifest::default(),
            )
            .await
            .unwrap();

        assert!(analysis.extraction.is_none());
        assert!(analysis
            .metadata_analysis
            .metadata_flags
            .contains(&TechnicalFlag::MetadataMissing));
        // Empty record: detectors degrade, banding is Low
        assert_eq!(analysis.signals.confidence, ConfidenceBand::Low);
        // GIT 0 with no evidence: PROCESS weak, global weak
        assert_eq!(
            analysis.consistency.consistency_result,
            ConsistencyVerdict::Weak
        );
    }

    #[tokio::test]
    async fn test_pipeline_persists_all_stage_records() {
        let store = Arc::new(MemoryCaseStore::new());
        let pipeline =
            Pipeline::new(&AnalysisConfig::default()).with_store(store.clone());
        let case_id = Uuid::new_v4();

        pipeline
            .run_case(case_id, &declaration(2), None, &EvidenceManifest::default())
            .await
            .unwrap();

        let kinds: Vec<String> = store
            .records_for(case_id)
            .unwrap()
            .into_iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(
            kinds,
            vec!["extraction", "metadata_analysis", "signals", "consistency"]
        );
    }

    #[tokio::test]
    async fn test_store_failure_does_not_invalidate_result() {
        /// Store whose appends always fail
        struct FailingStore;

        impl CaseStore for FailingStore {
            fn put_declaration(
                &self,
                _hash: &str,
                _declaration: &Declaration,
            ) -> Result<WriteOutcome, StoreError> {
                Err(StoreError::Backend("down".to_string()))
            }

            fn get_declaration(
                &self,
                _hash: &str,
            ) -> Result<Option<Declaration>, StoreError> {
                Err(StoreError::Backend("down".to_string()))
            }

            fn append_record(
                &self,
                _case_id: Uuid,
                _kind: &str,
                _payload: serde_json::Value,
            ) -> Result<(), StoreError> {
                Err(StoreError::Backend("down".to_string()))
            }

            fn records_for(&self, _case_id: Uuid) -> Result<Vec<StoredRecord>, StoreError> {
                Err(StoreError::Backend("down".to_string()))
            }
        }

        let pipeline =
            Pipeline::new(&AnalysisConfig::default()).with_store(Arc::new(FailingStore));
        let result = pipeline
            .run_case(
                Uuid::new_v4(),
                &declaration(2),
                None,
                &EvidenceManifest::default(),
            )
            .await;

        // The computed output is returned despite every write failing
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rerun_appends_independent_records() {
        let store = Arc::new(MemoryCaseStore::new());
        let pipeline =
            Pipeline::new(&AnalysisConfig::default()).with_store(store.clone());
        let case_id = Uuid::new_v4();
        let decl = declaration(2);

        pipeline
            .run_case(case_id, &decl, None, &EvidenceManifest::default())
            .await
            .unwrap();
        pipeline
            .run_case(case_id, &decl, None, &EvidenceManifest::default())
            .await
            .unwrap();

        // Append-only: two full record sets, nothing overwritten
        assert_eq!(store.records_for(case_id).unwrap().len(), 8);

        // Same declaration content-addresses to the same hash (duplicate
        // put is the expected outcome, not an error)
        let hash = decl.canonical_hash().unwrap();
        assert!(store.get_declaration(&hash).unwrap().is_some());
    }
}
