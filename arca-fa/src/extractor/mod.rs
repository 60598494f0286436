//! Metadata Extractor (Stage 1)
//!
//! Fetches a submitted artifact, identifies its container from content,
//! extracts a flat technical-metadata record through the family reader, and
//! normalizes keys. The extractor never raises past its boundary: every
//! fetch/sniff/read failure becomes an empty record with an explicit
//! failure marker, so downstream stages always receive a well-formed
//! (possibly empty) record.
//!
//! Two entry points:
//! - `extract`: pure extraction (flags computed later by the caller)
//! - `analyze`: legacy combined mode — extraction plus comparison checks

pub mod checks;
pub mod fetch;
pub mod normalize;
pub mod readers;

use chrono::Utc;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use arca_common::Declaration;

use crate::config::AnalysisConfig;
use crate::types::{
    ExtractionOutcome, FileReference, MetadataAnalysis, MetadataValue, ReaderError,
    TechnicalFlag, TechnicalMetadataRecord,
};
use fetch::{FetchError, FileFetcher};

/// Version of the pure extraction output
pub const EXTRACTION_VERSION: &str = "1.4.0";

/// Version of the combined flagging output
pub const ANALYSIS_VERSION: &str = "2.1.0";

/// Internal extraction failure, absorbed at the extractor boundary
#[derive(Debug, Error)]
enum ExtractionFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Reader(#[from] ReaderError),
}

/// Technical-metadata extractor
pub struct MetadataExtractor {
    fetcher: FileFetcher,
}

impl MetadataExtractor {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            fetcher: FileFetcher::new(config),
        }
    }

    /// Extract the technical-metadata record for a file reference
    ///
    /// Never fails: a fetch or read problem yields an empty record with
    /// `extraction_error` set.
    pub async fn extract(&self, file_ref: &FileReference) -> ExtractionOutcome {
        match self.try_extract(file_ref).await {
            Ok(metadata) => {
                debug!(
                    fields = metadata.populated_field_count(),
                    export_chain = metadata.export_chain_detected,
                    "Extraction complete"
                );
                ExtractionOutcome {
                    metadata,
                    extraction_version: EXTRACTION_VERSION.to_string(),
                    extracted_at: Utc::now(),
                    extraction_error: None,
                }
            }
            Err(failure) => {
                warn!(file_ref = %file_ref, error = %failure, "Extraction failed");
                ExtractionOutcome {
                    metadata: TechnicalMetadataRecord::empty(),
                    extraction_version: EXTRACTION_VERSION.to_string(),
                    extracted_at: Utc::now(),
                    extraction_error: Some(failure.to_string()),
                }
            }
        }
    }

    async fn try_extract(
        &self,
        file_ref: &FileReference,
    ) -> Result<TechnicalMetadataRecord, ExtractionFailure> {
        let bytes = self.fetcher.fetch(file_ref).await?;
        Ok(read_record(&bytes)?)
    }

    /// Legacy combined mode: extraction plus the comparison checks
    ///
    /// An absent file reference short-circuits to `MetadataMissing`
    /// immediately; the checks are skipped entirely.
    pub async fn analyze(
        &self,
        case_id: Uuid,
        declaration: &Declaration,
        file_ref: Option<&FileReference>,
    ) -> MetadataAnalysis {
        let metadata_flags = match file_ref {
            None => {
                debug!(%case_id, "No file reference supplied");
                BTreeSet::from([TechnicalFlag::MetadataMissing])
            }
            Some(file_ref) => {
                let outcome = self.extract(file_ref).await;
                checks::compute_flags(declaration, &outcome)
            }
        };

        MetadataAnalysis {
            case_id,
            metadata_flags,
            analysis_version: ANALYSIS_VERSION.to_string(),
            generated_at: Utc::now(),
        }
    }
}

/// Sniff the container type and read a normalized record from bytes
///
/// Sniffing is content-based; the declared extension plays no part. An
/// unidentifiable container is not an error — the generic reader still
/// runs, and the record simply carries no `file_type`.
pub fn read_record(bytes: &[u8]) -> Result<TechnicalMetadataRecord, ReaderError> {
    let mut raw_entries: Vec<(String, MetadataValue)> = Vec::new();

    let reader = match infer::get(bytes) {
        Some(kind) => {
            raw_entries.push((
                "FileType".to_string(),
                MetadataValue::String(kind.extension().to_uppercase()),
            ));
            raw_entries.push((
                "MimeType".to_string(),
                MetadataValue::String(kind.mime_type().to_string()),
            ));
            readers::reader_for(kind.mime_type())
        }
        None => {
            debug!("Container type not identifiable from content");
            readers::reader_for("application/octet-stream")
        }
    };

    debug!(reader = reader.name(), "Dispatching container reader");
    raw_entries.extend(reader.read(bytes)?);

    Ok(TechnicalMetadataRecord::from_fields(normalize::normalize_entries(raw_entries)))
}
