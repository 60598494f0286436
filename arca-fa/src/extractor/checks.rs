//! Declaration comparison checks
//!
//! Pure functions from (declaration, extraction outcome) to technical
//! flags. Each check is independently optional: when the declared or
//! extracted side of a comparison is absent the check is skipped silently.
//! Absence of information never produces a flag, with the single exception
//! of `MetadataMissing` for an absent or unreadable file.

use arca_common::Declaration;
use std::collections::BTreeSet;
use tracing::debug;

use crate::types::{ExtractionOutcome, TechnicalFlag, TechnicalMetadataRecord};

/// Compute all technical flags for one extraction outcome
///
/// A failed extraction or an unidentifiable container short-circuits to
/// `MetadataMissing`; the comparison checks are then skipped entirely, not
/// run and ignored.
pub fn compute_flags(
    declaration: &Declaration,
    outcome: &ExtractionOutcome,
) -> BTreeSet<TechnicalFlag> {
    let mut flags = BTreeSet::new();

    if outcome.is_failure() || !outcome.metadata.has_identifiable_type() {
        flags.insert(TechnicalFlag::MetadataMissing);
        return flags;
    }

    let record = &outcome.metadata;

    if let Some(flag) = timeline_check(declaration, record) {
        flags.insert(flag);
    }
    flags.extend(software_signature_check(declaration, record));
    if let Some(flag) = format_check(declaration, record) {
        flags.insert(flag);
    }
    if let Some(flag) = export_chain_check(declaration, record) {
        flags.insert(flag);
    }

    debug!(count = flags.len(), ?flags, "Comparison checks complete");
    flags
}

/// Timeline check: embedded date year vs declared execution year
///
/// Only the first present date-like field (in priority order) is examined.
/// An unparseable date is ignored without a flag.
fn timeline_check(
    declaration: &Declaration,
    record: &TechnicalMetadataRecord,
) -> Option<TechnicalFlag> {
    let declared_year = declaration.artist.execution_year?;
    let raw_date = record.first_date_value()?;
    let embedded_year = parse_year(raw_date)?;

    if embedded_year != declared_year {
        debug!(declared_year, embedded_year, raw_date, "Timeline mismatch");
        return Some(TechnicalFlag::TimelineInconsistency);
    }
    None
}

/// Software-signature check: detected identities vs declared tools
///
/// With no declared tools at all, any detected signature is unknown by
/// definition. With declared tools, every detected signature must match at
/// least one of them.
fn software_signature_check(
    declaration: &Declaration,
    record: &TechnicalMetadataRecord,
) -> BTreeSet<TechnicalFlag> {
    let mut flags = BTreeSet::new();
    let signatures = record.software_identities();
    if signatures.is_empty() {
        return flags;
    }

    if declaration.declares_no_tools() {
        flags.insert(TechnicalFlag::SoftwareSignatureUnknown);
        return flags;
    }

    let declared = declaration.declared_tool_names();
    for (key, signature) in signatures {
        let matched = declared.iter().any(|tool| tool_matches(signature, tool));
        if !matched {
            debug!(key, signature, "Undeclared software signature");
            flags.insert(TechnicalFlag::UndeclaredSoftware);
        }
    }
    flags
}

/// Format check: detected file type vs declared format
///
/// Runs only when both sides exist.
fn format_check(
    declaration: &Declaration,
    record: &TechnicalMetadataRecord,
) -> Option<TechnicalFlag> {
    let declared = declaration.artist.file_format.as_deref()?;
    let detected = record.get_str("file_type")?;

    if !tool_matches(detected, declared) {
        debug!(declared, detected, "Format mismatch");
        return Some(TechnicalFlag::FormatVersionMismatch);
    }
    None
}

/// Export-chain check: declared multi-tool workflow vs a single exporter
///
/// Raised only when the declaration lists two or more software tools and
/// the record shows exactly one software-identity field — evidence of a
/// single exporter where a chain was declared. Never raised from mere
/// absence of software identities.
fn export_chain_check(
    declaration: &Declaration,
    record: &TechnicalMetadataRecord,
) -> Option<TechnicalFlag> {
    if declaration.process.software.len() < 2 {
        return None;
    }
    if record.software_identities().len() == 1 {
        return Some(TechnicalFlag::ExportChainBreak);
    }
    None
}

/// Bidirectional case-insensitive substring match
///
/// Deliberately loose: "midjourney-v6-export" matches a declared
/// "Midjourney" and vice versa. Known to over-match short tokens; a
/// stricter rule is a versioned behavior change.
pub fn tool_matches(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Extract a plausible year from a date-like string
///
/// Scans for the first run of digits whose leading four digits form a year
/// in 1000-2999. Handles EXIF ("2023:04:12 10:11:12"), ISO-8601, and PDF
/// ("D:20230412...") forms alike.
pub fn parse_year(raw: &str) -> Option<i32> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let run_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - run_start >= 4 {
                let year: i32 = raw[run_start..run_start + 4].parse().ok()?;
                if (1000..=2999).contains(&year) {
                    return Some(year);
                }
            }
        } else {
            i += 1;
        }
    }
    None
}
