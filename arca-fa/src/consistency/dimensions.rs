//! Dimension evaluators
//!
//! Four independent evaluators, each computed from a disjoint slice of
//! declaration plus evidence. A missing or malformed input never raises:
//! the dimension falls back to `Weak` when genuinely unclassifiable and to
//! `Consistent` when its precondition doesn't apply.

use arca_common::{Declaration, EvidenceItem, EvidenceManifest, PromisedEvidence};
use std::collections::BTreeSet;
use tracing::debug;

use super::expectations::Expectations;
use crate::extractor::checks::tool_matches;
use crate::types::{ConfidenceBand, ConsistencyVerdict, SignalResult, TechnicalFlag};

/// PROCESS: declared genesis process vs supplied evidence and AI signals
pub fn evaluate_process(
    expectations: Option<&Expectations>,
    manifest: &EvidenceManifest,
    signals: &SignalResult,
) -> ConsistencyVerdict {
    let Some(exp) = expectations else {
        // Unclassifiable declaration: degrade toward caution
        return ConsistencyVerdict::Weak;
    };

    let mut verdict = ConsistencyVerdict::Consistent;

    if exp.expects_source_files && !manifest.has_source_files {
        verdict = ConsistencyVerdict::Weak;
    }
    if exp.expects_process_evidence && !manifest.has_process_evidence {
        verdict = ConsistencyVerdict::Weak;
    }

    // Signal checks are independent of the evidence-presence checks above
    // and can escalate past a prior Weak.
    if exp.expects_no_ai_signals {
        if signals.confidence == ConfidenceBand::High && signals.aggregated_score > 0.7 {
            verdict = ConsistencyVerdict::Contradictory;
        } else if signals.confidence == ConfidenceBand::Medium && signals.aggregated_score > 0.6 {
            verdict = verdict.max(ConsistencyVerdict::Weak);
        }
    }
    if exp.expects_ai_signals
        && signals.confidence == ConfidenceBand::Low
        && signals.aggregated_score < 0.3
    {
        verdict = verdict.max(ConsistencyVerdict::Weak);
    }

    verdict
}

/// CONTROL: declared high human control vs iteration evidence and signals
pub fn evaluate_control(
    expectations: Option<&Expectations>,
    manifest: &EvidenceManifest,
    signals: &SignalResult,
) -> ConsistencyVerdict {
    let expects_high_control = expectations
        .map(|exp| exp.expects_high_control_evidence)
        .unwrap_or(false);
    if !expects_high_control {
        return ConsistencyVerdict::Consistent;
    }

    let mut verdict = ConsistencyVerdict::Consistent;

    if !manifest.has_control_evidence() {
        verdict = ConsistencyVerdict::Weak;
    }

    // A dominant AI signal contradicts claimed high human control
    // regardless of what iteration evidence was supplied.
    if signals.confidence == ConfidenceBand::High && signals.aggregated_score > 0.8 {
        verdict = ConsistencyVerdict::Contradictory;
    }

    verdict
}

/// TOOLING: detected software and model identifiers vs declared tools
pub fn evaluate_tooling(
    declaration: &Declaration,
    flags: &BTreeSet<TechnicalFlag>,
    signals: &SignalResult,
) -> ConsistencyVerdict {
    // Flag precedence: a record-level undeclared signature settles it.
    if flags.contains(&TechnicalFlag::UndeclaredSoftware) {
        return ConsistencyVerdict::Contradictory;
    }
    if flags.contains(&TechnicalFlag::SoftwareSignatureUnknown) {
        return ConsistencyVerdict::Weak;
    }

    let detected = detected_model_identifiers(signals);
    let declared = declaration.declared_tool_names();
    let undeclared = detected
        .iter()
        .filter(|identifier| !declared.iter().any(|tool| tool_matches(identifier, tool)))
        .count();

    debug!(
        detected = detected.len(),
        undeclared, "Tooling identifier comparison"
    );

    match undeclared {
        0 => ConsistencyVerdict::Consistent,
        1 => ConsistencyVerdict::Weak,
        _ => ConsistencyVerdict::Contradictory,
    }
}

/// Model identifiers reported by the detector panel
fn detected_model_identifiers(signals: &SignalResult) -> Vec<String> {
    let mut identifiers = Vec::new();
    for (_, signal) in signals.ai_signals.iter() {
        let Some(extra) = &signal.extra else { continue };
        let Some(models) = extra.get("matched_models").and_then(|v| v.as_array()) else {
            continue;
        };
        for model in models {
            if let Some(name) = model.as_str() {
                if !identifiers.iter().any(|existing: &String| existing == name) {
                    identifiers.push(name.to_string());
                }
            }
        }
    }
    identifiers
}

/// EVIDENCE_COMPLETENESS: promised evidence vs the supplied manifest
///
/// Returns the verdict plus per-item processing errors (malformed promised
/// items are isolated, recorded, and counted as unmatched — they never
/// abort the siblings).
pub fn evaluate_evidence_completeness(
    declaration: &Declaration,
    manifest: &EvidenceManifest,
) -> (ConsistencyVerdict, Vec<String>) {
    let promised = &declaration.process.promised_evidence;
    if promised.is_empty() {
        return (ConsistencyVerdict::Consistent, Vec::new());
    }

    let mut item_errors = Vec::new();
    let mut missing = 0usize;

    for (index, item) in promised.iter().enumerate() {
        let kind_blank = item.kind.trim().is_empty();
        let name_blank = item
            .name
            .as_deref()
            .map(|n| n.trim().is_empty())
            .unwrap_or(true);
        if kind_blank && name_blank {
            item_errors.push(format!(
                "promised evidence item {} has neither kind nor name",
                index
            ));
            missing += 1;
            continue;
        }

        let matched = manifest
            .items
            .iter()
            .any(|supplied| evidence_matches(item, supplied));
        if !matched {
            missing += 1;
        }
    }

    let verdict = if missing == promised.len() {
        ConsistencyVerdict::Contradictory
    } else if missing > 0 {
        ConsistencyVerdict::Weak
    } else {
        ConsistencyVerdict::Consistent
    };

    (verdict, item_errors)
}

/// Match a promised item to a supplied one by type or name substring
fn evidence_matches(promised: &PromisedEvidence, supplied: &EvidenceItem) -> bool {
    if tool_matches(&promised.kind, &supplied.kind) {
        return true;
    }
    if let Some(supplied_name) = supplied.name.as_deref() {
        if tool_matches(&promised.kind, supplied_name) {
            return true;
        }
    }
    if let Some(promised_name) = promised.name.as_deref() {
        if tool_matches(promised_name, &supplied.kind) {
            return true;
        }
        if let Some(supplied_name) = supplied.name.as_deref() {
            if tool_matches(promised_name, supplied_name) {
                return true;
            }
        }
    }
    false
}
