//! Consistency Engine (Stage 3)
//!
//! Normalizes the frozen declaration into technical expectations, evaluates
//! the four dimensions against the evidence, and folds them into one global
//! verdict by strict precedence. The output ranks agreement between claim
//! and evidence — it is not an authenticity verdict and carries no GIT or
//! confidence-grade value.

pub mod dimensions;
pub mod expectations;

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use uuid::Uuid;

use arca_common::{Declaration, EvidenceManifest};

use crate::types::{
    ConsistencyResult, ConsistencyVerdict, Dimension, SignalResult, TechnicalFlag,
};
use expectations::Expectations;

/// Version of the consistency engine output
pub const ENGINE_VERSION: &str = "3.0.0";

/// Full evaluation: per-dimension verdicts plus the folded global verdict
#[derive(Debug, Clone)]
pub struct ConsistencyEvaluation {
    pub dimensions: BTreeMap<Dimension, ConsistencyVerdict>,
    pub global: ConsistencyVerdict,
    /// Per-item evidence processing errors (isolated, non-fatal)
    pub item_errors: Vec<String>,
}

impl ConsistencyEvaluation {
    /// Dimensions whose verdict is not CONSISTENT, in evaluation order
    pub fn affected_dimensions(&self) -> Vec<Dimension> {
        Dimension::ALL
            .iter()
            .filter(|dim| {
                self.dimensions
                    .get(*dim)
                    .copied()
                    .unwrap_or(ConsistencyVerdict::Consistent)
                    != ConsistencyVerdict::Consistent
            })
            .copied()
            .collect()
    }

    /// Shape the evaluation into the externally consumed result record
    pub fn into_result(self, case_id: Uuid) -> ConsistencyResult {
        let affected_dimensions = self.affected_dimensions();
        ConsistencyResult {
            case_id,
            consistency_result: self.global,
            affected_dimensions,
            engine_version: ENGINE_VERSION.to_string(),
            evaluated_at: Utc::now(),
        }
    }
}

/// Fold dimension verdicts by precedence: CONTRADICTORY > WEAK > CONSISTENT
pub fn fold_verdicts<'a, I>(verdicts: I) -> ConsistencyVerdict
where
    I: IntoIterator<Item = &'a ConsistencyVerdict>,
{
    verdicts
        .into_iter()
        .copied()
        .max()
        .unwrap_or(ConsistencyVerdict::Consistent)
}

/// Declaration/evidence consistency engine
pub struct ConsistencyEngine;

impl ConsistencyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate all four dimensions and fold the global verdict
    pub fn evaluate(
        &self,
        declaration: &Declaration,
        metadata_flags: &BTreeSet<TechnicalFlag>,
        signals: &SignalResult,
        manifest: &EvidenceManifest,
    ) -> ConsistencyEvaluation {
        let exp = Expectations::from_declaration(declaration);
        if exp.is_none() {
            debug!(
                git_level = declaration.genesis.git_level,
                "Declaration outside the expectation table"
            );
        }

        let process = dimensions::evaluate_process(exp.as_ref(), manifest, signals);
        let control = dimensions::evaluate_control(exp.as_ref(), manifest, signals);
        let tooling = dimensions::evaluate_tooling(declaration, metadata_flags, signals);
        let (evidence, item_errors) =
            dimensions::evaluate_evidence_completeness(declaration, manifest);

        let mut verdicts = BTreeMap::new();
        verdicts.insert(Dimension::Process, process);
        verdicts.insert(Dimension::Control, control);
        verdicts.insert(Dimension::Tooling, tooling);
        verdicts.insert(Dimension::EvidenceCompleteness, evidence);

        let global = fold_verdicts(verdicts.values());

        debug!(
            ?process,
            ?control,
            ?tooling,
            ?evidence,
            ?global,
            "Consistency evaluation complete"
        );

        ConsistencyEvaluation {
            dimensions: verdicts,
            global,
            item_errors,
        }
    }
}

impl Default for ConsistencyEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arca_common::{
        ArtistDeclaration, GenesisDeclaration, ProcessDeclaration, PromisedEvidence,
    };
    use crate::signals::SIGNAL_VERSION;
    use crate::types::{ConfidenceBand, SignalBundle};

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

    fn signal_result(confidence: ConfidenceBand, aggregated_score: f64) -> SignalResult {
        SignalResult {
            ai_signals: SignalBundle::default(),
            aggregated_score,
            confidence,
            analysis_version: SIGNAL_VERSION.to_string(),
        }
    }

    #[test]
    fn test_fold_precedence_exhaustive() {
        // Every combination of four dimension verdicts must fold to
        // CONTRADICTORY iff one is present, else WEAK iff one is present.
        use ConsistencyVerdict::*;
        let all = [Consistent, Weak, Contradictory];
        for a in all {
            for b in all {
                for c in all {
                    for d in all {
                        let combo = [a, b, c, d];
                        let folded = fold_verdicts(combo.iter());
                        if combo.contains(&Contradictory) {
                            assert_eq!(folded, Contradictory, "{:?}", combo);
                        } else if combo.contains(&Weak) {
                            assert_eq!(folded, Weak, "{:?}", combo);
                        } else {
                            assert_eq!(folded, Consistent, "{:?}", combo);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_fold_of_nothing_is_consistent() {
        let none: [ConsistencyVerdict; 0] = [];
        assert_eq!(fold_verdicts(none.iter()), ConsistencyVerdict::Consistent);
    }

    #[test]
    fn test_scenario_git0_no_evidence_is_globally_weak() {
        // GIT 0, no process evidence, quiet signals → PROCESS weak
        let engine = ConsistencyEngine::new();
        let evaluation = engine.evaluate(
            &declaration(0),
            &BTreeSet::from([TechnicalFlag::MetadataMissing]),
            &signal_result(ConfidenceBand::Low, 0.0),
            &EvidenceManifest::default(),
        );

        assert_eq!(
            evaluation.dimensions[&Dimension::Process],
            ConsistencyVerdict::Weak
        );
        assert_eq!(evaluation.global, ConsistencyVerdict::Weak);
        assert_eq!(evaluation.affected_dimensions(), vec![Dimension::Process]);
    }

    #[test]
    fn test_scenario_git0_strong_ai_signal_is_contradictory() {
        let engine = ConsistencyEngine::new();
        let mut manifest = EvidenceManifest::default();
        manifest.has_source_files = true;
        manifest.has_process_evidence = true;

        let evaluation = engine.evaluate(
            &declaration(0),
            &BTreeSet::new(),
            &signal_result(ConfidenceBand::High, 0.85),
            &manifest,
        );

        assert_eq!(
            evaluation.dimensions[&Dimension::Process],
            ConsistencyVerdict::Contradictory
        );
        assert_eq!(evaluation.global, ConsistencyVerdict::Contradictory);
    }

    #[test]
    fn test_scenario_partial_evidence_is_weak() {
        // Promised two items, manifest supplies one
        let engine = ConsistencyEngine::new();
        let mut decl = declaration(3);
        decl.process.promised_evidence = vec![
            PromisedEvidence {
                kind: "sketch".to_string(),
                name: None,
            },
            PromisedEvidence {
                kind: "layered_psd".to_string(),
                name: None,
            },
        ];
        let manifest = EvidenceManifest {
            items: vec![arca_common::EvidenceItem {
                kind: "sketch".to_string(),
                name: None,
            }],
            ..EvidenceManifest::default()
        };

        let evaluation = engine.evaluate(
            &decl,
            &BTreeSet::new(),
            &signal_result(ConfidenceBand::Medium, 0.5),
            &manifest,
        );

        assert_eq!(
            evaluation.dimensions[&Dimension::EvidenceCompleteness],
            ConsistencyVerdict::Weak
        );
        assert_eq!(evaluation.global, ConsistencyVerdict::Weak);
        assert!(evaluation
            .affected_dimensions()
            .contains(&Dimension::EvidenceCompleteness));
    }

    #[test]
    fn test_into_result_shape() {
        let engine = ConsistencyEngine::new();
        let case_id = Uuid::new_v4();
        let evaluation = engine.evaluate(
            &declaration(3),
            &BTreeSet::new(),
            &signal_result(ConfidenceBand::Medium, 0.5),
            &EvidenceManifest::default(),
        );

        let result = evaluation.into_result(case_id);
        assert_eq!(result.case_id, case_id);
        assert_eq!(result.consistency_result, ConsistencyVerdict::Consistent);
        assert!(result.affected_dimensions.is_empty());
        assert_eq!(result.engine_version, ENGINE_VERSION);
    }

    #[test]
    fn test_out_of_table_declaration_degrades_to_weak() {
        let engine = ConsistencyEngine::new();
        let evaluation = engine.evaluate(
            &declaration(7),
            &BTreeSet::new(),
            &signal_result(ConfidenceBand::Low, 0.0),
            &EvidenceManifest::default(),
        );
        assert_eq!(
            evaluation.dimensions[&Dimension::Process],
            ConsistencyVerdict::Weak
        );
        // Other dimensions still evaluate normally
        assert_eq!(
            evaluation.dimensions[&Dimension::Tooling],
            ConsistencyVerdict::Consistent
        );
    }
}
