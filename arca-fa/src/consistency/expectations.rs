//! Declaration normalization into technical expectations
//!
//! The GIT-level table is fixed and immutable: for each declared level it
//! states whether source files and process evidence are required, and what
//! AI presence in the final artifact should look like. Expectation booleans
//! are deterministic functions of this table plus the declaration's own
//! flags — the technical evidence never influences them.

use arca_common::{ControlLevel, Declaration};

/// How strongly a kind of evidence is expected at a GIT level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementLevel {
    Required,
    Expected,
    Optional,
    NotExpected,
}

/// Expected AI presence in the final artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiPresence {
    ExpectedAbsent,
    PartiallyAllowed,
    ExpectedPresent,
}

/// One row of the GIT expectation table
#[derive(Debug, Clone, Copy)]
pub struct GitExpectation {
    pub source_files: RequirementLevel,
    pub process_evidence: RequirementLevel,
    pub ai_presence: AiPresence,
}

/// Fixed expectation table for GIT levels 0-5
pub const GIT_EXPECTATIONS: [GitExpectation; 6] = [
    // Level 0: fully manual, fully evidenced
    GitExpectation {
        source_files: RequirementLevel::Required,
        process_evidence: RequirementLevel::Required,
        ai_presence: AiPresence::ExpectedAbsent,
    },
    // Level 1
    GitExpectation {
        source_files: RequirementLevel::Required,
        process_evidence: RequirementLevel::Expected,
        ai_presence: AiPresence::ExpectedAbsent,
    },
    // Level 2
    GitExpectation {
        source_files: RequirementLevel::Expected,
        process_evidence: RequirementLevel::Optional,
        ai_presence: AiPresence::ExpectedAbsent,
    },
    // Level 3
    GitExpectation {
        source_files: RequirementLevel::Optional,
        process_evidence: RequirementLevel::Optional,
        ai_presence: AiPresence::PartiallyAllowed,
    },
    // Level 4
    GitExpectation {
        source_files: RequirementLevel::NotExpected,
        process_evidence: RequirementLevel::Optional,
        ai_presence: AiPresence::ExpectedPresent,
    },
    // Level 5: fully generated
    GitExpectation {
        source_files: RequirementLevel::NotExpected,
        process_evidence: RequirementLevel::NotExpected,
        ai_presence: AiPresence::ExpectedPresent,
    },
];

/// Table row for a declared level, `None` when out of range
pub fn for_level(level: u8) -> Option<&'static GitExpectation> {
    GIT_EXPECTATIONS.get(level as usize)
}

/// Normalized technical expectations for one declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectations {
    pub expects_no_ai_signals: bool,
    pub expects_ai_signals: bool,
    pub expects_source_files: bool,
    pub expects_process_evidence: bool,
    pub expects_high_control_evidence: bool,
}

impl Expectations {
    /// Derive expectations from a declaration
    ///
    /// Returns `None` when the declared GIT level is outside the table;
    /// callers degrade the affected dimension toward caution.
    pub fn from_declaration(declaration: &Declaration) -> Option<Self> {
        let row = for_level(declaration.genesis.git_level)?;

        Some(Self {
            expects_no_ai_signals: row.ai_presence == AiPresence::ExpectedAbsent
                || declaration.process.no_ai_in_final,
            expects_ai_signals: row.ai_presence != AiPresence::ExpectedAbsent,
            expects_source_files: row.source_files == RequirementLevel::Required,
            expects_process_evidence: row.process_evidence == RequirementLevel::Required,
            expects_high_control_evidence: declaration.process.human_control
                == Some(ControlLevel::High),
        })
    }
}
