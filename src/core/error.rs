//! Error taxonomy for document operations
//!
//! Engine operations fail fast with [`FmeaError`]. Whole-document rule checks
//! are collected into [`ValidationErrors`] so that every problem can be
//! reported at once.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::entity::{EntityKind, Relation};

pub type Result<T, E = FmeaError> = std::result::Result<T, E>;

/// Errors raised by the document engine, the assembler and the store
#[derive(Debug, Error, Diagnostic)]
pub enum FmeaError {
    #[error("{owner} lists {expected} {relation} code(s) but {found} resolved")]
    #[diagnostic(
        code(fmea::reference::count_mismatch),
        help("A dangling or duplicated code means the stored document is corrupt; fix it with `fmea validate`")
    )]
    ReferenceCountMismatch {
        owner: String,
        relation: Relation,
        expected: usize,
        found: usize,
    },

    #[error("Circular reference through {kind} {code}")]
    #[diagnostic(code(fmea::hierarchy::circular_reference))]
    CircularReference { kind: EntityKind, code: String },

    #[error("Cannot delete the root structure {0}")]
    #[diagnostic(code(fmea::hierarchy::cannot_delete_root))]
    CannotDeleteRoot(String),

    #[error("{kind} {code} has children and cannot be deleted")]
    #[diagnostic(
        code(fmea::hierarchy::has_children),
        help("Delete or move the children first")
    )]
    HasChildren { kind: EntityKind, code: String },

    #[error("Structure {0} has attached functions and cannot be deleted")]
    #[diagnostic(code(fmea::hierarchy::has_attached_functions))]
    HasAttachedFunctions(String),

    #[error("Function {0} has attached faults and cannot be deleted")]
    #[diagnostic(code(fmea::hierarchy::has_attached_faults))]
    HasAttachedFaults(String),

    #[error("No parent found for {kind} {code}")]
    #[diagnostic(code(fmea::hierarchy::parent_not_found))]
    ParentNotFound { kind: EntityKind, code: String },

    #[error("{kind} {code} not found")]
    #[diagnostic(code(fmea::hierarchy::not_found))]
    NotFound { kind: EntityKind, code: String },

    #[error("Code {0} is already in use")]
    #[diagnostic(code(fmea::hierarchy::duplicate_code))]
    DuplicateCode(String),

    #[error("{kind} {code} would sit at level {actual} but must be at level {expected}")]
    #[diagnostic(
        code(fmea::hierarchy::level_mismatch),
        help("A function or fault with a parent must sit exactly one level below it")
    )]
    LevelMismatch {
        kind: EntityKind,
        code: String,
        expected: u32,
        actual: u32,
    },

    #[error("Invalid {field}: {message}")]
    #[diagnostic(code(fmea::invalid_field))]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("Employee {0} is listed as both a core and an extended team member")]
    #[diagnostic(code(fmea::team::duplicate_member))]
    DuplicateTeamMember(String),

    #[error("Document {code} changed since it was loaded (expected generation {expected})")]
    #[diagnostic(
        code(fmea::store::conflict),
        help("Reload the document and apply the change again")
    )]
    Conflict { code: String, expected: u64 },

    #[error("Document {0} not found")]
    #[diagnostic(code(fmea::store::document_not_found))]
    DocumentNotFound(String),

    #[error("Database schema version {found} is not supported (expected {expected})")]
    #[diagnostic(code(fmea::store::schema_version))]
    UnsupportedSchema { found: i64, expected: i64 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FmeaError {
    pub fn not_found(kind: EntityKind, code: impl Into<String>) -> Self {
        FmeaError::NotFound {
            kind,
            code: code.into(),
        }
    }
}

/// All hierarchy rule violations found in a document
#[derive(Debug, Default, Error, Diagnostic)]
#[error("Document failed validation: {summary}")]
#[diagnostic(code(fmea::validation))]
pub struct ValidationErrors {
    summary: String,

    #[related]
    violations: Vec<Violation>,
}

/// A single hierarchy rule violation
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
pub struct Violation {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation
    pub fn push(&mut self, message: impl Into<String>, help: Option<&str>) {
        self.violations.push(Violation {
            message: message.into(),
            help: help.map(String::from),
        });
        let count = self.violations.len();
        self.summary = if count == 1 {
            "1 violation".to_string()
        } else {
            format!("{} violations", count)
        };
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Human-readable messages, one per violation
    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.message.as_str()).collect()
    }

    /// Turn a non-empty collection into an error
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FmeaError::Validation(self))
        }
    }
}
