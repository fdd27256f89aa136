//! Error types shared across the pipeline.
//!
//! Analysis itself never fails on data: malformed cells and sheets are
//! skipped. Errors only surface at the edges (loading a workbook) and when an
//! internal cross-reference invariant is broken.

use std::path::PathBuf;

/// Result type for workbook loading.
pub type WorkbookResult<T> = Result<T, WorkbookError>;

/// Errors raised while loading a workbook from its JSON interchange form.
#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("Workbook file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read workbook: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse workbook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate sheet name: {0}")]
    DuplicateSheet(String),
}

/// A record references an id that does not exist in the same context.
///
/// These are programming errors, not input errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{owner} references unknown entity '{entity_id}'")]
    DanglingEntity { owner: String, entity_id: String },

    #[error("decision '{decision_id}' references unknown gap '{gap_id}'")]
    DanglingGap { decision_id: String, gap_id: String },

    #[error("decision '{decision_id}' references unknown constraint '{constraint_id}'")]
    DanglingConstraint {
        decision_id: String,
        constraint_id: String,
    },
}
