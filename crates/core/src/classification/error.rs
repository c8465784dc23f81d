//! Classification error types.

use finnorm_shared::AppError;
use finnorm_shared::types::RowId;
use thiserror::Error;

/// Fatal classification errors. Unknown account types are not errors; they are
/// flagged for review.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassificationError {
    /// The requested industry has no template.
    #[error("Unknown industry '{0}'")]
    UnknownIndustry(String),

    /// A transaction has no row id.
    #[error("Transaction at position {position} has a blank row_id")]
    BlankRowId {
        /// Zero-based position in the batch.
        position: usize,
    },

    /// Two transactions share a row id.
    #[error("Duplicate row_id '{0}' in batch")]
    DuplicateRowId(RowId),
}

impl ClassificationError {
    /// Returns the error code for machine-readable output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownIndustry(_) => "UNKNOWN_INDUSTRY",
            Self::BlankRowId { .. } => "BLANK_ROW_ID",
            Self::DuplicateRowId(_) => "DUPLICATE_ROW_ID",
        }
    }
}

impl From<ClassificationError> for AppError {
    fn from(err: ClassificationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
