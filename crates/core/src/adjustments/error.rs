//! Adjustment error types.

use finnorm_shared::AppError;
use finnorm_shared::types::{AdjustmentId, RowId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::rules::EbitdaComponent;

/// Adjustment validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdjustmentError {
    /// The industry has no template.
    #[error("Unknown industry '{0}'")]
    UnknownIndustry(String),

    /// An adjustment with this id already exists.
    #[error("Adjustment '{0}' already exists")]
    DuplicateId(AdjustmentId),

    /// The adjustment references a row that is not in the batch.
    #[error("Adjustment '{adjustment}' references unknown row '{row_id}'")]
    UnknownSourceRow {
        /// Adjustment id.
        adjustment: AdjustmentId,
        /// Missing row.
        row_id: RowId,
    },

    /// The referenced row does not aggregate into the adjustment's component.
    #[error(
        "Adjustment '{adjustment}' targets {expected} but row '{row_id}' aggregates into {actual}"
    )]
    ComponentMismatch {
        /// Adjustment id.
        adjustment: AdjustmentId,
        /// Source row.
        row_id: RowId,
        /// Component named by the adjustment.
        expected: EbitdaComponent,
        /// Component of the row, or "none" for balance sheet rows.
        actual: String,
    },

    /// Amount must be a positive magnitude.
    #[error("Adjustment '{adjustment}' has non-positive amount {amount}")]
    NonPositiveAmount {
        /// Adjustment id.
        adjustment: AdjustmentId,
        /// Offending amount.
        amount: Decimal,
    },

    /// The row does not have this much left to adjust.
    #[error(
        "Adjustment '{adjustment}' of {amount} exceeds the {available} left to adjust on row '{row_id}'"
    )]
    ExceedsRowAmount {
        /// Adjustment id.
        adjustment: AdjustmentId,
        /// Source row.
        row_id: RowId,
        /// Requested amount.
        amount: Decimal,
        /// Normalized row amount not yet taken by other adjustments.
        available: Decimal,
    },

    /// Reclassification without a distinct target component.
    #[error("Reclassification '{adjustment}' has no target distinct from its source component")]
    InvalidReclassificationTarget {
        /// Adjustment id.
        adjustment: AdjustmentId,
    },
}

impl AdjustmentError {
    /// Returns the error code for machine-readable output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownIndustry(_) => "UNKNOWN_INDUSTRY",
            Self::DuplicateId(_) => "DUPLICATE_ADJUSTMENT",
            Self::UnknownSourceRow { .. } => "UNKNOWN_SOURCE_ROW",
            Self::ComponentMismatch { .. } => "COMPONENT_MISMATCH",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::ExceedsRowAmount { .. } => "EXCEEDS_ROW_AMOUNT",
            Self::InvalidReclassificationTarget { .. } => "INVALID_RECLASSIFICATION_TARGET",
        }
    }
}

impl From<AdjustmentError> for AppError {
    fn from(err: AdjustmentError) -> Self {
        match err {
            AdjustmentError::UnknownIndustry(_) => Self::InvalidInput(err.to_string()),
            _ => Self::Adjustment(err.to_string()),
        }
    }
}
