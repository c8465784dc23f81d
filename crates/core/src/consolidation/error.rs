//! Consolidation error types.

use chrono::NaiveDate;
use finnorm_shared::AppError;
use finnorm_shared::types::{CurrencyCode, EntityId, RowId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Consolidation errors. All are fatal for the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsolidationError {
    /// The entity was already registered.
    #[error("Entity '{0}' is already registered")]
    DuplicateEntity(EntityId),

    /// A row belongs to a different entity than the one it was registered under.
    #[error("Row '{row_id}' belongs to entity '{found}', not '{entity}'")]
    EntityMismatch {
        /// Entity being registered.
        entity: EntityId,
        /// Offending row.
        row_id: RowId,
        /// Entity on the row.
        found: EntityId,
    },

    /// The same row id appears in two entities.
    #[error("Row '{row_id}' appears in more than one entity")]
    DuplicateRowId {
        /// Offending row.
        row_id: RowId,
    },

    /// An entity's rows do not net to zero.
    #[error("Entity '{entity}' does not reconcile: debits {debits}, credits {credits}")]
    Reconciliation {
        /// Entity.
        entity: EntityId,
        /// Total debits.
        debits: Decimal,
        /// Total credits.
        credits: Decimal,
    },

    /// No rate for a required conversion.
    #[error("No {currency} rate on {date} for row '{row_id}' of entity '{entity}'")]
    MissingRate {
        /// Entity.
        entity: EntityId,
        /// Row currency.
        currency: CurrencyCode,
        /// Row date.
        date: NaiveDate,
        /// Row.
        row_id: RowId,
    },
}

impl ConsolidationError {
    /// Returns the error code for machine-readable output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateEntity(_) => "DUPLICATE_ENTITY",
            Self::EntityMismatch { .. } => "ENTITY_MISMATCH",
            Self::DuplicateRowId { .. } => "DUPLICATE_ROW_ID",
            Self::Reconciliation { .. } => "RECONCILIATION_ERROR",
            Self::MissingRate { .. } => "MISSING_RATE",
        }
    }
}

impl From<ConsolidationError> for AppError {
    fn from(err: ConsolidationError) -> Self {
        match err {
            ConsolidationError::Reconciliation { .. } => Self::Reconciliation(err.to_string()),
            ConsolidationError::MissingRate { .. } => Self::MissingRate(err.to_string()),
            _ => Self::InvalidInput(err.to_string()),
        }
    }
}
