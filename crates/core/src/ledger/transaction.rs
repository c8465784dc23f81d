//! Ledger transaction as delivered by ingestion.

use chrono::NaiveDate;
use finnorm_shared::types::{CurrencyCode, EntityId, RowId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trial-balance / general-ledger row.
///
/// Amounts follow the trial-balance sign convention: debits positive, credits
/// negative. The core normalizes signs itself; callers never pre-flip them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable row identity assigned at ingestion.
    pub row_id: RowId,
    /// Posting date.
    pub date: NaiveDate,
    /// Chart-of-accounts code.
    pub account_code: String,
    /// Free-text description or account name.
    pub description: String,
    /// Signed amount (debit positive, credit negative).
    pub signed_amount: Decimal,
    /// Legal entity that booked the row.
    pub entity_id: EntityId,
    /// Currency of `signed_amount`.
    pub currency: CurrencyCode,
}

impl Transaction {
    /// Returns a copy restated in another currency. The source row is untouched.
    #[must_use]
    pub fn restated(&self, signed_amount: Decimal, currency: CurrencyCode) -> Self {
        Self {
            signed_amount,
            currency,
            ..self.clone()
        }
    }
}
