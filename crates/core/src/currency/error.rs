//! Currency error types.

use chrono::NaiveDate;
use finnorm_shared::types::CurrencyCode;
use thiserror::Error;

/// Errors building a rate table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    /// A quoted rate is zero or negative.
    #[error("Exchange rate {from}->{to} on {date} must be positive")]
    NonPositiveRate {
        /// Source currency.
        from: CurrencyCode,
        /// Target currency.
        to: CurrencyCode,
        /// Effective date.
        date: NaiveDate,
    },

    /// A quoted rate does not involve the base currency.
    #[error("Exchange rate {from}->{to} does not involve base currency {base}")]
    UnrelatedRate {
        /// Source currency.
        from: CurrencyCode,
        /// Target currency.
        to: CurrencyCode,
        /// Base currency of the table.
        base: CurrencyCode,
    },
}

impl From<CurrencyError> for finnorm_shared::AppError {
    fn from(err: CurrencyError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
