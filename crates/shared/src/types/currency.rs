//! ISO 4217 currency codes.
//!
//! Codes are validated on construction and normalized to upper case, so
//! `"usd"` and `"USD"` compare equal everywhere a rate is looked up.

use serde::{Deserialize, Serialize};

/// A three-letter ISO 4217 currency code (e.g., "USD", "IDR").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

/// Error returned when a string is not a valid currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid currency code: {0:?}")]
pub struct InvalidCurrencyCode(pub String);

impl CurrencyCode {
    /// Parses and normalizes a currency code.
    pub fn new(code: &str) -> Result<Self, InvalidCurrencyCode> {
        let trimmed = code.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidCurrencyCode(code.to_string()))
        }
    }

    /// US Dollar, the default base currency.
    #[must_use]
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = InvalidCurrencyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = InvalidCurrencyCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}
