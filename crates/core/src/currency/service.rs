//! Currency conversion with Banker's Rounding.

use chrono::NaiveDate;
use finnorm_shared::types::CurrencyCode;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use super::exchange::RateLookup;

/// Currency service for conversion operations.
///
/// Provides methods for converting amounts between currencies using
/// Banker's Rounding (MidpointNearestEven) strategy.
pub struct CurrencyService;

impl CurrencyService {
    /// Convert amount using exchange rate with Banker's Rounding.
    ///
    /// Uses `RoundingStrategy::MidpointNearestEven` (Banker's Rounding) which:
    /// - Rounds 2.5 → 2 (to nearest even)
    /// - Rounds 3.5 → 4 (to nearest even)
    /// - Rounds 2.25 → 2.2 (to nearest even at 1 decimal)
    /// - Rounds 2.35 → 2.4 (to nearest even at 1 decimal)
    ///
    /// # Arguments
    ///
    /// * `amount` - The source amount to convert
    /// * `rate` - The exchange rate (1 source = rate target)
    ///
    /// # Returns
    ///
    /// The converted amount rounded to 4 decimal places using Banker's Rounding.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use finnorm_core::currency::CurrencyService;
    ///
    /// let result = CurrencyService::convert(dec!(100), dec!(1.5));
    /// assert_eq!(result, dec!(150.0000));
    /// ```
    #[must_use]
    pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
        (amount * rate).round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
    }

    /// Converts `amount` from `currency` into the lookup's base currency.
    ///
    /// Amounts already in `base` are returned unchanged without a lookup.
    /// Returns `None` when a rate is required but unavailable; callers decide
    /// how to fail, a missing rate is never treated as 1 or 0.
    pub fn convert_to_base<R>(
        amount: Decimal,
        currency: &CurrencyCode,
        base: &CurrencyCode,
        date: NaiveDate,
        rates: &R,
    ) -> Option<Decimal>
    where
        R: RateLookup + ?Sized,
    {
        if currency == base {
            return Some(amount);
        }
        rates
            .rate_to_base(currency, date)
            .map(|rate| Self::convert(amount, rate))
    }

    /// Round a decimal value using Banker's Rounding.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to round
    /// * `decimal_places` - Number of decimal places
    ///
    /// # Returns
    ///
    /// The rounded value using Banker's Rounding (MidpointNearestEven).
    #[must_use]
    pub fn round(value: Decimal, decimal_places: u32) -> Decimal {
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
    }
}
