//! Exchange rates and the rate lookup seam.
//!
//! The core never sources rates. Callers inject a [`RateLookup`]: either a
//! [`RateTable`] built from quoted rates, or any closure with the same shape.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use finnorm_shared::types::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CurrencyError;

/// Exchange rate between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency code.
    pub from_currency: CurrencyCode,
    /// Target currency code.
    pub to_currency: CurrencyCode,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
    /// Date this rate is effective.
    pub effective_date: NaiveDate,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    #[must_use]
    pub const fn new(
        from_currency: CurrencyCode,
        to_currency: CurrencyCode,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            from_currency,
            to_currency,
            rate,
            effective_date,
        }
    }

    /// Returns the inverse rate, or `None` for a zero rate.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        (!self.rate.is_zero()).then(|| Self {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate: Decimal::ONE / self.rate,
            effective_date: self.effective_date,
        })
    }
}

/// Rate from a currency into the reporting currency on a date.
pub trait RateLookup {
    /// Returns the rate (1 `currency` = rate base units), if known.
    fn rate_to_base(&self, currency: &CurrencyCode, date: NaiveDate) -> Option<Decimal>;
}

impl<F> RateLookup for F
where
    F: Fn(&CurrencyCode, NaiveDate) -> Option<Decimal>,
{
    fn rate_to_base(&self, currency: &CurrencyCode, date: NaiveDate) -> Option<Decimal> {
        self(currency, date)
    }
}

/// Rates into one base currency, keyed by currency and effective date.
///
/// A lookup returns the latest rate effective on or before the requested date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    base: Option<CurrencyCode>,
    rates: BTreeMap<CurrencyCode, BTreeMap<NaiveDate, Decimal>>,
}

impl RateTable {
    /// Builds a table for `base` from quoted rates.
    ///
    /// Rates quoted out of the base (`base -> X`) are inverted. Rates that do not
    /// involve the base are rejected, as are non-positive rates.
    pub fn new<I>(base: CurrencyCode, quotes: I) -> Result<Self, CurrencyError>
    where
        I: IntoIterator<Item = ExchangeRate>,
    {
        let mut rates: BTreeMap<CurrencyCode, BTreeMap<NaiveDate, Decimal>> = BTreeMap::new();
        for quote in quotes {
            if quote.rate <= Decimal::ZERO {
                return Err(CurrencyError::NonPositiveRate {
                    from: quote.from_currency,
                    to: quote.to_currency,
                    date: quote.effective_date,
                });
            }
            let into_base = if quote.to_currency == base {
                quote
            } else if quote.from_currency == base {
                quote.inverse().ok_or_else(|| CurrencyError::NonPositiveRate {
                    from: quote.from_currency.clone(),
                    to: quote.to_currency.clone(),
                    date: quote.effective_date,
                })?
            } else {
                return Err(CurrencyError::UnrelatedRate {
                    from: quote.from_currency,
                    to: quote.to_currency,
                    base,
                });
            };
            rates
                .entry(into_base.from_currency)
                .or_default()
                .insert(into_base.effective_date, into_base.rate);
        }
        Ok(Self {
            base: Some(base),
            rates,
        })
    }

    /// Base currency of the table, if one was set.
    #[must_use]
    pub fn base(&self) -> Option<&CurrencyCode> {
        self.base.as_ref()
    }

    /// Number of quoted currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true when no rates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateLookup for RateTable {
    fn rate_to_base(&self, currency: &CurrencyCode, date: NaiveDate) -> Option<Decimal> {
        if self.base.as_ref() == Some(currency) {
            return Some(Decimal::ONE);
        }
        self.rates
            .get(currency)?
            .range(..=date)
            .next_back()
            .map(|(_, rate)| *rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_latest_rate_on_or_before_date() {
        let table = RateTable::new(
            code("USD"),
            [
                ExchangeRate::new(code("EUR"), code("USD"), dec!(1.10), date(1)),
                ExchangeRate::new(code("EUR"), code("USD"), dec!(1.12), date(15)),
            ],
        )
        .unwrap();

        assert_eq!(table.rate_to_base(&code("EUR"), date(1)), Some(dec!(1.10)));
        assert_eq!(table.rate_to_base(&code("EUR"), date(14)), Some(dec!(1.10)));
        assert_eq!(table.rate_to_base(&code("EUR"), date(31)), Some(dec!(1.12)));
        assert_eq!(
            table.rate_to_base(&code("EUR"), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()),
            None
        );
        assert_eq!(table.rate_to_base(&code("USD"), date(3)), Some(Decimal::ONE));
        assert_eq!(table.rate_to_base(&code("GBP"), date(3)), None);
    }

    #[test]
    fn test_rates_out_of_base_are_inverted() {
        let table = RateTable::new(
            code("USD"),
            [ExchangeRate::new(code("USD"), code("IDR"), dec!(16000), date(1))],
        )
        .unwrap();

        assert_eq!(
            table.rate_to_base(&code("IDR"), date(2)),
            Some(Decimal::ONE / dec!(16000))
        );
    }

    #[test]
    fn test_rejects_bad_quotes() {
        let err = RateTable::new(
            code("USD"),
            [ExchangeRate::new(code("EUR"), code("USD"), dec!(0), date(1))],
        )
        .unwrap_err();
        assert!(matches!(err, CurrencyError::NonPositiveRate { .. }));

        let err = RateTable::new(
            code("USD"),
            [ExchangeRate::new(code("EUR"), code("GBP"), dec!(0.85), date(1))],
        )
        .unwrap_err();
        assert!(matches!(err, CurrencyError::UnrelatedRate { .. }));
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |currency: &CurrencyCode, _date: NaiveDate| {
            (currency.as_str() == "EUR").then_some(dec!(1.1))
        };
        assert_eq!(lookup.rate_to_base(&code("EUR"), date(1)), Some(dec!(1.1)));
        assert_eq!(lookup.rate_to_base(&code("JPY"), date(1)), None);
    }

    #[test]
    fn test_inverse_of_zero_rate() {
        let rate = ExchangeRate::new(code("EUR"), code("USD"), Decimal::ZERO, date(1));
        assert!(rate.inverse().is_none());
    }
}
