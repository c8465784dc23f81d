//! Property-based tests for currency conversion.
//!
//! - Conversion always rounds to 4 decimal places (Banker's Rounding)
//! - Conversion into the base currency is the identity
//! - Rate tables answer with the latest rate on or before the date

use chrono::{Days, NaiveDate};
use finnorm_shared::types::CurrencyCode;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::exchange::{ExchangeRate, RateLookup, RateTable};
use super::service::CurrencyService;

/// Signed amounts (-1,000,000.00 to 1,000,000.00).
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Positive exchange rates (0.000001 to 100.000000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Results never carry more than 4 decimal places.
    #[test]
    fn prop_convert_rounds_to_4_decimals(amount in signed_amount(), rate in positive_rate()) {
        let result = CurrencyService::convert(amount, rate);
        prop_assert!(result.scale() <= 4);
        prop_assert!((result - amount * rate).abs() <= Decimal::new(5, 5));
    }

    /// Sign is preserved by conversion with a positive rate (up to rounding to zero).
    #[test]
    fn prop_convert_preserves_sign(amount in signed_amount(), rate in positive_rate()) {
        let result = CurrencyService::convert(amount, rate);
        if !result.is_zero() {
            prop_assert_eq!(result.is_sign_negative(), amount.is_sign_negative());
        }
    }

    /// Amounts already in the base currency pass through untouched.
    #[test]
    fn prop_base_currency_is_identity(amount in signed_amount()) {
        let usd = CurrencyCode::usd();
        let no_rates = |_: &CurrencyCode, _: NaiveDate| -> Option<Decimal> { None };
        prop_assert_eq!(
            CurrencyService::convert_to_base(amount, &usd, &usd, base_date(), &no_rates),
            Some(amount)
        );
    }

    /// A table lookup returns the most recent rate not after the date.
    #[test]
    fn prop_table_uses_latest_effective_rate(
        offsets in prop::collection::btree_set(0u64..365, 1..10),
        query in 0u64..400,
    ) {
        let eur = CurrencyCode::new("EUR").unwrap();
        let quotes: Vec<_> = offsets
            .iter()
            .map(|&offset| {
                let rate = Decimal::from(offset + 1);
                ExchangeRate::new(eur.clone(), CurrencyCode::usd(), rate, base_date() + Days::new(offset))
            })
            .collect();
        let table = RateTable::new(CurrencyCode::usd(), quotes).unwrap();

        let expected = offsets.range(..=query).next_back().map(|&o| Decimal::from(o + 1));
        prop_assert_eq!(table.rate_to_base(&eur, base_date() + Days::new(query)), expected);
    }
}
