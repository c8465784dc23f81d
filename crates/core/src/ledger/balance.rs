//! Normal-balance rules and ledger totals.
//!
//! - Debit-normal (expenses, assets): normalized = signed amount
//! - Credit-normal (revenue, liabilities, equity): normalized = -signed amount
//!
//! Contra entries (sales returns booked as debits to revenue) therefore reduce
//! the normalized total instead of being folded in with `abs()`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rules::AccountType;

/// Which side increases an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debit-normal accounts (assets, expenses).
    DebitNormal,
    /// Credit-normal accounts (revenue, liabilities, equity).
    CreditNormal,
}

impl NormalBalance {
    /// Determines the normal balance of an account type.
    ///
    /// Intercompany and unknown rows are treated as debit-normal so their
    /// signed amount passes through unchanged.
    #[must_use]
    pub const fn of(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Revenue | AccountType::Liability | AccountType::Equity => {
                Self::CreditNormal
            }
            AccountType::Cogs
            | AccountType::Opex
            | AccountType::Depreciation
            | AccountType::Amortization
            | AccountType::Interest
            | AccountType::Asset
            | AccountType::Intercompany
            | AccountType::Unknown => Self::DebitNormal,
        }
    }

    /// Converts a trial-balance signed amount into a positive-when-normal magnitude.
    #[must_use]
    pub fn normalize(self, signed_amount: Decimal) -> Decimal {
        match self {
            Self::DebitNormal => signed_amount,
            Self::CreditNormal => -signed_amount,
        }
    }
}

/// Normalizes a signed amount for the given account type.
#[must_use]
pub fn normalized_amount(account_type: AccountType, signed_amount: Decimal) -> Decimal {
    NormalBalance::of(account_type).normalize(signed_amount)
}

/// Debit and credit totals of a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Sum of positive amounts.
    pub debits: Decimal,
    /// Sum of negative amounts, as a positive magnitude.
    pub credits: Decimal,
    /// Number of rows.
    pub row_count: usize,
}

impl LedgerTotals {
    /// Totals a sequence of signed amounts.
    #[must_use]
    pub fn from_amounts<I>(amounts: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        amounts.into_iter().fold(Self::default(), |mut totals, amount| {
            if amount > Decimal::ZERO {
                totals.debits += amount;
            } else {
                totals.credits -= amount;
            }
            totals.row_count += 1;
            totals
        })
    }

    /// Debits minus credits.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debits - self.credits
    }

    /// Returns true when debits and credits agree within `tolerance`.
    #[must_use]
    pub fn is_balanced_within(&self, tolerance: Decimal) -> bool {
        self.net().abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountType::Revenue, dec!(-1000), dec!(1000))]
    #[case(AccountType::Revenue, dec!(200), dec!(-200))]
    #[case(AccountType::Opex, dec!(500), dec!(500))]
    #[case(AccountType::Opex, dec!(-50), dec!(-50))]
    #[case(AccountType::Liability, dec!(-75), dec!(75))]
    #[case(AccountType::Asset, dec!(75), dec!(75))]
    fn test_normalized_amount(
        #[case] account_type: AccountType,
        #[case] signed: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(normalized_amount(account_type, signed), expected);
    }

    #[test]
    fn test_ledger_totals() {
        let totals = LedgerTotals::from_amounts([dec!(100), dec!(-60), dec!(-40), dec!(0)]);
        assert_eq!(totals.debits, dec!(100));
        assert_eq!(totals.credits, dec!(100));
        assert_eq!(totals.row_count, 4);
        assert!(totals.is_balanced_within(Decimal::ZERO));
    }

    #[test]
    fn test_unbalanced_totals() {
        let totals = LedgerTotals::from_amounts([dec!(100), dec!(-99.98)]);
        assert_eq!(totals.net(), dec!(0.02));
        assert!(!totals.is_balanced_within(dec!(0.01)));
        assert!(totals.is_balanced_within(dec!(0.02)));
    }
}
