//! Financial ratio calculation.

use rust_decimal::Decimal;

use crate::adjustments::EbitdaCalculation;
use crate::classification::ClassifiedTransaction;
use crate::currency::CurrencyService;
use crate::rules::{AccountType, contains_phrase, normalize_text};

use super::types::{BalanceSheetFigures, FinancialRatios};

const CURRENT_ASSET_KEYWORDS: [&str; 5] =
    ["cash", "receivable", "inventory", "prepaid", "current asset"];
const CURRENT_LIABILITY_KEYWORDS: [&str; 5] = [
    "payable",
    "accrued",
    "current liability",
    "short term",
    "deferred revenue",
];
const DEBT_KEYWORDS: [&str; 7] = [
    "debt",
    "loan",
    "loans",
    "bond",
    "bonds",
    "notes payable",
    "line of credit",
];

/// Financial metrics service.
pub struct FinancialMetrics;

impl FinancialMetrics {
    /// Ratios over `calc`, with balance sheet figures taken from `batch`.
    #[must_use]
    pub fn calculate(
        calc: &EbitdaCalculation,
        batch: &[ClassifiedTransaction],
        enterprise_value: Option<Decimal>,
    ) -> FinancialRatios {
        let balance_sheet = Self::balance_sheet(batch);
        let revenue = calc.revenue;
        let margin = |value: Decimal| {
            ratio(value, revenue).map(|r| CurrencyService::round(r * Decimal::ONE_HUNDRED, 2))
        };

        FinancialRatios {
            gross_margin: margin(calc.gross_profit),
            ebitda_margin: margin(calc.ebitda),
            operating_margin: margin(calc.ebit),
            pretax_margin: margin(calc.pretax_income),
            current_ratio: balance_sheet
                .current_assets
                .zip(balance_sheet.current_liabilities)
                .and_then(|(assets, liabilities)| rounded(assets, liabilities)),
            debt_to_ebitda: balance_sheet
                .total_debt
                .and_then(|debt| rounded(debt, calc.ebitda)),
            interest_coverage: rounded(calc.ebitda, calc.interest),
            ev_to_ebitda: enterprise_value.and_then(|ev| rounded(ev, calc.ebitda)),
            ev_to_revenue: enterprise_value.and_then(|ev| rounded(ev, revenue)),
        }
    }

    /// Sums balance sheet rows by keyword, in normal-balance sign.
    ///
    /// A figure is `None` when no row matches or the sum is not positive.
    #[must_use]
    pub fn balance_sheet(batch: &[ClassifiedTransaction]) -> BalanceSheetFigures {
        let sum = |account_type: AccountType, keywords: &[&str]| {
            let total: Decimal = batch
                .iter()
                .filter(|row| row.account_type() == account_type)
                .filter(|row| {
                    let description = normalize_text(&row.transaction.description);
                    keywords.iter().any(|k| contains_phrase(&description, k))
                })
                .map(ClassifiedTransaction::normalized_amount)
                .sum();
            (total > Decimal::ZERO).then_some(total)
        };

        BalanceSheetFigures {
            current_assets: sum(AccountType::Asset, &CURRENT_ASSET_KEYWORDS),
            current_liabilities: sum(AccountType::Liability, &CURRENT_LIABILITY_KEYWORDS),
            total_debt: sum(AccountType::Liability, &DEBT_KEYWORDS),
        }
    }
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    (denominator > Decimal::ZERO).then(|| numerator / denominator)
}

fn rounded(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    ratio(numerator, denominator).map(|r| CurrencyService::round(r, 2))
}
