//! Financial ratio types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Margins and ratios over one EBITDA calculation.
///
/// Every value is `None` when its denominator is missing or not positive.
/// Margins are percentages; everything is rounded to 2 decimal places.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRatios {
    /// Gross profit / revenue.
    pub gross_margin: Option<Decimal>,
    /// EBITDA / revenue.
    pub ebitda_margin: Option<Decimal>,
    /// EBIT / revenue.
    pub operating_margin: Option<Decimal>,
    /// Pre-tax income / revenue.
    pub pretax_margin: Option<Decimal>,
    /// Current assets / current liabilities.
    pub current_ratio: Option<Decimal>,
    /// Total debt / EBITDA.
    pub debt_to_ebitda: Option<Decimal>,
    /// EBITDA / interest expense.
    pub interest_coverage: Option<Decimal>,
    /// Enterprise value / EBITDA.
    pub ev_to_ebitda: Option<Decimal>,
    /// Enterprise value / revenue.
    pub ev_to_revenue: Option<Decimal>,
}

/// Balance sheet figures pulled from a classified batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetFigures {
    /// Cash, receivables, inventory, prepaid.
    pub current_assets: Option<Decimal>,
    /// Payables, accruals, short-term obligations.
    pub current_liabilities: Option<Decimal>,
    /// Loans, bonds, notes payable.
    pub total_debt: Option<Decimal>,
}
