//! Income statement presentation of an EBITDA calculation.

use rust_decimal::Decimal;

use crate::currency::CurrencyService;

use super::types::{EbitdaCalculation, IncomeStatementLine};

/// Line items of `calc`, expenses negative, each with its share of revenue.
#[must_use]
pub fn income_statement(calc: &EbitdaCalculation) -> Vec<IncomeStatementLine> {
    let revenue = calc.revenue;
    let line = |label: &str, amount: Decimal| IncomeStatementLine {
        line_item: label.to_string(),
        amount,
        percent_of_revenue: (revenue > Decimal::ZERO)
            .then(|| CurrencyService::round(amount / revenue * Decimal::ONE_HUNDRED, 2)),
    };

    vec![
        line("Revenue", calc.revenue),
        line("Cost of Goods Sold", -calc.cogs),
        line("Gross Profit", calc.gross_profit),
        line("Operating Expenses", -calc.opex),
        line("EBIT", calc.ebit),
        line("Depreciation & Amortization (add-back)", calc.d_and_a),
        line("EBITDA", calc.ebitda),
        line("Interest Expense", -calc.interest),
        line("Pre-tax Income", calc.pretax_income),
    ]
}
