//! Adjustment and EBITDA types.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finnorm_shared::types::{AdjustmentId, RowId};

use crate::rules::{AdjustmentCategory, EbitdaComponent};

/// Where an adjustment came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdjustmentOrigin {
    /// Derived from a keyword rule.
    Rule {
        /// Rule name.
        rule: String,
    },
    /// Added by an analyst.
    #[default]
    Manual,
}

/// One adjustment annotation.
///
/// Never mutates the source transaction. `amount` is a positive magnitude in the
/// component's normalized sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentDetail {
    /// Unique id (`<rule>:<row_id>` for rule-derived adjustments).
    #[serde(default = "AdjustmentId::generate")]
    pub id: AdjustmentId,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: AdjustmentCategory,
    /// Row the adjustment annotates, if any.
    #[serde(default)]
    pub source_row_id: Option<RowId>,
    /// Component the amount is taken from.
    pub component: EbitdaComponent,
    /// Destination component for reclassifications.
    #[serde(default)]
    pub reclassify_to: Option<EbitdaComponent>,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Whether the item is expected to recur.
    #[serde(default)]
    pub is_recurring: bool,
    /// Audit explanation.
    #[serde(default)]
    pub reason: String,
    /// Rule or manual.
    #[serde(default)]
    pub origin: AdjustmentOrigin,
}

/// Income statement totals per component, in normalized sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ComponentTotals {
    pub revenue: Decimal,
    pub cogs: Decimal,
    /// Operating expenses excluding D&A.
    pub opex: Decimal,
    pub d_and_a: Decimal,
    pub interest: Decimal,
}

impl ComponentTotals {
    pub fn slot(&mut self, component: EbitdaComponent) -> &mut Decimal {
        match component {
            EbitdaComponent::Revenue => &mut self.revenue,
            EbitdaComponent::Cogs => &mut self.cogs,
            EbitdaComponent::Opex => &mut self.opex,
            EbitdaComponent::DAndA => &mut self.d_and_a,
            EbitdaComponent::Interest => &mut self.interest,
        }
    }

    pub fn add(&mut self, component: EbitdaComponent, amount: Decimal) {
        *self.slot(component) += amount;
    }

    /// Applies one adjustment: removal from `component`, plus re-entry into the
    /// target for reclassifications.
    pub fn apply(&mut self, adjustment: &AdjustmentDetail) {
        self.add(adjustment.component, -adjustment.amount);
        if adjustment.category == AdjustmentCategory::Reclassification
            && let Some(target) = adjustment.reclassify_to
        {
            self.add(target, adjustment.amount);
        }
    }

    pub fn from_calculation(calc: &EbitdaCalculation) -> Self {
        Self {
            revenue: calc.revenue,
            cogs: calc.cogs,
            opex: calc.opex - calc.d_and_a,
            d_and_a: calc.d_and_a,
            interest: calc.interest,
        }
    }
}

/// One EBITDA derivation. Always computed on demand, never stored as truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbitdaCalculation {
    /// Revenue.
    pub revenue: Decimal,
    /// Cost of goods sold.
    pub cogs: Decimal,
    /// Revenue minus COGS.
    pub gross_profit: Decimal,
    /// Total operating expenses, including D&A.
    pub opex: Decimal,
    /// Gross profit minus operating expenses.
    pub ebit: Decimal,
    /// Depreciation and amortization.
    pub d_and_a: Decimal,
    /// EBIT plus D&A.
    pub ebitda: Decimal,
    /// Net interest expense.
    pub interest: Decimal,
    /// EBIT minus interest.
    pub pretax_income: Decimal,
    /// Adjustments reflected in this calculation.
    pub applied_adjustments: Vec<AdjustmentId>,
}

impl EbitdaCalculation {
    pub(crate) fn from_totals(totals: ComponentTotals, applied: Vec<AdjustmentId>) -> Self {
        let gross_profit = totals.revenue - totals.cogs;
        let opex = totals.opex + totals.d_and_a;
        let ebit = gross_profit - opex;
        Self {
            revenue: totals.revenue,
            cogs: totals.cogs,
            gross_profit,
            opex,
            ebit,
            d_and_a: totals.d_and_a,
            ebitda: ebit + totals.d_and_a,
            interest: totals.interest,
            pretax_income: ebit - totals.interest,
            applied_adjustments: applied,
        }
    }
}

/// The three EBITDA levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbitdaMetrics {
    /// No adjustments.
    pub reported: EbitdaCalculation,
    /// Non-recurring items and eliminations removed.
    pub adjusted: EbitdaCalculation,
    /// Adjusted plus reclassifications.
    pub normalized: EbitdaCalculation,
}

/// Which categories each metric level applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPolicy {
    /// Categories applied for adjusted EBITDA.
    pub adjusted: BTreeSet<AdjustmentCategory>,
    /// Categories applied for normalized EBITDA.
    pub normalized: BTreeSet<AdjustmentCategory>,
}

impl Default for MetricPolicy {
    fn default() -> Self {
        let adjusted: BTreeSet<_> = [
            AdjustmentCategory::NonRecurringAddback,
            AdjustmentCategory::Elimination,
        ]
        .into_iter()
        .collect();
        let mut normalized = adjusted.clone();
        normalized.insert(AdjustmentCategory::Reclassification);
        Self {
            adjusted,
            normalized,
        }
    }
}

/// What happened to an adjustment or rule in the impact analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactStatus {
    /// Produced at least one adjustment.
    Applied,
    /// The rule matched no rows.
    MatchedZeroAccounts,
    /// Every row it matched was won by a more specific rule.
    Superseded,
    /// It won rows that had nothing to adjust (credit balances, or a
    /// reclassification into the row's own component).
    NoAdjustableAmount,
}

impl ImpactStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::MatchedZeroAccounts => "matched zero accounts",
            Self::Superseded => "superseded by a more specific rule",
            Self::NoAdjustableAmount => "matched rows with no adjustable amount",
        }
    }
}

/// Result of evaluating one rule against the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Rule name.
    pub rule: String,
    /// Rule category.
    pub category: AdjustmentCategory,
    /// Adjustments emitted.
    pub adjustments: usize,
    /// Rows matched but won by another rule.
    pub superseded_rows: usize,
    /// Rows won but left unadjusted.
    pub unadjustable_rows: usize,
    /// Resulting status.
    pub status: ImpactStatus,
}

/// One row of the adjustment impact analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentImpact {
    /// Adjustment id; `None` for rules that produced nothing.
    pub adjustment_id: Option<AdjustmentId>,
    /// Adjustment or rule name.
    pub name: String,
    /// Category.
    pub category: AdjustmentCategory,
    /// Adjustment amount (zero for rules that produced nothing).
    pub amount: Decimal,
    /// Change in EBITDA versus reported.
    pub ebitda_impact: Decimal,
    /// Change in pre-tax income versus reported.
    pub pretax_impact: Decimal,
    /// Whether the item recurs.
    pub is_recurring: bool,
    /// Status.
    pub status: ImpactStatus,
    /// Status label or adjustment reason.
    pub note: String,
}

/// One income statement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatementLine {
    /// Line label.
    pub line_item: String,
    /// Amount; expenses are shown negative.
    pub amount: Decimal,
    /// Share of revenue in percent; `None` when revenue is not positive.
    pub percent_of_revenue: Option<Decimal>,
}

/// Per-account before/after view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeforeAfterComparison {
    /// Account code.
    pub account_code: String,
    /// Configured account name, or the first description seen.
    pub account_name: String,
    /// EBITDA component of the account.
    pub component: EbitdaComponent,
    /// Normalized amount before adjustments.
    pub before_amount: Decimal,
    /// Normalized amount after adjustments.
    pub after_amount: Decimal,
    /// `after_amount - before_amount`.
    pub adjustment_amount: Decimal,
    /// Percent change versus `|before_amount|`; `None` when before is zero.
    pub pct_change: Option<Decimal>,
    /// Reasons of the adjustments touching this account.
    pub reasons: Vec<String>,
}
