//! Normalization run configuration and output.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finnorm_shared::config::{AppConfig, NormalizerSettings};
use finnorm_shared::types::{CurrencyCode, EntityId};

use crate::adjustments::{
    AdjustmentDetail, AdjustmentImpact, BeforeAfterComparison, EbitdaMetrics,
    IncomeStatementLine, MetricPolicy, RuleOutcome,
};
use crate::classification::{ClassifiedTransaction, SuspiciousFlag};
use crate::consolidation::{
    ConsolidatedTotals, EliminationEntry, EntityTotals, UnreconciledIntercompany,
};
use crate::metrics::FinancialRatios;

/// Settings for one normalization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Industry template.
    pub industry: String,
    /// Reporting currency.
    pub base_currency: CurrencyCode,
    /// Eliminate intercompany balances across entities.
    pub consolidate: bool,
    /// Fail when an entity's rows do not net to zero.
    pub require_balanced_entities: bool,
    /// Absolute tolerance for the per-entity net check.
    pub reconciliation_tolerance: Decimal,
    /// Enterprise value for valuation multiples.
    pub enterprise_value: Option<Decimal>,
    /// Categories applied at each EBITDA level.
    pub policy: MetricPolicy,
}

impl NormalizationConfig {
    /// Run settings from the `normalizer` configuration section.
    #[must_use]
    pub fn from_settings(settings: &NormalizerSettings) -> Self {
        Self {
            industry: settings.industry.clone(),
            base_currency: settings.base_currency.clone(),
            consolidate: settings.consolidate,
            require_balanced_entities: settings.require_balanced_entities,
            reconciliation_tolerance: settings.reconciliation_tolerance,
            enterprise_value: settings.enterprise_value,
            policy: MetricPolicy::default(),
        }
    }

    /// Run settings from the application configuration.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::from_settings(&config.normalizer)
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self::from_settings(&NormalizerSettings::default())
    }
}

/// Everything a normalization run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedFinancialView {
    /// Industry template used.
    pub industry: String,
    /// Currency of every amount in the view.
    pub base_currency: CurrencyCode,
    /// Entities in first-appearance order.
    pub entities: Vec<EntityId>,
    /// Classified, converted batch after eliminations.
    pub batch: Vec<ClassifiedTransaction>,
    /// Rows that need review.
    pub flags: Vec<SuspiciousFlag>,
    /// Intercompany pairs removed from the batch.
    pub eliminations: Vec<EliminationEntry>,
    /// Intercompany rows left in the batch.
    pub unreconciled: Vec<UnreconciledIntercompany>,
    /// Per-entity totals before eliminations.
    pub entity_totals: Vec<EntityTotals>,
    /// Totals of `batch`.
    pub totals: ConsolidatedTotals,
    /// Rule-derived and manual adjustments.
    pub adjustments: Vec<AdjustmentDetail>,
    /// Per-rule evaluation results.
    pub rule_outcomes: Vec<RuleOutcome>,
    /// Reported, adjusted and normalized EBITDA.
    pub metrics: EbitdaMetrics,
    /// Effect of each adjustment and rule.
    pub impact_analysis: Vec<AdjustmentImpact>,
    /// Income statement before adjustments.
    pub reported_income_statement: Vec<IncomeStatementLine>,
    /// Income statement at the normalized level.
    pub normalized_income_statement: Vec<IncomeStatementLine>,
    /// Per-account effect of normalized adjustments.
    pub before_after: Vec<BeforeAfterComparison>,
    /// Ratios over normalized EBITDA.
    pub ratios: FinancialRatios,
}
