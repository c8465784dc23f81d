//! Reported, adjusted and normalized EBITDA.
//!
//! The calculator owns a classified batch and a list of adjustment
//! annotations. Every figure is re-derived from those on each call; nothing is
//! cached, so adding an adjustment can never leave a stale total behind.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use finnorm_shared::types::{AdjustmentId, RowId};

use crate::classification::ClassifiedTransaction;
use crate::currency::CurrencyService;
use crate::rules::{AdjustmentCategory, AdjustmentRule, RuleRepository, normalize_text};

use super::error::AdjustmentError;
use super::types::{
    AdjustmentDetail, AdjustmentImpact, AdjustmentOrigin, BeforeAfterComparison,
    ComponentTotals, EbitdaCalculation, EbitdaMetrics, ImpactStatus, MetricPolicy, RuleOutcome,
};

/// EBITDA calculator over one classified batch.
#[derive(Debug, Clone)]
pub struct AdjustmentCalculator {
    batch: Vec<ClassifiedTransaction>,
    row_index: HashMap<RowId, usize>,
    account_names: BTreeMap<String, String>,
    adjustments: Vec<AdjustmentDetail>,
    rule_outcomes: Vec<RuleOutcome>,
}

impl AdjustmentCalculator {
    /// Builds a calculator and derives rule-based adjustments for `industry`.
    ///
    /// Every configured rule (common and industry) is scanned against every
    /// income statement row. Per row and category the longest matching keyword
    /// wins; equal lengths go to the earlier rule.
    pub fn new(
        batch: Vec<ClassifiedTransaction>,
        repository: &RuleRepository,
        industry: &str,
    ) -> Result<Self, AdjustmentError> {
        let template = repository
            .industry(industry)
            .map_err(|_| AdjustmentError::UnknownIndustry(industry.to_string()))?;

        let row_index = batch
            .iter()
            .enumerate()
            .map(|(i, row)| (row.row_id().clone(), i))
            .collect();

        let (adjustments, rule_outcomes) = derive_rule_adjustments(&batch, &template.adjustment_rules);

        info!(
            industry = %template.name,
            rows = batch.len(),
            adjustments = adjustments.len(),
            "Rule adjustments derived"
        );

        Ok(Self {
            batch,
            row_index,
            account_names: template.account_names.clone(),
            adjustments,
            rule_outcomes,
        })
    }

    /// The classified batch.
    #[must_use]
    pub fn batch(&self) -> &[ClassifiedTransaction] {
        &self.batch
    }

    /// All adjustments, rule-derived first, then manual in insertion order.
    #[must_use]
    pub fn adjustments(&self) -> &[AdjustmentDetail] {
        &self.adjustments
    }

    /// Per-rule evaluation results, in rule order.
    #[must_use]
    pub fn rule_outcomes(&self) -> &[RuleOutcome] {
        &self.rule_outcomes
    }

    /// Adds a manual adjustment after validating it against the batch.
    pub fn add_adjustment(&mut self, detail: AdjustmentDetail) -> Result<(), AdjustmentError> {
        if self.adjustments.iter().any(|a| a.id == detail.id) {
            return Err(AdjustmentError::DuplicateId(detail.id));
        }
        self.validate(&detail)?;
        self.check_row_capacity(&detail)?;
        debug!(id = %detail.id, category = %detail.category, amount = %detail.amount, "Adjustment added");
        self.adjustments.push(detail);
        Ok(())
    }

    fn validate(&self, detail: &AdjustmentDetail) -> Result<(), AdjustmentError> {
        if detail.amount <= Decimal::ZERO {
            return Err(AdjustmentError::NonPositiveAmount {
                adjustment: detail.id.clone(),
                amount: detail.amount,
            });
        }
        if detail.category == AdjustmentCategory::Reclassification
            && detail.reclassify_to.is_none_or(|target| target == detail.component)
        {
            return Err(AdjustmentError::InvalidReclassificationTarget {
                adjustment: detail.id.clone(),
            });
        }
        if let Some(row_id) = &detail.source_row_id {
            let row = self
                .row_index
                .get(row_id)
                .map(|&i| &self.batch[i])
                .ok_or_else(|| AdjustmentError::UnknownSourceRow {
                    adjustment: detail.id.clone(),
                    row_id: row_id.clone(),
                })?;
            if row.component() != Some(detail.component) {
                return Err(AdjustmentError::ComponentMismatch {
                    adjustment: detail.id.clone(),
                    row_id: row_id.clone(),
                    expected: detail.component,
                    actual: row
                        .component()
                        .map_or_else(|| "none".to_string(), |c| c.to_string()),
                });
            }
        }
        Ok(())
    }

    /// A row can give up at most its normalized amount, once to removals
    /// and once to reclassifications.
    fn check_row_capacity(&self, detail: &AdjustmentDetail) -> Result<(), AdjustmentError> {
        let Some(row_id) = &detail.source_row_id else {
            return Ok(());
        };
        let Some(row) = self.row_index.get(row_id).map(|&i| &self.batch[i]) else {
            return Ok(());
        };
        let overlaps = |other: &AdjustmentDetail| {
            other.category == detail.category
                || (other.category.is_removal() && detail.category.is_removal())
        };
        let used: Decimal = self
            .adjustments
            .iter()
            .filter(|a| a.source_row_id.as_ref() == Some(row_id) && overlaps(a))
            .map(|a| a.amount)
            .sum();
        let available = (row.normalized_amount() - used).max(Decimal::ZERO);
        if detail.amount > available {
            return Err(AdjustmentError::ExceedsRowAmount {
                adjustment: detail.id.clone(),
                row_id: row_id.clone(),
                amount: detail.amount,
                available,
            });
        }
        Ok(())
    }

    /// Component totals straight from the batch.
    fn reported_totals(&self) -> ComponentTotals {
        let mut totals = ComponentTotals::default();
        for row in &self.batch {
            if let Some(component) = row.component() {
                totals.add(component, row.normalized_amount());
            }
        }
        totals
    }

    /// EBITDA with no adjustments.
    #[must_use]
    pub fn compute_reported(&self) -> EbitdaCalculation {
        EbitdaCalculation::from_totals(self.reported_totals(), Vec::new())
    }

    /// Adjustments applied for `categories`, in order.
    ///
    /// When reclassification is requested, a removal (add-back or
    /// elimination) on the same row gives way to it so the row is moved once
    /// rather than moved and removed.
    fn selected(&self, categories: &BTreeSet<AdjustmentCategory>) -> Vec<&AdjustmentDetail> {
        let reclassified: HashSet<&RowId> = if categories.contains(&AdjustmentCategory::Reclassification) {
            self.adjustments
                .iter()
                .filter(|a| a.category == AdjustmentCategory::Reclassification)
                .filter_map(|a| a.source_row_id.as_ref())
                .collect()
        } else {
            HashSet::new()
        };

        self.adjustments
            .iter()
            .filter(|a| categories.contains(&a.category))
            .filter(|a| {
                !a.category.is_removal()
                    || a.source_row_id
                        .as_ref()
                        .is_none_or(|row| !reclassified.contains(row))
            })
            .collect()
    }

    /// Applies every adjustment of the requested categories on top of `base`.
    ///
    /// Each category's adjustments are validated before any is applied; one
    /// invalid adjustment fails the whole call.
    pub fn apply_adjustments(
        &self,
        base: &EbitdaCalculation,
        categories: &BTreeSet<AdjustmentCategory>,
    ) -> Result<EbitdaCalculation, AdjustmentError> {
        let selected = self.selected(categories);
        for adjustment in &selected {
            self.validate(adjustment)?;
        }

        let mut totals = ComponentTotals::from_calculation(base);
        let mut applied = base.applied_adjustments.clone();
        for adjustment in selected {
            totals.apply(adjustment);
            applied.push(adjustment.id.clone());
        }
        Ok(EbitdaCalculation::from_totals(totals, applied))
    }

    /// Reported, adjusted and normalized EBITDA under `policy`.
    pub fn calculate_all_metrics(&self, policy: &MetricPolicy) -> Result<EbitdaMetrics, AdjustmentError> {
        let reported = self.compute_reported();
        let adjusted = self.apply_adjustments(&reported, &policy.adjusted)?;
        let normalized = self.apply_adjustments(&reported, &policy.normalized)?;

        info!(
            reported = %reported.ebitda,
            adjusted = %adjusted.ebitda,
            normalized = %normalized.ebitda,
            "EBITDA calculated"
        );

        Ok(EbitdaMetrics {
            reported,
            adjusted,
            normalized,
        })
    }

    /// One row per adjustment with its standalone effect on EBITDA and pre-tax
    /// income, plus one row per rule that produced nothing.
    ///
    /// Sorted by |EBITDA impact| descending, then |amount| descending, then name.
    #[must_use]
    pub fn get_adjustment_impact_analysis(&self) -> Vec<AdjustmentImpact> {
        let reported_totals = self.reported_totals();
        let reported = EbitdaCalculation::from_totals(reported_totals, Vec::new());

        let mut rows: Vec<AdjustmentImpact> = self
            .adjustments
            .iter()
            .map(|adjustment| {
                let mut totals = reported_totals;
                totals.apply(adjustment);
                let after = EbitdaCalculation::from_totals(totals, Vec::new());
                AdjustmentImpact {
                    adjustment_id: Some(adjustment.id.clone()),
                    name: adjustment.name.clone(),
                    category: adjustment.category,
                    amount: adjustment.amount,
                    ebitda_impact: after.ebitda - reported.ebitda,
                    pretax_impact: after.pretax_income - reported.pretax_income,
                    is_recurring: adjustment.is_recurring,
                    status: ImpactStatus::Applied,
                    note: adjustment.reason.clone(),
                }
            })
            .collect();

        rows.extend(
            self.rule_outcomes
                .iter()
                .filter(|outcome| outcome.status != ImpactStatus::Applied)
                .map(|outcome| AdjustmentImpact {
                    adjustment_id: None,
                    name: outcome.rule.clone(),
                    category: outcome.category,
                    amount: Decimal::ZERO,
                    ebitda_impact: Decimal::ZERO,
                    pretax_impact: Decimal::ZERO,
                    is_recurring: false,
                    status: outcome.status,
                    note: outcome.status.label().to_string(),
                }),
        );

        rows.sort_by(|a, b| {
            b.ebitda_impact
                .abs()
                .cmp(&a.ebitda_impact.abs())
                .then_with(|| b.amount.abs().cmp(&a.amount.abs()))
                .then_with(|| a.name.cmp(&b.name))
        });
        rows
    }

    /// Per-account normalized amounts before and after the adjustments of
    /// `categories`, in first-appearance order of the account.
    ///
    /// Adjustments without a source row cannot be attributed to an account and
    /// only show up in the EBITDA totals.
    #[must_use]
    pub fn before_after(&self, categories: &BTreeSet<AdjustmentCategory>) -> Vec<BeforeAfterComparison> {
        let mut lines: Vec<BeforeAfterComparison> = Vec::new();
        let mut line_of: HashMap<(&str, _), usize> = HashMap::new();

        for row in &self.batch {
            let Some(component) = row.component() else {
                continue;
            };
            let code = row.transaction.account_code.as_str();
            let index = *line_of.entry((code, component)).or_insert_with(|| {
                lines.push(BeforeAfterComparison {
                    account_code: code.to_string(),
                    account_name: self
                        .account_names
                        .get(code.trim())
                        .cloned()
                        .unwrap_or_else(|| row.transaction.description.clone()),
                    component,
                    before_amount: Decimal::ZERO,
                    after_amount: Decimal::ZERO,
                    adjustment_amount: Decimal::ZERO,
                    pct_change: None,
                    reasons: Vec::new(),
                });
                lines.len() - 1
            });
            lines[index].before_amount += row.normalized_amount();
        }

        for adjustment in self.selected(categories) {
            let Some(row) = adjustment
                .source_row_id
                .as_ref()
                .and_then(|id| self.row_index.get(id))
                .map(|&i| &self.batch[i])
            else {
                continue;
            };
            let key = (row.transaction.account_code.as_str(), adjustment.component);
            if let Some(&index) = line_of.get(&key) {
                let line = &mut lines[index];
                line.adjustment_amount -= adjustment.amount;
                if !adjustment.reason.is_empty() && !line.reasons.contains(&adjustment.reason) {
                    line.reasons.push(adjustment.reason.clone());
                }
            }
        }

        for line in &mut lines {
            line.after_amount = line.before_amount + line.adjustment_amount;
            line.pct_change = (!line.before_amount.is_zero()).then(|| {
                CurrencyService::round(
                    line.adjustment_amount / line.before_amount.abs() * Decimal::ONE_HUNDRED,
                    2,
                )
            });
        }
        lines
    }
}

/// Scans every rule against every income statement row.
fn derive_rule_adjustments(
    batch: &[ClassifiedTransaction],
    rules: &[AdjustmentRule],
) -> (Vec<AdjustmentDetail>, Vec<RuleOutcome>) {
    let mut emitted = vec![0usize; rules.len()];
    let mut superseded = vec![0usize; rules.len()];
    let mut unadjustable = vec![0usize; rules.len()];
    let mut adjustments = Vec::new();

    for row in batch {
        let Some(component) = row.component() else {
            continue;
        };
        let description = normalize_text(&row.transaction.description);

        // category -> (rule index, keyword length), longest keyword wins
        let mut winners: BTreeMap<AdjustmentCategory, (usize, usize)> = BTreeMap::new();
        let mut matched = Vec::new();
        for (index, rule) in rules.iter().enumerate() {
            let Some(keyword) = rule.best_keyword(&description) else {
                continue;
            };
            matched.push(index);
            let len = keyword.len();
            winners
                .entry(rule.category)
                .and_modify(|best| {
                    if len > best.1 {
                        *best = (index, len);
                    }
                })
                .or_insert((index, len));
        }
        if matched.is_empty() {
            continue;
        }

        for &index in &matched {
            if winners.get(&rules[index].category).map(|w| w.0) != Some(index) {
                superseded[index] += 1;
            }
        }

        // At most one removal per row: the strongest removal category keeps it.
        let removal = winners
            .keys()
            .copied()
            .filter(|category| category.is_removal())
            .min_by_key(|category| category.precedence());
        winners.retain(|category, (index, _)| {
            let keep = !category.is_removal() || Some(*category) == removal;
            if !keep {
                superseded[*index] += 1;
            }
            keep
        });

        let amount = row.normalized_amount();
        if amount <= Decimal::ZERO {
            debug!(row_id = %row.row_id(), %amount, "Matched row has no positive amount to adjust");
            for (rule_index, _) in winners.into_values() {
                unadjustable[rule_index] += 1;
            }
            continue;
        }

        for (rule_index, _) in winners.into_values() {
            let rule = &rules[rule_index];
            if rule.category == AdjustmentCategory::Reclassification
                && rule.reclassify_to == Some(component)
            {
                unadjustable[rule_index] += 1;
                continue;
            }
            emitted[rule_index] += 1;
            adjustments.push(AdjustmentDetail {
                id: AdjustmentId::for_rule(&rule.name, row.row_id()),
                name: rule.name.clone(),
                category: rule.category,
                source_row_id: Some(row.row_id().clone()),
                component,
                reclassify_to: rule.reclassify_to,
                amount,
                is_recurring: rule.is_recurring,
                reason: rule.reason.clone(),
                origin: AdjustmentOrigin::Rule {
                    rule: rule.name.clone(),
                },
            });
        }
    }

    let outcomes = rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let status = match (emitted[index], unadjustable[index], superseded[index]) {
                (0, 0, 0) => {
                    warn!(rule = %rule.name, "Adjustment rule matched zero accounts");
                    ImpactStatus::MatchedZeroAccounts
                }
                (0, 0, _) => ImpactStatus::Superseded,
                (0, _, _) => {
                    warn!(
                        rule = %rule.name,
                        rows = unadjustable[index],
                        "Adjustment rule matched rows with no adjustable amount"
                    );
                    ImpactStatus::NoAdjustableAmount
                }
                _ => ImpactStatus::Applied,
            };
            RuleOutcome {
                rule: rule.name.clone(),
                category: rule.category,
                adjustments: emitted[index],
                superseded_rows: superseded[index],
                unadjustable_rows: unadjustable[index],
                status,
            }
        })
        .collect();

    (adjustments, outcomes)
}
