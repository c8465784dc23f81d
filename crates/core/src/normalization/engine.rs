//! End-to-end normalization run.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::info;

use finnorm_shared::types::EntityId;

use crate::adjustments::{AdjustmentCalculator, AdjustmentDetail, income_statement};
use crate::classification::{
    ClassificationEngine, PatternKind, SuspiciousFlag, detect_patterns,
};
use crate::consolidation::{ConsolidationEngine, ConsolidationSettings};
use crate::currency::RateLookup;
use crate::ledger::Transaction;
use crate::metrics::FinancialMetrics;
use crate::rules::RuleRepository;

use super::error::NormalizationError;
use super::types::{NormalizationConfig, NormalizedFinancialView};

/// Produces the normalized view of a transaction batch.
///
/// Stateless between runs; the same inputs always give the same view.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedViewEngine<'a> {
    repository: &'a RuleRepository,
}

impl<'a> NormalizedViewEngine<'a> {
    /// Creates an engine over `repository`.
    #[must_use]
    pub fn new(repository: &'a RuleRepository) -> Self {
        Self { repository }
    }

    /// Runs classification, consolidation, adjustments and metrics.
    ///
    /// Entities are classified in parallel. Conversion runs for every entity;
    /// intercompany elimination only when `config.consolidate` is set and
    /// more than one entity is present.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage.
    pub fn generate_normalized_view<R>(
        &self,
        transactions: Vec<Transaction>,
        manual_adjustments: Vec<AdjustmentDetail>,
        config: &NormalizationConfig,
        rates: &R,
    ) -> Result<NormalizedFinancialView, NormalizationError>
    where
        R: RateLookup + ?Sized,
    {
        let template = self.repository.industry(&config.industry)?;
        let groups = group_by_entity(transactions);
        let entities: Vec<EntityId> = groups.iter().map(|(id, _)| id.clone()).collect();

        let classifier = ClassificationEngine::new(self.repository);
        let classified = groups
            .into_par_iter()
            .map(|(entity_id, rows)| {
                classifier
                    .classify_batch(rows, &config.industry)
                    .map(|rows| (entity_id, rows))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let settings = ConsolidationSettings {
            eliminate_intercompany: config.consolidate,
            require_balanced_entities: config.require_balanced_entities,
            reconciliation_tolerance: config.reconciliation_tolerance,
            ..ConsolidationSettings::from_thresholds(config.base_currency.clone(), &template.thresholds)
        };
        let mut consolidation = ConsolidationEngine::new(settings);
        for (entity_id, rows) in classified {
            consolidation.add_entity(entity_id, rows)?;
        }
        let consolidated = consolidation.consolidate(rates)?;

        let flags = {
            let mut flags = detect_patterns(&consolidated.batch);
            let account_codes: HashMap<_, _> = consolidated
                .batch
                .iter()
                .map(|row| (row.row_id(), row.transaction.account_code.as_str()))
                .collect();
            flags.extend(consolidated.unreconciled.iter().map(|item| {
                SuspiciousFlag::new(
                    item.row_id.clone(),
                    account_codes.get(&item.row_id).copied().unwrap_or_default(),
                    PatternKind::UnreconciledIntercompany,
                    item.reason.clone(),
                )
            }));
            flags
        };

        let mut calculator =
            AdjustmentCalculator::new(consolidated.batch, self.repository, &config.industry)?;
        for detail in manual_adjustments {
            calculator.add_adjustment(detail)?;
        }
        let metrics = calculator.calculate_all_metrics(&config.policy)?;
        let ratios = FinancialMetrics::calculate(
            &metrics.normalized,
            calculator.batch(),
            config.enterprise_value,
        );

        info!(
            industry = %template.name,
            entities = entities.len(),
            rows = consolidated.totals.row_count,
            flags = flags.len(),
            adjustments = calculator.adjustments().len(),
            reported_ebitda = %metrics.reported.ebitda,
            normalized_ebitda = %metrics.normalized.ebitda,
            "Normalized view generated"
        );

        Ok(NormalizedFinancialView {
            industry: template.name.clone(),
            base_currency: consolidated.base_currency,
            entities,
            flags,
            eliminations: consolidated.eliminations,
            unreconciled: consolidated.unreconciled,
            entity_totals: consolidated.entity_totals,
            totals: consolidated.totals,
            impact_analysis: calculator.get_adjustment_impact_analysis(),
            reported_income_statement: income_statement(&metrics.reported),
            normalized_income_statement: income_statement(&metrics.normalized),
            before_after: calculator.before_after(&config.policy.normalized),
            adjustments: calculator.adjustments().to_vec(),
            rule_outcomes: calculator.rule_outcomes().to_vec(),
            batch: calculator.batch().to_vec(),
            metrics,
            ratios,
        })
    }
}

/// Splits a batch by entity, keeping first-appearance order of entities and
/// input order within each entity.
fn group_by_entity(transactions: Vec<Transaction>) -> Vec<(EntityId, Vec<Transaction>)> {
    let mut groups: Vec<(EntityId, Vec<Transaction>)> = Vec::new();
    let mut index: HashMap<EntityId, usize> = HashMap::new();
    for tx in transactions {
        match index.get(&tx.entity_id) {
            Some(&i) => groups[i].1.push(tx),
            None => {
                index.insert(tx.entity_id.clone(), groups.len());
                groups.push((tx.entity_id.clone(), vec![tx]));
            }
        }
    }
    groups
}
