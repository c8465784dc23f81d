//! Multi-entity consolidation with intercompany elimination.

use std::collections::HashSet;

use tracing::{info, warn};

use finnorm_shared::types::EntityId;

use crate::classification::ClassifiedTransaction;
use crate::currency::{CurrencyService, RateLookup};
use crate::ledger::LedgerTotals;
use crate::rules::{AccountType, contains_phrase, normalize_text};

use super::error::ConsolidationError;
use super::matching::{Candidate, match_entities};
use super::types::{
    ConsolidationResult, ConsolidationSettings, EliminationEntry, EntityTotals,
    UnreconciledIntercompany, entity_phrase,
};

/// Merges classified entity batches into one base-currency batch.
///
/// Matched intercompany pairs are removed; unmatched ones stay and are
/// reported. Eliminations are never guessed.
#[derive(Debug, Clone)]
pub struct ConsolidationEngine {
    settings: ConsolidationSettings,
    entities: Vec<(EntityId, Vec<ClassifiedTransaction>)>,
}

impl ConsolidationEngine {
    /// Creates an engine with no entities.
    #[must_use]
    pub fn new(settings: ConsolidationSettings) -> Self {
        Self {
            settings,
            entities: Vec::new(),
        }
    }

    /// Registers an entity's classified rows.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntity` for a second registration, `EntityMismatch`
    /// when a row carries another entity id, `DuplicateRowId` when a row id is
    /// already used by another entity.
    pub fn add_entity(
        &mut self,
        entity_id: EntityId,
        classified: Vec<ClassifiedTransaction>,
    ) -> Result<(), ConsolidationError> {
        if self.entities.iter().any(|(id, _)| *id == entity_id) {
            return Err(ConsolidationError::DuplicateEntity(entity_id));
        }
        if let Some(row) = classified
            .iter()
            .find(|row| row.transaction.entity_id != entity_id)
        {
            return Err(ConsolidationError::EntityMismatch {
                entity: entity_id,
                row_id: row.row_id().clone(),
                found: row.transaction.entity_id.clone(),
            });
        }
        let known: HashSet<_> = self
            .entities
            .iter()
            .flat_map(|(_, rows)| rows.iter().map(ClassifiedTransaction::row_id))
            .collect();
        if let Some(row) = classified.iter().find(|row| known.contains(row.row_id())) {
            return Err(ConsolidationError::DuplicateRowId {
                row_id: row.row_id().clone(),
            });
        }

        self.entities.push((entity_id, classified));
        Ok(())
    }

    /// Runs the consolidation.
    ///
    /// 1. optional per-entity reconciliation
    /// 2. conversion into the base currency
    /// 3. intercompany candidate detection
    /// 4. pair matching per entity pair, in registration order
    /// 5. removal of matched pairs; unmatched candidates are reported
    pub fn consolidate<R>(&self, rates: &R) -> Result<ConsolidationResult, ConsolidationError>
    where
        R: RateLookup + ?Sized,
    {
        if self.settings.require_balanced_entities {
            self.check_reconciliation()?;
        }

        let converted = self
            .entities
            .iter()
            .map(|(entity_id, rows)| self.convert_entity(entity_id, rows, rates))
            .collect::<Result<Vec<_>, _>>()?;

        let entity_totals = self
            .entities
            .iter()
            .zip(&converted)
            .map(|((entity_id, _), rows)| EntityTotals {
                entity_id: entity_id.clone(),
                totals: totals_of(rows),
            })
            .collect();

        let mut candidates: Vec<Vec<Candidate>> = converted
            .iter()
            .map(|rows| {
                if self.settings.eliminate_intercompany {
                    self.candidates(rows)
                } else {
                    Vec::new()
                }
            })
            .collect();

        let mut eliminations = Vec::new();
        for ia in 0..candidates.len() {
            for ib in (ia + 1)..candidates.len() {
                let (head, tail) = candidates.split_at_mut(ib);
                let (left, right) = (&mut head[ia], &mut tail[0]);
                for (i, j) in match_entities(left, ia, right, ib, self.settings.elimination_tolerance) {
                    eliminations.push(self.elimination(ia, &left[i], ib, &right[j]));
                }
            }
        }

        let mut unreconciled = Vec::new();
        let mut batch = Vec::new();
        for (index, rows) in converted.into_iter().enumerate() {
            let entity_id = &self.entities[index].0;
            let eliminated: HashSet<usize> = candidates[index]
                .iter()
                .filter(|c| c.matched)
                .map(|c| c.position)
                .collect();
            for candidate in candidates[index].iter().filter(|c| !c.matched) {
                let reason = match candidate.counterparty {
                    Some(other) => format!(
                        "No matching balance found in entity '{}'",
                        self.entities[other].0
                    ),
                    None => "No counterpart found in any other entity".to_string(),
                };
                warn!(
                    entity = %entity_id,
                    row_id = %candidate.row_id,
                    amount = %candidate.amount,
                    "Unreconciled intercompany balance"
                );
                unreconciled.push(UnreconciledIntercompany {
                    entity_id: entity_id.clone(),
                    row_id: candidate.row_id.clone(),
                    amount: candidate.amount,
                    reason,
                });
            }
            batch.extend(
                rows.into_iter()
                    .enumerate()
                    .filter(|(position, _)| !eliminated.contains(position))
                    .map(|(_, row)| row),
            );
        }

        let totals = totals_of(&batch);
        info!(
            entities = self.entities.len(),
            base_currency = %self.settings.base_currency,
            eliminations = eliminations.len(),
            unreconciled = unreconciled.len(),
            rows = totals.row_count,
            "Consolidation complete"
        );

        Ok(ConsolidationResult {
            base_currency: self.settings.base_currency.clone(),
            batch,
            eliminations,
            unreconciled,
            entity_totals,
            totals,
        })
    }

    fn check_reconciliation(&self) -> Result<(), ConsolidationError> {
        for (entity_id, rows) in &self.entities {
            let totals = totals_of(rows);
            if !totals.is_balanced_within(self.settings.reconciliation_tolerance) {
                return Err(ConsolidationError::Reconciliation {
                    entity: entity_id.clone(),
                    debits: totals.debits,
                    credits: totals.credits,
                });
            }
        }
        Ok(())
    }

    fn convert_entity<R>(
        &self,
        entity_id: &EntityId,
        rows: &[ClassifiedTransaction],
        rates: &R,
    ) -> Result<Vec<ClassifiedTransaction>, ConsolidationError>
    where
        R: RateLookup + ?Sized,
    {
        let base = &self.settings.base_currency;
        rows.iter()
            .map(|row| {
                let tx = &row.transaction;
                if tx.currency == *base {
                    return Ok(row.clone());
                }
                let converted =
                    CurrencyService::convert_to_base(tx.signed_amount, &tx.currency, base, tx.date, rates)
                        .ok_or_else(|| ConsolidationError::MissingRate {
                            entity: entity_id.clone(),
                            currency: tx.currency.clone(),
                            date: tx.date,
                            row_id: tx.row_id.clone(),
                        })?;
                Ok(ClassifiedTransaction {
                    transaction: tx.restated(converted, base.clone()),
                    classification: row.classification.clone(),
                })
            })
            .collect()
    }

    fn candidates(&self, rows: &[ClassifiedTransaction]) -> Vec<Candidate> {
        let phrases: Vec<String> = self
            .entities
            .iter()
            .map(|(id, _)| entity_phrase(id))
            .collect();

        rows.iter()
            .enumerate()
            .filter_map(|(position, row)| {
                let description = normalize_text(&row.transaction.description);
                let is_intercompany = row.account_type() == AccountType::Intercompany
                    || self.settings.is_intercompany(&description);
                if !is_intercompany || row.transaction.signed_amount.is_zero() {
                    return None;
                }
                let counterparty =
                    self.entities
                        .iter()
                        .zip(&phrases)
                        .position(|((entity_id, _), phrase)| {
                            *entity_id != row.transaction.entity_id
                                && contains_phrase(&description, phrase)
                        });
                Some(Candidate {
                    position,
                    row_id: row.row_id().clone(),
                    amount: row.transaction.signed_amount,
                    counterparty,
                    matched: false,
                })
            })
            .collect()
    }

    fn elimination(
        &self,
        ia: usize,
        left: &Candidate,
        ib: usize,
        right: &Candidate,
    ) -> EliminationEntry {
        let (a, b) = (left.amount.abs(), right.amount.abs());
        let (entity_a, entity_b) = (&self.entities[ia].0, &self.entities[ib].0);
        EliminationEntry {
            entity_a: entity_a.clone(),
            entity_b: entity_b.clone(),
            amount: a.min(b),
            difference: (a - b).abs(),
            matched_row_ids: vec![left.row_id.clone(), right.row_id.clone()],
            reason: format!("Intercompany balance between '{entity_a}' and '{entity_b}' eliminated"),
        }
    }
}

fn totals_of(rows: &[ClassifiedTransaction]) -> LedgerTotals {
    LedgerTotals::from_amounts(rows.iter().map(|row| row.transaction.signed_amount))
}
