//! Consolidation types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finnorm_shared::types::{CurrencyCode, EntityId, RowId};

use crate::classification::ClassifiedTransaction;
use crate::ledger::LedgerTotals;
use crate::rules::{SuspiciousPatternThresholds, contains_phrase, normalize_text};

/// Consolidation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationSettings {
    /// Reporting currency.
    pub base_currency: CurrencyCode,
    /// Relative tolerance for pairing intercompany balances (0.005 = 0.5%).
    pub elimination_tolerance: Decimal,
    /// Normalized keywords marking intercompany rows.
    pub intercompany_keywords: Vec<String>,
    /// Match and remove intercompany pairs. When off, entities are only
    /// converted and merged.
    pub eliminate_intercompany: bool,
    /// Fail when an entity's rows do not net to zero.
    pub require_balanced_entities: bool,
    /// Absolute tolerance for the per-entity net check.
    pub reconciliation_tolerance: Decimal,
}

impl ConsolidationSettings {
    /// Settings for `base_currency` using an industry's thresholds.
    #[must_use]
    pub fn from_thresholds(base_currency: CurrencyCode, thresholds: &SuspiciousPatternThresholds) -> Self {
        Self {
            base_currency,
            elimination_tolerance: thresholds.elimination_tolerance,
            intercompany_keywords: thresholds.intercompany_keywords.clone(),
            ..Self::default()
        }
    }

    /// Returns true when the normalized description marks an intercompany row.
    #[must_use]
    pub fn is_intercompany(&self, normalized_text: &str) -> bool {
        self.intercompany_keywords
            .iter()
            .any(|k| contains_phrase(normalized_text, k))
    }
}

impl Default for ConsolidationSettings {
    fn default() -> Self {
        let thresholds = SuspiciousPatternThresholds::default().normalized();
        Self {
            base_currency: CurrencyCode::usd(),
            elimination_tolerance: thresholds.elimination_tolerance,
            intercompany_keywords: thresholds.intercompany_keywords,
            eliminate_intercompany: true,
            require_balanced_entities: false,
            reconciliation_tolerance: Decimal::new(1, 2),
        }
    }
}

/// A matched intercompany pair removed from the consolidated batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminationEntry {
    /// Earlier-registered entity of the pair.
    pub entity_a: EntityId,
    /// Later-registered entity of the pair.
    pub entity_b: EntityId,
    /// Eliminated magnitude (the smaller of the two).
    pub amount: Decimal,
    /// Absolute difference between the two magnitudes.
    pub difference: Decimal,
    /// Row of `entity_a`, then row of `entity_b`.
    pub matched_row_ids: Vec<RowId>,
    /// Audit explanation.
    pub reason: String,
}

/// An intercompany row with no counterpart. It stays in the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreconciledIntercompany {
    /// Entity holding the row.
    pub entity_id: EntityId,
    /// The row.
    pub row_id: RowId,
    /// Amount in the base currency.
    pub amount: Decimal,
    /// Why it stayed.
    pub reason: String,
}

/// Totals of the consolidated batch.
pub type ConsolidatedTotals = LedgerTotals;

/// Per-entity totals in the base currency, before eliminations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTotals {
    /// Entity.
    pub entity_id: EntityId,
    /// Its totals.
    pub totals: LedgerTotals,
}

/// Output of a consolidation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationResult {
    /// Currency every amount is expressed in.
    pub base_currency: CurrencyCode,
    /// Converted rows with eliminated pairs removed, in registration order.
    pub batch: Vec<ClassifiedTransaction>,
    /// Matched pairs.
    pub eliminations: Vec<EliminationEntry>,
    /// Intercompany rows left in the batch.
    pub unreconciled: Vec<UnreconciledIntercompany>,
    /// Per-entity totals before eliminations.
    pub entity_totals: Vec<EntityTotals>,
    /// Totals of `batch`.
    pub totals: ConsolidatedTotals,
}

/// Normalized entity id, for spotting entity names inside descriptions.
pub(crate) fn entity_phrase(entity_id: &EntityId) -> String {
    normalize_text(entity_id.as_str())
}
