//! Suspicious-pattern detection.
//!
//! Kinds are evaluated during classification and stored on the
//! [`AccountClassification`]; [`detect_patterns`] expands them into reviewable
//! flags without touching the batch.

use rust_decimal::Decimal;

use crate::ledger::{NormalBalance, Transaction};
use crate::rules::{AccountType, SuspiciousPatternThresholds};

use super::types::{
    AccountClassification, ClassificationSource, ClassifiedTransaction, PatternKind,
    SuspiciousFlag,
};

/// Evaluates every pattern for one row, in [`PatternKind`] order.
pub(crate) fn evaluate(
    transaction: &Transaction,
    normalized_description: &str,
    account_type: AccountType,
    source: ClassificationSource,
    keyword_hint: Option<AccountType>,
    thresholds: &SuspiciousPatternThresholds,
) -> Vec<PatternKind> {
    let mut kinds = Vec::new();

    if thresholds.flag_negative_revenue
        && account_type == AccountType::Revenue
        && NormalBalance::of(account_type).normalize(transaction.signed_amount) < Decimal::ZERO
    {
        kinds.push(PatternKind::NegativeRevenue);
    }
    if thresholds.is_large_round_amount(transaction.signed_amount) {
        kinds.push(PatternKind::LargeRoundAmount);
    }
    if thresholds.is_related_party(normalized_description) {
        kinds.push(PatternKind::RelatedParty);
    }
    if source == ClassificationSource::AccountCode
        && keyword_hint.is_some_and(|hint| crosses_statements(hint, account_type))
    {
        kinds.push(PatternKind::ClassificationConflict);
    }
    if account_type == AccountType::Unknown {
        kinds.push(PatternKind::UnknownAccountType);
    }

    kinds
}

fn crosses_statements(a: AccountType, b: AccountType) -> bool {
    (a.is_income_statement() && b.is_balance_sheet())
        || (a.is_balance_sheet() && b.is_income_statement())
}

/// Expands the stored pattern kinds of a classified batch into flags.
#[must_use]
pub fn detect_patterns(classified: &[ClassifiedTransaction]) -> Vec<SuspiciousFlag> {
    classified
        .iter()
        .flat_map(|row| {
            row.classification
                .suspicious_flags
                .iter()
                .map(move |kind| flag_for(row, *kind))
        })
        .collect()
}

fn flag_for(row: &ClassifiedTransaction, kind: PatternKind) -> SuspiciousFlag {
    let tx = &row.transaction;
    let reason = describe(tx, &row.classification, kind);
    SuspiciousFlag::new(tx.row_id.clone(), tx.account_code.as_str(), kind, reason)
}

fn describe(tx: &Transaction, classification: &AccountClassification, kind: PatternKind) -> String {
    match kind {
        PatternKind::NegativeRevenue => format!(
            "Revenue account {} carries a debit of {}",
            tx.account_code, tx.signed_amount
        ),
        PatternKind::LargeRoundAmount => {
            format!("Amount {} is a large round number", tx.signed_amount.abs())
        }
        PatternKind::RelatedParty => {
            format!("Description '{}' names a related party", tx.description)
        }
        PatternKind::ClassificationConflict => format!(
            "Account code {} maps to {} but the description reads as {}",
            tx.account_code,
            classification.account_type,
            classification
                .keyword_hint
                .map_or("unknown", AccountType::as_str)
        ),
        PatternKind::UnknownAccountType => format!(
            "No rule classifies account {} ('{}')",
            tx.account_code, tx.description
        ),
        PatternKind::UnreconciledIntercompany => format!(
            "Intercompany amount {} in entity {} has no counterpart",
            tx.signed_amount, tx.entity_id
        ),
    }
}
