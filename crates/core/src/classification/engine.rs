//! Rule-driven transaction classification.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::ledger::Transaction;
use crate::rules::{
    AccountType, AdjustmentCategory, AdjustmentRule, IndustryTemplate, RuleRepository,
    normalize_text,
};

use super::error::ClassificationError;
use super::patterns;
use super::types::{AccountClassification, ClassificationSource, ClassifiedTransaction};

/// Classifies transactions against a loaded rule repository.
///
/// Holds no state besides the repository reference, so the same engine can
/// classify several entities concurrently.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationEngine<'a> {
    repository: &'a RuleRepository,
}

impl<'a> ClassificationEngine<'a> {
    /// Creates an engine over `repository`.
    #[must_use]
    pub fn new(repository: &'a RuleRepository) -> Self {
        Self { repository }
    }

    /// Classifies a batch. Output is 1:1 with the input and in the same order.
    ///
    /// # Errors
    ///
    /// Returns `ClassificationError::UnknownIndustry` if `industry` has no template,
    /// `BlankRowId` or `DuplicateRowId` if row identity is broken.
    pub fn classify_many(
        &self,
        transactions: &[Transaction],
        industry: &str,
    ) -> Result<Vec<AccountClassification>, ClassificationError> {
        let template = self
            .repository
            .industry(industry)
            .map_err(|_| ClassificationError::UnknownIndustry(industry.to_string()))?;
        validate_row_ids(transactions)?;

        let classifications: Vec<_> = transactions
            .iter()
            .map(|tx| self.classify_one(tx, template))
            .collect();

        let unknown = classifications.iter().filter(|c| c.needs_review()).count();
        info!(
            industry = %template.name,
            rows = classifications.len(),
            unknown,
            "Batch classified"
        );
        Ok(classifications)
    }

    /// Classifies a batch and joins each transaction with its classification.
    ///
    /// # Errors
    ///
    /// Same as [`Self::classify_many`].
    pub fn classify_batch(
        &self,
        transactions: Vec<Transaction>,
        industry: &str,
    ) -> Result<Vec<ClassifiedTransaction>, ClassificationError> {
        let classifications = self.classify_many(&transactions, industry)?;
        Ok(transactions
            .into_iter()
            .zip(classifications)
            .map(|(transaction, classification)| ClassifiedTransaction {
                transaction,
                classification,
            })
            .collect())
    }

    /// Classifies one transaction. Pure in (transaction, template, fallback table).
    #[must_use]
    pub fn classify_one(
        &self,
        transaction: &Transaction,
        template: &IndustryTemplate,
    ) -> AccountClassification {
        let description = normalize_text(&transaction.description);

        let keyword = template
            .keywords
            .best_match(&description)
            .map(|m| (ClassificationSource::IndustryKeyword, m.phrase, *m.value))
            .or_else(|| {
                self.repository
                    .fallback_keywords()
                    .best_match(&description)
                    .map(|m| (ClassificationSource::FallbackKeyword, m.phrase, *m.value))
            });
        let keyword_hint = keyword.map(|(_, _, account_type)| account_type);

        let (account_type, source, matched_keyword) =
            match (template.code_type(&transaction.account_code), keyword) {
                (Some(account_type), _) => (account_type, ClassificationSource::AccountCode, None),
                (None, Some((source, phrase, account_type))) => {
                    (account_type, source, Some(phrase.to_string()))
                }
                (None, None) => {
                    warn!(
                        row_id = %transaction.row_id,
                        account_code = %transaction.account_code,
                        description = %transaction.description,
                        "No rule classifies row; flagged for review"
                    );
                    (AccountType::Unknown, ClassificationSource::Unmatched, None)
                }
            };

        let (adjustment_category, matched_rule) =
            match strongest_rule(&template.adjustment_rules, &description) {
                Some(rule) => (rule.category, Some(rule.name.clone())),
                None => (AdjustmentCategory::NoAdjustment, None),
            };

        let suspicious_flags = patterns::evaluate(
            transaction,
            &description,
            account_type,
            source,
            keyword_hint,
            &template.thresholds,
        );

        debug!(
            row_id = %transaction.row_id,
            account_type = %account_type,
            category = %adjustment_category,
            "Row classified"
        );

        AccountClassification {
            row_id: transaction.row_id.clone(),
            account_type,
            adjustment_category,
            suspicious_flags,
            source,
            matched_keyword,
            matched_rule,
            keyword_hint,
        }
    }
}

/// Rejects blank and duplicate row ids.
fn validate_row_ids(transactions: &[Transaction]) -> Result<(), ClassificationError> {
    let mut seen = HashSet::with_capacity(transactions.len());
    for (position, tx) in transactions.iter().enumerate() {
        if tx.row_id.is_blank() {
            return Err(ClassificationError::BlankRowId { position });
        }
        if !seen.insert(&tx.row_id) {
            return Err(ClassificationError::DuplicateRowId(tx.row_id.clone()));
        }
    }
    Ok(())
}

/// Picks the matching rule with the strongest category; within a category the
/// longest keyword wins and ties go to the earlier rule.
fn strongest_rule<'r>(rules: &'r [AdjustmentRule], description: &str) -> Option<&'r AdjustmentRule> {
    let mut best: Option<(&AdjustmentRule, usize)> = None;
    for rule in rules {
        let Some(keyword) = rule.best_keyword(description) else {
            continue;
        };
        let len = keyword.len();
        let better = best.is_none_or(|(current, current_len)| {
            let (p, q) = (rule.category.precedence(), current.category.precedence());
            p < q || (p == q && len > current_len)
        });
        if better {
            best = Some((rule, len));
        }
    }
    best.map(|(rule, _)| rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::types::PatternKind;
    use chrono::NaiveDate;
    use finnorm_shared::types::{CurrencyCode, EntityId, RowId};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn tx(row: &str, code: &str, description: &str, amount: Decimal) -> Transaction {
        Transaction {
            row_id: RowId::new(row),
            date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            account_code: code.to_string(),
            description: description.to_string(),
            signed_amount: amount,
            entity_id: EntityId::new("OPCO"),
            currency: CurrencyCode::usd(),
        }
    }

    fn repo() -> RuleRepository {
        RuleRepository::builtin().unwrap()
    }

    #[test]
    fn test_account_code_wins_over_keyword() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let result = engine
            .classify_many(&[tx("r1", "4000", "Consulting", dec!(-500))], "generic")
            .unwrap();

        assert_eq!(result[0].account_type, AccountType::Revenue);
        assert_eq!(result[0].source, ClassificationSource::AccountCode);
        assert_eq!(result[0].keyword_hint, Some(AccountType::Opex));
        // Both are income statement types, so no conflict.
        assert!(result[0].suspicious_flags.is_empty());
    }

    #[rstest]
    #[case("Property insurance", AccountType::Opex)]
    #[case("Equipment maintenance", AccountType::Opex)]
    #[case("Equipment insurance", AccountType::Opex)]
    #[case("Office equipment", AccountType::Asset)]
    #[case("Interest expense - term loan", AccountType::Interest)]
    #[case("Accumulated depreciation", AccountType::Asset)]
    fn test_keyword_fallback(#[case] description: &str, #[case] expected: AccountType) {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let result = engine
            .classify_many(&[tx("r1", "9999", description, dec!(100))], "generic")
            .unwrap();

        assert_eq!(result[0].account_type, expected);
        assert_eq!(result[0].source, ClassificationSource::FallbackKeyword);
    }

    #[test]
    fn test_industry_keywords_before_fallback() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let result = engine
            .classify_many(&[tx("r1", "9999", "AWS hosting", dec!(100))], "saas_tech")
            .unwrap();

        assert_eq!(result[0].account_type, AccountType::Cogs);
        assert_eq!(result[0].source, ClassificationSource::IndustryKeyword);
        assert_eq!(result[0].matched_keyword.as_deref(), Some("hosting"));
    }

    #[test]
    fn test_unknown_is_flagged_not_dropped() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let result = engine
            .classify_many(&[tx("r1", "9999", "Zzyzx", dec!(100))], "generic")
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].account_type, AccountType::Unknown);
        assert_eq!(result[0].source, ClassificationSource::Unmatched);
        assert_eq!(
            result[0].suspicious_flags,
            vec![PatternKind::UnknownAccountType]
        );
    }

    #[test]
    fn test_shared_account_code_keeps_one_classification_per_row() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let batch = vec![
            tx("r1", "6300", "Legal fees - litigation", dec!(40000)),
            tx("r2", "6300", "Audit fees", dec!(12000)),
        ];
        let result = engine.classify_many(&batch, "generic").unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].row_id.as_str(), "r1");
        assert_eq!(result[1].row_id.as_str(), "r2");
        assert_eq!(
            result[0].adjustment_category,
            AdjustmentCategory::NonRecurringAddback
        );
        assert_eq!(result[0].matched_rule.as_deref(), Some("legal_fees"));
        assert_eq!(result[1].adjustment_category, AdjustmentCategory::NoAdjustment);
    }

    #[test]
    fn test_addback_outranks_reclassification() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let result = engine
            .classify_many(
                &[tx("r1", "6300", "Swap breakage costs", dec!(120000))],
                "project_finance",
            )
            .unwrap();

        assert_eq!(
            result[0].adjustment_category,
            AdjustmentCategory::NonRecurringAddback
        );
        assert_eq!(result[0].matched_rule.as_deref(), Some("swap_breakage"));
    }

    #[test]
    fn test_conflict_between_statements() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let result = engine
            .classify_many(&[tx("r1", "1500", "Property insurance", dec!(8000))], "generic")
            .unwrap();

        assert_eq!(result[0].account_type, AccountType::Asset);
        assert_eq!(
            result[0].suspicious_flags,
            vec![PatternKind::ClassificationConflict]
        );
    }

    #[test]
    fn test_negative_revenue_round_and_related_party() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let result = engine
            .classify_many(
                &[tx("r1", "4000", "Refund to affiliate", dec!(200000))],
                "generic",
            )
            .unwrap();

        assert_eq!(
            result[0].suspicious_flags,
            vec![
                PatternKind::NegativeRevenue,
                PatternKind::LargeRoundAmount,
                PatternKind::RelatedParty,
            ]
        );
    }

    #[test]
    fn test_unknown_industry() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let err = engine
            .classify_many(&[tx("r1", "4000", "Sales", dec!(-1))], "retail")
            .unwrap_err();
        assert_eq!(err, ClassificationError::UnknownIndustry("retail".to_string()));
    }

    #[test]
    fn test_blank_and_duplicate_row_ids() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);

        let err = engine
            .classify_many(
                &[tx("r1", "4000", "Sales", dec!(-1)), tx("  ", "4000", "Sales", dec!(-1))],
                "generic",
            )
            .unwrap_err();
        assert_eq!(err, ClassificationError::BlankRowId { position: 1 });

        let err = engine
            .classify_many(
                &[tx("r1", "4000", "Sales", dec!(-1)), tx("r1", "5000", "COGS", dec!(1))],
                "generic",
            )
            .unwrap_err();
        assert_eq!(err, ClassificationError::DuplicateRowId(RowId::new("r1")));
    }

    #[test]
    fn test_classify_batch_joins_by_row() {
        let repo = repo();
        let engine = ClassificationEngine::new(&repo);
        let batch = vec![
            tx("a", "4000", "Sales", dec!(-1000)),
            tx("b", "5000", "COGS", dec!(400)),
        ];
        let classified = engine.classify_batch(batch, "generic").unwrap();

        for row in &classified {
            assert_eq!(row.row_id(), &row.classification.row_id);
        }
        assert_eq!(classified[0].normalized_amount(), dec!(1000));
        assert_eq!(classified[1].normalized_amount(), dec!(400));
    }
}
