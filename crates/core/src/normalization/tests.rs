//! End-to-end normalization runs.
//!
//! - Single entity: classification through ratios in one call
//! - Multi-entity: intercompany pairs eliminated, leftovers flagged
//! - Foreign rows converted; a missing rate stops the run
//! - Same inputs, same view

use chrono::NaiveDate;
use finnorm_shared::AppError;
use finnorm_shared::config::NormalizerSettings;
use finnorm_shared::types::{AdjustmentId, CurrencyCode, EntityId, RowId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::engine::NormalizedViewEngine;
use super::error::NormalizationError;
use super::types::NormalizationConfig;
use crate::adjustments::{AdjustmentDetail, AdjustmentOrigin};
use crate::classification::{ClassificationError, PatternKind};
use crate::consolidation::ConsolidationError;
use crate::ledger::Transaction;
use crate::rules::{AdjustmentCategory, ConfigurationError, EbitdaComponent, RuleRepository};

fn tx(entity: &str, row: &str, code: &str, description: &str, amount: Decimal, currency: &str) -> Transaction {
    Transaction {
        row_id: RowId::new(row),
        date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        account_code: code.to_string(),
        description: description.to_string(),
        signed_amount: amount,
        entity_id: EntityId::new(entity),
        currency: CurrencyCode::new(currency).unwrap(),
    }
}

fn no_rates(_: &CurrencyCode, _: NaiveDate) -> Option<Decimal> {
    None
}

fn eur_rates(currency: &CurrencyCode, _: NaiveDate) -> Option<Decimal> {
    (currency.as_str() == "EUR").then_some(dec!(1.1))
}

fn opco_rows() -> Vec<Transaction> {
    vec![
        tx("OPCO", "r1", "4000", "Product revenue", dec!(-1000000), "USD"),
        tx("OPCO", "r2", "5000", "Cost of goods sold", dec!(400000), "USD"),
        tx("OPCO", "r3", "6000", "Salaries", dec!(317000), "USD"),
    ]
}

#[test]
fn test_single_entity_view() {
    let repo = RuleRepository::builtin().unwrap();
    let config = NormalizationConfig {
        enterprise_value: Some(dec!(2830000)),
        ..NormalizationConfig::default()
    };
    let view = NormalizedViewEngine::new(&repo)
        .generate_normalized_view(opco_rows(), Vec::new(), &config, &no_rates)
        .unwrap();

    assert_eq!(view.industry, "generic");
    assert_eq!(view.entities, vec![EntityId::new("OPCO")]);
    assert_eq!(view.batch.len(), 3);
    assert_eq!(view.totals.row_count, 3);
    assert!(view.eliminations.is_empty());
    assert_eq!(view.metrics.reported.ebitda, dec!(283000));
    assert_eq!(view.metrics.normalized.ebitda, dec!(283000));
    assert_eq!(view.ratios.ebitda_margin, Some(dec!(28.30)));
    assert_eq!(view.ratios.ev_to_ebitda, Some(dec!(10)));
    assert_eq!(view.reported_income_statement, view.normalized_income_statement);
}

#[test]
fn test_manual_adjustment_reaches_every_output() {
    let repo = RuleRepository::builtin().unwrap();
    let manual = AdjustmentDetail {
        id: AdjustmentId::new("m1"),
        name: "Recruiting bonus".to_string(),
        category: AdjustmentCategory::NonRecurringAddback,
        source_row_id: Some(RowId::new("r3")),
        component: EbitdaComponent::Opex,
        reclassify_to: None,
        amount: dec!(10000),
        is_recurring: false,
        reason: "One-time signing bonus".to_string(),
        origin: AdjustmentOrigin::Manual,
    };
    let view = NormalizedViewEngine::new(&repo)
        .generate_normalized_view(
            opco_rows(),
            vec![manual],
            &NormalizationConfig::default(),
            &no_rates,
        )
        .unwrap();

    assert_eq!(view.metrics.reported.ebitda, dec!(283000));
    assert_eq!(view.metrics.adjusted.ebitda, dec!(293000));
    assert_eq!(view.metrics.normalized.ebitda, dec!(293000));
    assert!(
        view.impact_analysis
            .iter()
            .any(|i| i.adjustment_id == Some(AdjustmentId::new("m1")) && i.ebitda_impact == dec!(10000))
    );
    let salaries = view
        .before_after
        .iter()
        .find(|line| line.account_code == "6000")
        .unwrap();
    assert_eq!(salaries.before_amount, dec!(317000));
    assert_eq!(salaries.after_amount, dec!(307000));
}

#[test]
fn test_multi_entity_eliminates_and_flags() {
    let repo = RuleRepository::builtin().unwrap();
    let mut rows = opco_rows();
    rows.push(tx("OPCO", "r4", "", "Due from HoldCo", dec!(50000), "USD"));
    rows.push(tx("HOLDCO", "h1", "", "Due to OpCo", dec!(-50000), "USD"));
    rows.push(tx("HOLDCO", "h2", "", "Due to Parent", dec!(-20000), "USD"));

    let view = NormalizedViewEngine::new(&repo)
        .generate_normalized_view(rows, Vec::new(), &NormalizationConfig::default(), &no_rates)
        .unwrap();

    assert_eq!(view.entities, vec![EntityId::new("OPCO"), EntityId::new("HOLDCO")]);
    assert_eq!(view.eliminations.len(), 1);
    assert_eq!(
        view.eliminations[0].matched_row_ids,
        vec![RowId::new("r4"), RowId::new("h1")]
    );
    assert_eq!(view.unreconciled.len(), 1);
    assert!(view.flags.iter().any(|f| {
        f.row_id == RowId::new("h2") && f.kind == PatternKind::UnreconciledIntercompany
    }));
    assert!(view.batch.iter().all(|r| r.row_id().as_str() != "r4"));
    assert_eq!(view.totals.row_count, 4);
    assert_eq!(view.metrics.reported.ebitda, dec!(283000));
}

#[test]
fn test_single_entity_intercompany_balance_is_flagged() {
    let repo = RuleRepository::builtin().unwrap();
    let mut rows = opco_rows();
    rows.push(tx("OPCO", "r9", "", "Due to Parent", dec!(-10000), "USD"));

    let view = NormalizedViewEngine::new(&repo)
        .generate_normalized_view(rows, Vec::new(), &NormalizationConfig::default(), &no_rates)
        .unwrap();

    assert!(view.eliminations.is_empty());
    assert_eq!(view.unreconciled.len(), 1);
    assert_eq!(view.unreconciled[0].row_id, RowId::new("r9"));
    assert!(view.flags.iter().any(|f| {
        f.row_id == RowId::new("r9") && f.kind == PatternKind::UnreconciledIntercompany
    }));
    assert_eq!(view.batch.len(), 4);
}

#[test]
fn test_consolidate_off_keeps_intercompany_rows() {
    let repo = RuleRepository::builtin().unwrap();
    let rows = vec![
        tx("OPCO", "r1", "", "Due from HoldCo", dec!(50000), "USD"),
        tx("HOLDCO", "h1", "", "Due to OpCo", dec!(-50000), "USD"),
    ];
    let config = NormalizationConfig {
        consolidate: false,
        ..NormalizationConfig::default()
    };
    let view = NormalizedViewEngine::new(&repo)
        .generate_normalized_view(rows, Vec::new(), &config, &no_rates)
        .unwrap();

    assert!(view.eliminations.is_empty());
    assert_eq!(view.batch.len(), 2);
}

#[test]
fn test_foreign_entity_is_converted() {
    let repo = RuleRepository::builtin().unwrap();
    let mut rows = opco_rows();
    rows.push(tx("EUCO", "e1", "4000", "Product revenue", dec!(-100000), "EUR"));

    let view = NormalizedViewEngine::new(&repo)
        .generate_normalized_view(rows, Vec::new(), &NormalizationConfig::default(), &eur_rates)
        .unwrap();

    assert_eq!(view.metrics.reported.revenue, dec!(1110000));
    assert!(view.batch.iter().all(|r| r.transaction.currency == CurrencyCode::usd()));
}

#[test]
fn test_missing_rate_stops_the_run() {
    let repo = RuleRepository::builtin().unwrap();
    let rows = vec![tx("EUCO", "e1", "4000", "Product revenue", dec!(-100000), "EUR")];
    let err = NormalizedViewEngine::new(&repo)
        .generate_normalized_view(rows, Vec::new(), &NormalizationConfig::default(), &no_rates)
        .unwrap_err();

    assert!(matches!(
        err,
        NormalizationError::Consolidation(ConsolidationError::MissingRate { .. })
    ));
    assert_eq!(err.error_code(), "MISSING_RATE");
    assert_eq!(AppError::from(err).exit_code(), 66);
}

#[test]
fn test_input_errors() {
    let repo = RuleRepository::builtin().unwrap();
    let engine = NormalizedViewEngine::new(&repo);

    let config = NormalizationConfig {
        industry: "shipbuilding".to_string(),
        ..NormalizationConfig::default()
    };
    let err = engine
        .generate_normalized_view(opco_rows(), Vec::new(), &config, &no_rates)
        .unwrap_err();
    assert!(matches!(
        err,
        NormalizationError::Configuration(ConfigurationError::UnknownIndustry(_))
    ));

    let mut rows = opco_rows();
    rows.push(tx("OPCO", "r1", "6100", "Rent", dec!(1000), "USD"));
    let err = engine
        .generate_normalized_view(rows, Vec::new(), &NormalizationConfig::default(), &no_rates)
        .unwrap_err();
    assert_eq!(
        err,
        NormalizationError::Classification(ClassificationError::DuplicateRowId(RowId::new("r1")))
    );

    let mut rows = opco_rows();
    rows.push(tx("HOLDCO", "r1", "6100", "Rent", dec!(1000), "USD"));
    let err = engine
        .generate_normalized_view(rows, Vec::new(), &NormalizationConfig::default(), &no_rates)
        .unwrap_err();
    assert!(matches!(
        err,
        NormalizationError::Consolidation(ConsolidationError::DuplicateRowId { .. })
    ));
}

#[test]
fn test_unbalanced_entity_rejected_when_required() {
    let repo = RuleRepository::builtin().unwrap();
    let config = NormalizationConfig {
        require_balanced_entities: true,
        ..NormalizationConfig::default()
    };
    let err = NormalizedViewEngine::new(&repo)
        .generate_normalized_view(opco_rows(), Vec::new(), &config, &no_rates)
        .unwrap_err();

    assert!(matches!(
        err,
        NormalizationError::Consolidation(ConsolidationError::Reconciliation { .. })
    ));
}

#[test]
fn test_config_from_settings() {
    let settings = NormalizerSettings {
        industry: "saas_tech".to_string(),
        enterprise_value: Some(dec!(5000000)),
        ..NormalizerSettings::default()
    };
    let config = NormalizationConfig::from_settings(&settings);

    assert_eq!(config.industry, "saas_tech");
    assert_eq!(config.base_currency, CurrencyCode::usd());
    assert!(config.consolidate);
    assert_eq!(config.reconciliation_tolerance, dec!(0.01));
    assert_eq!(config.enterprise_value, Some(dec!(5000000)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Identical inputs give identical views.
    #[test]
    fn prop_view_is_deterministic(
        amounts in prop::collection::vec((0usize..4, -1_000_000i64..1_000_000), 1..20),
    ) {
        let repo = RuleRepository::builtin().unwrap();
        let entities = ["OPCO", "HOLDCO", "FINCO", "PROPCO"];
        let rows: Vec<_> = amounts
            .iter()
            .enumerate()
            .map(|(i, (entity, amount))| {
                tx(entities[*entity], &format!("r{i}"), "", "Intercompany loan", Decimal::from(*amount), "USD")
            })
            .collect();
        let engine = NormalizedViewEngine::new(&repo);
        let config = NormalizationConfig::default();

        let first = engine.generate_normalized_view(rows.clone(), Vec::new(), &config, &no_rates).unwrap();
        let second = engine.generate_normalized_view(rows, Vec::new(), &config, &no_rates).unwrap();
        prop_assert_eq!(first, second);
    }
}
