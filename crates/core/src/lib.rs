//! Core business logic for finnorm.
//!
//! Turns raw trial-balance rows from one or more legal entities into a
//! normalized financial view. No file or network access; every operation is a
//! pure function of its inputs.
//!
//! # Modules
//!
//! - `rules` - Industry templates, keyword tables and adjustment rules
//! - `ledger` - Transactions and sign conventions
//! - `classification` - Account type, adjustment category and review flags per row
//! - `adjustments` - Reported, adjusted and normalized EBITDA
//! - `currency` - Exchange rates and decimal rounding
//! - `consolidation` - Multi-entity conversion and intercompany elimination
//! - `metrics` - Margins, leverage and valuation ratios
//! - `normalization` - End-to-end runs

pub mod adjustments;
pub mod classification;
pub mod consolidation;
pub mod currency;
pub mod ledger;
pub mod metrics;
pub mod normalization;
pub mod rules;

pub use normalization::{
    NormalizationConfig, NormalizationError, NormalizedFinancialView, NormalizedViewEngine,
};
pub use rules::RuleRepository;
