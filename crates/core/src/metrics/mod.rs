//! Margins, leverage and valuation ratios over the normalized view.

pub mod service;
pub mod types;

pub use service::FinancialMetrics;
pub use types::{BalanceSheetFigures, FinancialRatios};
