//! Adjustment derivation and the three EBITDA levels.
//!
//! - `reported`: straight from the classified batch
//! - `adjusted`: non-recurring items and eliminations removed
//! - `normalized`: adjusted, with reclassifications moved between components

pub mod calculator;
pub mod error;
pub mod statement;
pub mod types;


pub use calculator::AdjustmentCalculator;
pub use error::AdjustmentError;
pub use statement::income_statement;
pub use types::{
    AdjustmentDetail, AdjustmentImpact, AdjustmentOrigin, BeforeAfterComparison,
    EbitdaCalculation, EbitdaMetrics, ImpactStatus, IncomeStatementLine, MetricPolicy,
    RuleOutcome,
};
