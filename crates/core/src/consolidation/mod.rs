//! Multi-entity consolidation: currency conversion and intercompany
//! elimination.

pub mod engine;
pub mod error;
pub mod matching;
pub mod types;


pub use engine::ConsolidationEngine;
pub use error::ConsolidationError;
pub use matching::within_tolerance;
pub use types::{
    ConsolidatedTotals, ConsolidationResult, ConsolidationSettings, EliminationEntry,
    EntityTotals, UnreconciledIntercompany,
};
