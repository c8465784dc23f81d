//! Normalization runs: one call from raw transactions to the full
//! normalized financial view.

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::NormalizedViewEngine;
pub use error::NormalizationError;
pub use types::{NormalizationConfig, NormalizedFinancialView};
