//! Ledger rows and balance conventions.
//!
//! - Transactions as delivered by ingestion (trial-balance sign convention)
//! - Normal-balance sign normalization per account type
//! - Debit/credit totals used for reconciliation

pub mod balance;
pub mod transaction;

pub use balance::{LedgerTotals, NormalBalance, normalized_amount};
pub use transaction::Transaction;
