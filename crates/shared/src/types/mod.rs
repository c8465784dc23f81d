//! Common types used across the workspace.

pub mod currency;
pub mod id;

pub use currency::{CurrencyCode, InvalidCurrencyCode};
pub use id::*;
