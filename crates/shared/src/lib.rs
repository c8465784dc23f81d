//! Shared types, errors, and configuration for finnorm.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for rows, entities, and adjustments
//! - Validated ISO 4217 currency codes
//! - Application-wide error type
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LoggingSettings, NormalizerSettings, RulesSettings};
pub use error::{AppError, AppResult};
pub use types::{AdjustmentId, CurrencyCode, EntityId, RowId};
