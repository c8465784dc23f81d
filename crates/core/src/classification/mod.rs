//! Transaction classification: account type, adjustment category and
//! suspicious-pattern flags per row.

pub mod engine;
pub mod error;
pub mod patterns;
pub mod types;


pub use engine::ClassificationEngine;
pub use error::ClassificationError;
pub use patterns::detect_patterns;
pub use types::{
    AccountClassification, ClassificationSource, ClassifiedTransaction, PatternKind, Severity,
    SuspiciousFlag,
};
