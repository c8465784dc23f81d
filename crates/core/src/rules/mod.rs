//! Rule repository: account mappings, keyword tables, adjustment rules and
//! suspicious-pattern thresholds per industry.

pub mod document;
pub mod error;
pub mod matcher;
pub mod repository;
pub mod types;


pub use document::{AdjustmentRuleDocument, IndustryDocument, KeywordRuleDocument, RuleDocument};
pub use error::ConfigurationError;
pub use matcher::{PhraseMatch, PhraseMatcher, PhraseRule, contains_phrase, normalize_text};
pub use repository::RuleRepository;
pub use types::{
    AccountType, AdjustmentCategory, AdjustmentRule, EbitdaComponent, IndustryTemplate,
    SuspiciousPatternThresholds,
};
