//! Rule repository errors.
//!
//! All of these are fatal and raised while loading, before any transaction is
//! processed.

use thiserror::Error;

/// Errors raised while loading a rule repository.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The document could not be parsed.
    #[error("Rule document is malformed: {0}")]
    Malformed(String),

    /// A required section is absent.
    #[error("Required section '{section}' is missing in {scope}")]
    MissingSection {
        /// "ruleset" or the industry name.
        scope: String,
        /// Section name.
        section: &'static str,
    },

    /// No template is registered under this industry name.
    #[error("Unknown industry '{0}'")]
    UnknownIndustry(String),

    /// The `industries` map is empty.
    #[error("Rule document defines no industries")]
    NoIndustries,

    /// A rule references an account-type tag outside the closed set.
    #[error("Unknown account type '{tag}' in {scope} rule '{rule}'")]
    UnknownAccountType {
        /// "fallback" or the industry name.
        scope: String,
        /// Keyword or account code carrying the tag.
        rule: String,
        /// The offending tag.
        tag: String,
    },

    /// An adjustment rule uses an unknown or unusable category.
    #[error("Unknown adjustment category '{tag}' in rule '{rule}'")]
    UnknownAdjustmentCategory {
        /// Rule name.
        rule: String,
        /// The offending tag.
        tag: String,
    },

    /// A reclassification target is not an EBITDA component.
    #[error("Unknown reclassification target '{tag}' in rule '{rule}'")]
    UnknownComponent {
        /// Rule name.
        rule: String,
        /// The offending tag.
        tag: String,
    },

    /// A reclassification rule has no `reclassify_to`.
    #[error("Reclassification rule '{rule}' has no reclassify_to target")]
    MissingReclassificationTarget {
        /// Rule name.
        rule: String,
    },

    /// A rule has no usable keyword.
    #[error("Rule '{rule}' in {scope} has a blank or missing keyword")]
    BlankKeyword {
        /// "fallback", "common", or the industry name.
        scope: String,
        /// Rule name or position.
        rule: String,
    },

    /// An account code is listed in more than one section of an industry.
    #[error("Account code '{code}' appears in more than one section of industry '{industry}'")]
    DuplicateAccountCode {
        /// Industry name.
        industry: String,
        /// Account code.
        code: String,
    },

    /// Two adjustment rules share a name within an industry.
    #[error("Adjustment rule '{rule}' is defined twice for industry '{industry}'")]
    DuplicateRule {
        /// Industry name.
        industry: String,
        /// Rule name.
        rule: String,
    },

    /// A threshold is out of range.
    #[error("Invalid threshold '{field}' for industry '{industry}': {reason}")]
    InvalidThreshold {
        /// Industry name.
        industry: String,
        /// Field name.
        field: &'static str,
        /// Why it is invalid.
        reason: String,
    },
}

impl ConfigurationError {
    /// Returns the error code for machine-readable output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "MALFORMED_RULES",
            Self::MissingSection { .. } => "MISSING_SECTION",
            Self::UnknownIndustry(_) => "UNKNOWN_INDUSTRY",
            Self::NoIndustries => "NO_INDUSTRIES",
            Self::UnknownAccountType { .. } => "UNKNOWN_ACCOUNT_TYPE",
            Self::UnknownAdjustmentCategory { .. } => "UNKNOWN_ADJUSTMENT_CATEGORY",
            Self::UnknownComponent { .. } => "UNKNOWN_COMPONENT",
            Self::MissingReclassificationTarget { .. } => "MISSING_RECLASSIFICATION_TARGET",
            Self::BlankKeyword { .. } => "BLANK_KEYWORD",
            Self::DuplicateAccountCode { .. } => "DUPLICATE_ACCOUNT_CODE",
            Self::DuplicateRule { .. } => "DUPLICATE_RULE",
            Self::InvalidThreshold { .. } => "INVALID_THRESHOLD",
        }
    }
}

impl From<ConfigurationError> for finnorm_shared::AppError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err.to_string())
    }
}
