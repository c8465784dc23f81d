//! Serialized rule document shape.
//!
//! Sections are `Option` so a missing section can be reported by name instead
//! of surfacing as a generic parse error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::SuspiciousPatternThresholds;

/// Top-level rule document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Global keyword → account-type fallback table, in priority order.
    pub fallback_keywords: Option<Vec<KeywordRuleDocument>>,
    /// Adjustment rules shared by every industry; evaluated before industry rules.
    #[serde(default)]
    pub common_adjustment_rules: Vec<AdjustmentRuleDocument>,
    /// Industry templates keyed by industry name.
    pub industries: Option<BTreeMap<String, IndustryDocument>>,
}

/// Keyword → account-type rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRuleDocument {
    /// Keyword phrase (normalized on load).
    pub keyword: String,
    /// Account-type tag.
    pub account_type: String,
}

/// Adjustment rule as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentRuleDocument {
    /// Unique rule name.
    pub name: String,
    /// Keyword phrases; any of them triggers the rule.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Category tag.
    pub category: String,
    /// Whether the cost is expected to recur.
    #[serde(default)]
    pub is_recurring: bool,
    /// Target component tag for reclassification rules.
    #[serde(default)]
    pub reclassify_to: Option<String>,
    /// Audit explanation.
    #[serde(default)]
    pub reason: String,
}

/// One industry template as written in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndustryDocument {
    /// Revenue account codes → display names.
    pub revenue_accounts: Option<BTreeMap<String, String>>,
    /// COGS account codes → display names.
    pub cogs_accounts: Option<BTreeMap<String, String>>,
    /// Operating expense account codes → display names.
    pub operating_expenses: Option<BTreeMap<String, String>>,
    /// Account codes → account-type tags; wins over the sections above.
    #[serde(default)]
    pub account_overrides: BTreeMap<String, String>,
    /// Industry keyword table, consulted before the global fallback.
    #[serde(default)]
    pub keywords: Vec<KeywordRuleDocument>,
    /// Industry adjustment rules (may be empty, must be present).
    pub adjustment_rules: Option<Vec<AdjustmentRuleDocument>>,
    /// Suspicious-pattern thresholds (fields default individually).
    pub suspicious_pattern_thresholds: Option<SuspiciousPatternThresholds>,
}
