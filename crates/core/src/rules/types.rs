//! Rule repository data types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::matcher::{PhraseMatcher, contains_phrase, normalize_text};

/// Account type classification. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Sales and other operating revenue (credit-normal).
    Revenue,
    /// Cost of goods sold / cost of revenue.
    Cogs,
    /// Operating expenses, excluding depreciation and amortization.
    Opex,
    /// Depreciation expense.
    Depreciation,
    /// Amortization expense.
    Amortization,
    /// Interest and financing costs.
    Interest,
    /// Balance sheet asset.
    Asset,
    /// Balance sheet liability.
    Liability,
    /// Balance sheet equity.
    Equity,
    /// Intercompany balance or transaction.
    Intercompany,
    /// No rule matched; requires manual review.
    Unknown,
}

impl AccountType {
    /// All account types in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Revenue,
        Self::Cogs,
        Self::Opex,
        Self::Depreciation,
        Self::Amortization,
        Self::Interest,
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Intercompany,
        Self::Unknown,
    ];

    /// Returns the tag used in rule documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Cogs => "cogs",
            Self::Opex => "opex",
            Self::Depreciation => "depreciation",
            Self::Amortization => "amortization",
            Self::Interest => "interest",
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Intercompany => "intercompany",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a rule-document tag. Returns `None` for unknown tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// The EBITDA component this type aggregates into, if any.
    #[must_use]
    pub const fn component(self) -> Option<EbitdaComponent> {
        match self {
            Self::Revenue => Some(EbitdaComponent::Revenue),
            Self::Cogs => Some(EbitdaComponent::Cogs),
            Self::Opex => Some(EbitdaComponent::Opex),
            Self::Depreciation | Self::Amortization => Some(EbitdaComponent::DAndA),
            Self::Interest => Some(EbitdaComponent::Interest),
            Self::Asset
            | Self::Liability
            | Self::Equity
            | Self::Intercompany
            | Self::Unknown => None,
        }
    }

    /// Income statement types.
    #[must_use]
    pub const fn is_income_statement(self) -> bool {
        self.component().is_some()
    }

    /// Balance sheet types.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adjustment category. Closed set.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentCategory {
    /// Non-recurring cost excluded from adjusted EBITDA.
    NonRecurringAddback,
    /// Amount moved from one component to another (e.g., into interest).
    Reclassification,
    /// Item removed entirely (e.g., owner personal expenses).
    Elimination,
    /// No adjustment applies.
    #[default]
    #[serde(rename = "none")]
    NoAdjustment,
}

impl AdjustmentCategory {
    /// Returns the tag used in rule documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NonRecurringAddback => "non_recurring_addback",
            Self::Reclassification => "reclassification",
            Self::Elimination => "elimination",
            Self::NoAdjustment => "none",
        }
    }

    /// Parses a rule-document tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "non_recurring_addback" | "addback" | "add_back" => Some(Self::NonRecurringAddback),
            "reclassification" => Some(Self::Reclassification),
            "elimination" | "eliminate" => Some(Self::Elimination),
            "none" => Some(Self::NoAdjustment),
            _ => None,
        }
    }

    /// Add-backs and eliminations both take the amount out of EBITDA.
    #[must_use]
    pub const fn is_removal(self) -> bool {
        matches!(self, Self::NonRecurringAddback | Self::Elimination)
    }

    /// Precedence when a row matches rules of several categories (lower wins).
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::NonRecurringAddback => 0,
            Self::Reclassification => 1,
            Self::Elimination => 2,
            Self::NoAdjustment => 3,
        }
    }
}

impl std::fmt::Display for AdjustmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Income statement component an amount aggregates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EbitdaComponent {
    /// Revenue.
    Revenue,
    /// Cost of goods sold.
    Cogs,
    /// Operating expenses excluding D&A.
    Opex,
    /// Depreciation and amortization.
    #[serde(rename = "d_and_a")]
    DAndA,
    /// Interest expense (below EBITDA).
    Interest,
}

impl EbitdaComponent {
    /// Returns the tag used in rule documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Cogs => "cogs",
            Self::Opex => "opex",
            Self::DAndA => "d_and_a",
            Self::Interest => "interest",
        }
    }

    /// Parses a rule-document tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "revenue" => Some(Self::Revenue),
            "cogs" => Some(Self::Cogs),
            "opex" => Some(Self::Opex),
            "d_and_a" | "depreciation" | "amortization" => Some(Self::DAndA),
            "interest" => Some(Self::Interest),
            _ => None,
        }
    }
}

impl std::fmt::Display for EbitdaComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword-driven adjustment rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjustmentRule {
    /// Unique rule name, also used in adjustment IDs.
    pub name: String,
    /// Normalized keyword phrases.
    pub keywords: Vec<String>,
    /// Category of the adjustments this rule emits.
    pub category: AdjustmentCategory,
    /// Whether the underlying cost is expected to recur.
    pub is_recurring: bool,
    /// Target component for reclassification rules.
    pub reclassify_to: Option<EbitdaComponent>,
    /// Audit explanation.
    pub reason: String,
}

impl AdjustmentRule {
    /// Returns the longest keyword of this rule found in `normalized_text`.
    #[must_use]
    pub fn best_keyword(&self, normalized_text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .filter(|k| contains_phrase(normalized_text, k))
            .max_by_key(|k| k.len())
            .map(String::as_str)
    }
}

/// Suspicious-pattern thresholds for one industry.
///
/// Every field has a documented default so a partial section is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousPatternThresholds {
    /// Amounts above this magnitude are checked for roundness. Default: 100,000.
    #[serde(default = "default_round_number_threshold")]
    pub round_number_threshold: Decimal,
    /// An amount is "round" when it is a multiple of this unit. Default: 10,000.
    #[serde(default = "default_round_number_unit")]
    pub round_number_unit: Decimal,
    /// Flag negative amounts on revenue accounts. Default: true.
    #[serde(default = "default_flag_negative_revenue")]
    pub flag_negative_revenue: bool,
    /// Related-party keywords matched against descriptions.
    #[serde(default = "default_related_party_keywords")]
    pub related_party_keywords: Vec<String>,
    /// Intercompany keywords used to find elimination candidates.
    #[serde(default = "default_intercompany_keywords")]
    pub intercompany_keywords: Vec<String>,
    /// Relative tolerance for intercompany matching. Default: 0.005 (0.5%).
    #[serde(default = "default_elimination_tolerance")]
    pub elimination_tolerance: Decimal,
}

fn default_round_number_threshold() -> Decimal {
    Decimal::new(100_000, 0)
}

fn default_round_number_unit() -> Decimal {
    Decimal::new(10_000, 0)
}

fn default_flag_negative_revenue() -> bool {
    true
}

fn default_related_party_keywords() -> Vec<String> {
    [
        "related party",
        "affiliate",
        "shareholder loan",
        "parent company",
        "subsidiary",
    ]
    .map(String::from)
    .to_vec()
}

fn default_intercompany_keywords() -> Vec<String> {
    ["intercompany", "due to", "due from"].map(String::from).to_vec()
}

fn default_elimination_tolerance() -> Decimal {
    Decimal::new(5, 3) // 0.005
}

impl Default for SuspiciousPatternThresholds {
    fn default() -> Self {
        Self {
            round_number_threshold: default_round_number_threshold(),
            round_number_unit: default_round_number_unit(),
            flag_negative_revenue: default_flag_negative_revenue(),
            related_party_keywords: default_related_party_keywords(),
            intercompany_keywords: default_intercompany_keywords(),
            elimination_tolerance: default_elimination_tolerance(),
        }
    }
}

impl SuspiciousPatternThresholds {
    /// Returns a copy with every keyword normalized.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for keyword in self
            .related_party_keywords
            .iter_mut()
            .chain(self.intercompany_keywords.iter_mut())
        {
            *keyword = normalize_text(keyword);
        }
        self.related_party_keywords.retain(|k| !k.is_empty());
        self.intercompany_keywords.retain(|k| !k.is_empty());
        self
    }

    /// Returns true when the normalized text names a related party.
    #[must_use]
    pub fn is_related_party(&self, normalized_text: &str) -> bool {
        self.related_party_keywords
            .iter()
            .any(|k| contains_phrase(normalized_text, k))
    }

    /// Returns true when the normalized text marks an intercompany item.
    #[must_use]
    pub fn is_intercompany(&self, normalized_text: &str) -> bool {
        self.intercompany_keywords
            .iter()
            .any(|k| contains_phrase(normalized_text, k))
    }

    /// Returns true when `amount` is a large round number.
    #[must_use]
    pub fn is_large_round_amount(&self, amount: Decimal) -> bool {
        let magnitude = amount.abs();
        magnitude > self.round_number_threshold
            && !self.round_number_unit.is_zero()
            && (magnitude % self.round_number_unit).is_zero()
    }
}

/// Compiled rules for one industry.
#[derive(Debug, Clone)]
pub struct IndustryTemplate {
    /// Industry key (e.g., "saas_tech").
    pub name: String,
    /// Exact account-code mappings.
    pub account_codes: BTreeMap<String, AccountType>,
    /// Display names of mapped account codes.
    pub account_names: BTreeMap<String, String>,
    /// Industry-specific keyword table, consulted before the global fallback.
    pub keywords: PhraseMatcher<AccountType>,
    /// Common and industry-specific adjustment rules, in evaluation order.
    pub adjustment_rules: Vec<AdjustmentRule>,
    /// Suspicious-pattern thresholds.
    pub thresholds: SuspiciousPatternThresholds,
}

impl IndustryTemplate {
    /// Exact account-code lookup. Codes are compared after trimming whitespace.
    #[must_use]
    pub fn code_type(&self, account_code: &str) -> Option<AccountType> {
        self.account_codes.get(account_code.trim()).copied()
    }

    /// Display name configured for an account code.
    #[must_use]
    pub fn account_name(&self, account_code: &str) -> Option<&str> {
        self.account_names
            .get(account_code.trim())
            .map(String::as_str)
    }
}
