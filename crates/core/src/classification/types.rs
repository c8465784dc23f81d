//! Classification output types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finnorm_shared::types::RowId;

use crate::ledger::{Transaction, normalized_amount};
use crate::rules::{AccountType, AdjustmentCategory, EbitdaComponent};

/// Which rule decided a row's account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    /// Exact account-code mapping in the industry template.
    AccountCode,
    /// Industry keyword table.
    IndustryKeyword,
    /// Global keyword fallback table.
    FallbackKeyword,
    /// Nothing matched.
    Unmatched,
}

/// Suspicious pattern kinds, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Revenue row with a negative normalized amount.
    NegativeRevenue,
    /// Large amount that is an exact multiple of the rounding unit.
    LargeRoundAmount,
    /// Description names a related party.
    RelatedParty,
    /// Keyword and account code disagree across statements.
    ClassificationConflict,
    /// No rule classified the row.
    UnknownAccountType,
    /// Intercompany row with no counterpart in the consolidation.
    UnreconciledIntercompany,
}

impl PatternKind {
    /// Severity of this pattern.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::LargeRoundAmount => Severity::Low,
            Self::NegativeRevenue | Self::RelatedParty | Self::UnknownAccountType => {
                Severity::Medium
            }
            Self::ClassificationConflict | Self::UnreconciledIntercompany => Severity::High,
        }
    }

    /// What a reviewer should do about it.
    #[must_use]
    pub const fn suggested_action(self) -> &'static str {
        match self {
            Self::NegativeRevenue => "Verify whether this is a return, refund or misposting",
            Self::LargeRoundAmount => "Confirm the amount against source documents",
            Self::RelatedParty => "Confirm arm's-length terms and consider a normalization",
            Self::ClassificationConflict => "Review the account mapping for this code",
            Self::UnknownAccountType => "Map the account code or add a keyword rule",
            Self::UnreconciledIntercompany => "Locate the counterpart entry in the other entity",
        }
    }
}

/// Flag severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Needs review.
    Medium,
    /// Likely wrong.
    High,
}

/// Classification of one transaction, keyed by row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountClassification {
    /// Row this classification belongs to.
    pub row_id: RowId,
    /// Resolved account type.
    pub account_type: AccountType,
    /// Strongest adjustment category among matching rules.
    pub adjustment_category: AdjustmentCategory,
    /// Suspicious pattern kinds, in evaluation order.
    pub suspicious_flags: Vec<PatternKind>,
    /// Which rule decided `account_type`.
    pub source: ClassificationSource,
    /// Keyword phrase that decided `account_type`, for keyword sources.
    pub matched_keyword: Option<String>,
    /// Adjustment rule that decided `adjustment_category`.
    pub matched_rule: Option<String>,
    /// Keyword-derived type, computed even when the code matched.
    pub keyword_hint: Option<AccountType>,
}

impl AccountClassification {
    /// Returns true when this row needs manual review.
    #[must_use]
    pub fn needs_review(&self) -> bool {
        self.account_type == AccountType::Unknown
    }
}

/// A transaction joined with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedTransaction {
    /// Source row.
    pub transaction: Transaction,
    /// Its classification.
    pub classification: AccountClassification,
}

impl ClassifiedTransaction {
    /// Row id.
    #[must_use]
    pub fn row_id(&self) -> &RowId {
        &self.transaction.row_id
    }

    /// Resolved account type.
    #[must_use]
    pub fn account_type(&self) -> AccountType {
        self.classification.account_type
    }

    /// EBITDA component, for income statement rows.
    #[must_use]
    pub fn component(&self) -> Option<EbitdaComponent> {
        self.classification.account_type.component()
    }

    /// Amount in the account's normal-balance sign.
    #[must_use]
    pub fn normalized_amount(&self) -> Decimal {
        normalized_amount(
            self.classification.account_type,
            self.transaction.signed_amount,
        )
    }
}

/// A suspicious-pattern finding for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousFlag {
    /// Flagged row.
    pub row_id: RowId,
    /// Account code of the row.
    pub account_code: String,
    /// Pattern kind.
    pub kind: PatternKind,
    /// Severity of the kind.
    pub severity: Severity,
    /// What was found.
    pub reason: String,
    /// What to do about it.
    pub suggested_action: String,
}

impl SuspiciousFlag {
    /// Builds a flag with the kind's severity and suggested action.
    #[must_use]
    pub fn new(row_id: RowId, account_code: impl Into<String>, kind: PatternKind, reason: String) -> Self {
        Self {
            row_id,
            account_code: account_code.into(),
            kind,
            severity: kind.severity(),
            reason,
            suggested_action: kind.suggested_action().to_string(),
        }
    }
}
