//! Typed identifiers for rows, entities, and adjustments.
//!
//! Using typed IDs prevents accidentally passing an `EntityId` where a `RowId` is expected.
//! Row and entity identifiers are assigned upstream (by ingestion), so they wrap the
//! caller's string rather than generating values of their own.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate string-backed typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true when the ID is empty or only whitespace.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

typed_id!(
    RowId,
    "Stable per-row identity assigned at ingestion. The only join key between transactions and classifications."
);
typed_id!(EntityId, "Identifier of a legal entity in a consolidation.");
typed_id!(AdjustmentId, "Identifier of an adjustment in the audit trail.");

impl AdjustmentId {
    /// Creates a fresh time-ordered ID (UUID v7) for manually entered adjustments.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("MAN-{}", Uuid::now_v7()))
    }

    /// Builds the deterministic ID of a rule-derived adjustment.
    #[must_use]
    pub fn for_rule(rule: &str, row_id: &RowId) -> Self {
        Self(format!("{rule}:{row_id}"))
    }
}
