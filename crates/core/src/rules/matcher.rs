//! Description normalization and ordered phrase matching.
//!
//! Rules are an ordered list of `(phrase, value)` pairs. A phrase matches on
//! whole-word boundaries of the normalized text, and the longest matching phrase
//! wins; equal lengths resolve to the earlier rule. This is what lets
//! "equipment maintenance" beat a bare "equipment" rule.

use serde::Serialize;

/// Lower-cases `text`, replaces every non-alphanumeric character with a space,
/// and collapses runs of whitespace.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let mapped: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true when `phrase` occurs in `text` on word boundaries.
///
/// Both arguments must already be normalized.
#[must_use]
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let bytes = text.as_bytes();
    text.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let starts_word = start == 0 || bytes[start - 1] == b' ';
        let ends_word = end == bytes.len() || bytes[end] == b' ';
        starts_word && ends_word
    })
}

/// One phrase rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseRule<T> {
    /// Normalized phrase.
    pub phrase: String,
    /// Value produced on match.
    pub value: T,
}

/// A phrase that matched, with the value it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseMatch<'a, T> {
    /// The matching phrase.
    pub phrase: &'a str,
    /// The mapped value.
    pub value: &'a T,
}

/// Ordered phrase table with longest-match-wins resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseMatcher<T> {
    rules: Vec<PhraseRule<T>>,
}

impl<T> Default for PhraseMatcher<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> PhraseMatcher<T> {
    /// Builds a matcher from `(phrase, value)` pairs. Phrases are normalized;
    /// phrases that normalize to nothing are dropped.
    #[must_use]
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .filter_map(|(phrase, value)| {
                let phrase = normalize_text(phrase.as_ref());
                (!phrase.is_empty()).then_some(PhraseRule { phrase, value })
            })
            .collect();
        Self { rules }
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates rules in priority order.
    pub fn rules(&self) -> impl Iterator<Item = &PhraseRule<T>> {
        self.rules.iter()
    }

    /// Finds the longest matching phrase in already-normalized text.
    #[must_use]
    pub fn best_match(&self, normalized_text: &str) -> Option<PhraseMatch<'_, T>> {
        let mut best: Option<&PhraseRule<T>> = None;
        for rule in &self.rules {
            if !contains_phrase(normalized_text, &rule.phrase) {
                continue;
            }
            // Strictly longer only, so the earlier rule keeps ties.
            if best.is_none_or(|b| rule.phrase.len() > b.phrase.len()) {
                best = Some(rule);
            }
        }
        best.map(|rule| PhraseMatch {
            phrase: &rule.phrase,
            value: &rule.value,
        })
    }
}
