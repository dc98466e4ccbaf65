//! Term types - the alignment query.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One language's rendering of a term: the localized spelling plus an
/// optional definition text and source URL. Fields are optional because
/// upstream translation records are frequently partial.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalizedTerm {
    /// Term spelled in this language
    #[serde(default)]
    pub term: Option<String>,

    /// Definition/summary text in this language
    #[serde(default)]
    pub summary: Option<String>,

    /// Source URL for the definition
    #[serde(default)]
    pub url: Option<String>,
}

/// An economic concept used as the alignment query.
///
/// Immutable once loaded for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    /// Stable identifier
    pub id: i64,

    /// Canonical (English) name
    pub term: String,

    /// Language code -> localized term and definition
    #[serde(default)]
    pub translations: IndexMap<String, LocalizedTerm>,
}

impl Term {
    /// Create a term with no translations.
    pub fn new(id: i64, term: impl Into<String>) -> Self {
        Self {
            id,
            term: term.into(),
            translations: IndexMap::new(),
        }
    }

    /// Add a translation entry.
    pub fn with_translation(
        mut self,
        language: impl Into<String>,
        localized: LocalizedTerm,
    ) -> Self {
        self.translations.insert(language.into(), localized);
        self
    }

    /// Definition text used as the alignment query: the English summary
    /// when present, otherwise the first available one.
    pub fn definition(&self) -> &str {
        if let Some(summary) = self
            .translations
            .get("en")
            .and_then(|t| t.summary.as_deref())
        {
            return summary;
        }

        self.translations
            .values()
            .find_map(|t| t.summary.as_deref())
            .unwrap_or("")
    }

    /// Localized spellings that differ from the canonical term, used to
    /// widen the candidate pre-filter search.
    pub fn variants(&self) -> Vec<String> {
        self.translations
            .values()
            .filter_map(|t| t.term.as_ref())
            .filter(|t| t.as_str() != self.term)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localized(term: &str, summary: &str) -> LocalizedTerm {
        LocalizedTerm {
            term: Some(term.to_string()),
            summary: Some(summary.to_string()),
            url: None,
        }
    }

    #[test]
    fn test_definition_prefers_english() {
        let term = Term::new(1, "Inflation")
            .with_translation("zh", localized("通货膨胀", "物价普遍上涨"))
            .with_translation("en", localized("Inflation", "A general rise in prices"));

        assert_eq!(term.definition(), "A general rise in prices");
    }

    #[test]
    fn test_definition_falls_back_to_any_language() {
        let term =
            Term::new(1, "Inflation").with_translation("zh", localized("通货膨胀", "物价普遍上涨"));

        assert_eq!(term.definition(), "物价普遍上涨");
    }

    #[test]
    fn test_definition_empty_when_no_summaries() {
        let term = Term::new(1, "Inflation");
        assert_eq!(term.definition(), "");
    }

    #[test]
    fn test_variants_exclude_canonical() {
        let term = Term::new(1, "Inflation")
            .with_translation("en", localized("Inflation", "def"))
            .with_translation("zh", localized("通货膨胀", "def"))
            .with_translation("de", localized("Inflation", "def"));

        assert_eq!(term.variants(), vec!["通货膨胀".to_string()]);
    }
}
