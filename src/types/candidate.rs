//! Candidate types - the unscored evidence pools.
//!
//! Candidates are read-only inputs to alignment; the engine never
//! mutates them.

use serde::{Deserialize, Serialize};

/// Which candidate pool a batch of texts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolKind {
    /// Central-bank policy paragraphs
    Policy,

    /// Sentiment-annotated news articles
    Sentiment,
}

impl PoolKind {
    /// Stable string form, used in logs and prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolKind::Policy => "policy",
            PoolKind::Sentiment => "sentiment",
        }
    }
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A policy paragraph candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyCandidate {
    /// Stable identifier
    pub id: i64,

    /// Identifier of the report the paragraph belongs to
    pub report_id: i64,

    /// Paragraph text
    pub text: String,

    /// Source institution (e.g. "pboc", "fed")
    pub source: String,

    /// Detected topic tag
    #[serde(default)]
    pub topic: Option<String>,

    /// Section title within the report
    #[serde(default)]
    pub section_title: Option<String>,

    /// Report title
    #[serde(default)]
    pub report_title: Option<String>,

    /// Report date (YYYY-MM-DD)
    #[serde(default)]
    pub report_date: Option<String>,
}

/// A news article candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsCandidate {
    /// Stable identifier
    pub id: i64,

    /// Article title
    pub title: String,

    /// Article summary, when the feed provides one
    #[serde(default)]
    pub summary: Option<String>,

    /// News outlet
    pub source: String,

    /// Article URL
    pub url: String,

    /// Publication date (YYYY-MM-DD)
    pub published_date: String,

    /// Prior sentiment label (bullish/bearish/neutral), if annotated
    #[serde(default)]
    pub sentiment_label: Option<String>,

    /// Confidence of the prior sentiment annotation
    #[serde(default)]
    pub sentiment_confidence: Option<f64>,
}

/// The aligner-facing view of a candidate: its id plus the text to score.
///
/// `text` is the primary text (paragraph body, or article title) and is
/// what length-limited consumers such as LLM prompts use. `summary`
/// augments it for the scoring strategies that can afford the longer
/// combined form.
#[derive(Debug, Clone)]
pub struct AlignCandidate {
    /// Id of the underlying candidate
    pub id: i64,

    /// Primary text
    pub text: String,

    /// Optional supplementary text
    pub summary: Option<String>,
}

impl AlignCandidate {
    /// Create a candidate view from primary text only.
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            summary: None,
        }
    }

    /// Primary and supplementary text combined.
    pub fn full_text(&self) -> String {
        match &self.summary {
            Some(summary) => format!("{} {}", self.text, summary),
            None => self.text.clone(),
        }
    }
}

impl From<&PolicyCandidate> for AlignCandidate {
    fn from(p: &PolicyCandidate) -> Self {
        AlignCandidate::new(p.id, p.text.clone())
    }
}

impl From<&NewsCandidate> for AlignCandidate {
    fn from(a: &NewsCandidate) -> Self {
        AlignCandidate {
            id: a.id,
            text: a.title.clone(),
            summary: a.summary.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_combines_title_and_summary() {
        let c = AlignCandidate {
            id: 1,
            text: "Fed raises rates".to_string(),
            summary: Some("The Federal Reserve raised rates by 25bp".to_string()),
        };
        assert_eq!(
            c.full_text(),
            "Fed raises rates The Federal Reserve raised rates by 25bp"
        );
    }

    #[test]
    fn test_pool_kind_display() {
        assert_eq!(PoolKind::Policy.to_string(), "policy");
        assert_eq!(PoolKind::Sentiment.to_string(), "sentiment");
    }
}
