//! Knowledge Cell data model - the atomic output unit.
//!
//! Each Knowledge Cell fuses one term's multilingual definitions with
//! its accepted policy and sentiment evidence and derived quality
//! metrics. The serialized field names and nesting are the wire format
//! consumed by dataset exporters and must be preserved exactly.

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A term definition in one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermDefinition {
    /// ISO language code (e.g. "en", "zh")
    pub language: String,

    /// Term in this language
    pub term: String,

    /// Definition/summary text
    pub summary: String,

    /// Source URL
    pub url: String,

    /// Data source name
    #[serde(default = "default_definition_source")]
    pub source: String,
}

fn default_definition_source() -> String {
    "Wikipedia".to_string()
}

/// Per-method score breakdown for one piece of evidence.
///
/// Individual method scores are `None` when that strategy produced no
/// opinion for the candidate (disabled, failed, or skipped).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentScores {
    /// LLM semantic score
    pub llm: Option<f64>,

    /// Vector similarity score
    pub vector: Option<f64>,

    /// Rule-based score
    pub rule: Option<f64>,

    /// Weighted ensemble score
    #[serde(rename = "final")]
    pub final_score: f64,
}

/// Source report info for a policy paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report title
    pub title: String,

    /// Report date (YYYY-MM-DD)
    pub date: String,

    /// Section within the report
    pub section: Option<String>,
}

/// An accepted policy paragraph attached to a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyEvidence {
    /// Source institution ("pboc" or "fed")
    pub source: String,

    /// Id of the paragraph in the candidate source
    pub paragraph_id: i64,

    /// Paragraph text
    pub text: String,

    /// Detected topic
    pub topic: Option<String>,

    /// Scores from the alignment methods
    pub alignment_scores: AlignmentScores,

    /// Primary method used
    pub alignment_method: String,

    /// Source report info
    pub report_metadata: ReportMetadata,
}

/// Sentiment annotation carried over from the news corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentInfo {
    /// Sentiment label (bullish/bearish/neutral)
    pub label: String,

    /// Confidence of the annotation
    pub confidence: f64,

    /// Annotation source
    pub annotator: String,
}

/// An accepted news article attached to a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentEvidence {
    /// Id of the article in the candidate source
    pub article_id: i64,

    /// Article title
    pub title: String,

    /// News outlet
    pub source: String,

    /// Article URL
    pub url: String,

    /// Publication date (YYYY-MM-DD)
    pub published_date: String,

    /// Sentiment annotation
    pub sentiment: SentimentInfo,

    /// Scores from the alignment methods
    pub alignment_scores: AlignmentScores,
}

/// Quality metrics for a Knowledge Cell.
///
/// Purely derived: recomputable from the cell's evidence lists at any
/// time via [`QualityMetrics::compute`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Weighted combination of per-pool mean scores
    pub overall_score: f64,

    /// Number of languages with definitions
    pub language_coverage: usize,

    /// Number of attached policy paragraphs
    pub policy_evidence_count: usize,

    /// Number of attached news articles
    pub sentiment_evidence_count: usize,

    /// Mean final score over policy evidence
    #[serde(default)]
    pub avg_policy_score: f64,

    /// Mean final score over sentiment evidence
    #[serde(default)]
    pub avg_sentiment_score: f64,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl QualityMetrics {
    /// Derive metrics from a cell's definitions and evidence lists.
    ///
    /// The overall score blends the two per-pool means equally when both
    /// pools have evidence, falls back to whichever pool is non-empty,
    /// and is 0.0 when neither has any.
    pub fn compute(cell: &KnowledgeCell) -> Self {
        let policy_scores: Vec<f64> = cell
            .policy_evidence
            .iter()
            .map(|e| e.alignment_scores.final_score)
            .collect();
        let sentiment_scores: Vec<f64> = cell
            .sentiment_evidence
            .iter()
            .map(|e| e.alignment_scores.final_score)
            .collect();

        let avg_policy = mean(&policy_scores);
        let avg_sentiment = mean(&sentiment_scores);

        let overall = match (policy_scores.is_empty(), sentiment_scores.is_empty()) {
            (false, false) => avg_policy * 0.5 + avg_sentiment * 0.5,
            (false, true) => avg_policy,
            (true, false) => avg_sentiment,
            (true, true) => 0.0,
        };

        Self {
            overall_score: round3(overall),
            language_coverage: cell.definitions.len(),
            policy_evidence_count: cell.policy_evidence.len(),
            sentiment_evidence_count: cell.sentiment_evidence.len(),
            avg_policy_score: round3(avg_policy),
            avg_sentiment_score: round3(avg_sentiment),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Generation metadata for a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellMetadata {
    /// ISO timestamp of generation
    pub created_at: String,

    /// Version of the engine that produced the cell
    pub alignment_engine_version: String,

    /// Quality assessment
    pub quality_metrics: QualityMetrics,
}

impl CellMetadata {
    /// Create metadata stamped now, carrying the given metrics.
    pub fn new(quality_metrics: QualityMetrics) -> Self {
        Self {
            created_at: Utc::now().to_rfc3339(),
            alignment_engine_version: env!("CARGO_PKG_VERSION").to_string(),
            quality_metrics,
        }
    }
}

impl Default for CellMetadata {
    fn default() -> Self {
        Self::new(QualityMetrics::default())
    }
}

/// The atomic unit of the aligned dataset.
///
/// Created empty for every input term at the start of a run, populated
/// once by a single orchestrator pass, never updated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeCell {
    /// Concept identifier (`TERM_{id}`)
    pub concept_id: String,

    /// English canonical term
    pub primary_term: String,

    /// Definitions by language code
    #[serde(default)]
    pub definitions: IndexMap<String, TermDefinition>,

    /// Accepted policy paragraphs, sorted descending by final score
    #[serde(default)]
    pub policy_evidence: Vec<PolicyEvidence>,

    /// Accepted news articles, sorted descending by final score
    #[serde(default)]
    pub sentiment_evidence: Vec<SentimentEvidence>,

    /// Generation metadata
    pub metadata: CellMetadata,
}

impl KnowledgeCell {
    /// Create an empty cell for a term.
    pub fn empty(term_id: i64, term: impl Into<String>) -> Self {
        Self {
            concept_id: format!("TERM_{term_id}"),
            primary_term: term.into(),
            definitions: IndexMap::new(),
            policy_evidence: Vec::new(),
            sentiment_evidence: Vec::new(),
            metadata: CellMetadata::default(),
        }
    }

    /// Serialize to a single JSONL line.
    pub fn to_jsonl_line(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a JSONL line.
    pub fn from_jsonl_line(line: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(final_score: f64) -> AlignmentScores {
        AlignmentScores {
            llm: None,
            vector: None,
            rule: Some(final_score),
            final_score,
        }
    }

    fn policy(id: i64, final_score: f64) -> PolicyEvidence {
        PolicyEvidence {
            source: "fed".to_string(),
            paragraph_id: id,
            text: "text".to_string(),
            topic: None,
            alignment_scores: scores(final_score),
            alignment_method: "hybrid_ensemble".to_string(),
            report_metadata: ReportMetadata {
                title: "Report".to_string(),
                date: "2026-01-01".to_string(),
                section: None,
            },
        }
    }

    fn sentiment(id: i64, final_score: f64) -> SentimentEvidence {
        SentimentEvidence {
            article_id: id,
            title: "title".to_string(),
            source: "Bloomberg".to_string(),
            url: "https://example.com".to_string(),
            published_date: "2026-01-01".to_string(),
            sentiment: SentimentInfo {
                label: "neutral".to_string(),
                confidence: 0.9,
                annotator: "layer3".to_string(),
            },
            alignment_scores: scores(final_score),
        }
    }

    #[test]
    fn test_empty_cell_has_zero_metrics() {
        let cell = KnowledgeCell::empty(7, "Inflation");
        assert_eq!(cell.concept_id, "TERM_7");
        assert!(cell.policy_evidence.is_empty());
        assert!(cell.sentiment_evidence.is_empty());
        assert_eq!(cell.metadata.quality_metrics.overall_score, 0.0);
    }

    #[test]
    fn test_quality_metrics_blends_both_pools() {
        let mut cell = KnowledgeCell::empty(1, "Inflation");
        cell.policy_evidence = vec![policy(1, 0.8), policy(2, 0.6)];
        cell.sentiment_evidence = vec![sentiment(1, 0.9)];

        let metrics = QualityMetrics::compute(&cell);
        assert_eq!(metrics.avg_policy_score, 0.7);
        assert_eq!(metrics.avg_sentiment_score, 0.9);
        assert_eq!(metrics.overall_score, 0.8);
        assert_eq!(metrics.policy_evidence_count, 2);
        assert_eq!(metrics.sentiment_evidence_count, 1);
    }

    #[test]
    fn test_quality_metrics_single_pool() {
        let mut cell = KnowledgeCell::empty(1, "Inflation");
        cell.sentiment_evidence = vec![sentiment(1, 0.7)];

        let metrics = QualityMetrics::compute(&cell);
        assert_eq!(metrics.overall_score, 0.7);
        assert_eq!(metrics.avg_policy_score, 0.0);
    }

    #[test]
    fn test_jsonl_round_trip_preserves_wire_fields() {
        let mut cell = KnowledgeCell::empty(3, "Inflation");
        cell.policy_evidence = vec![policy(11, 0.82)];
        cell.metadata = CellMetadata::new(QualityMetrics::compute(&cell));

        let line = cell.to_jsonl_line().unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["concept_id"], "TERM_3");
        assert_eq!(
            value["policy_evidence"][0]["alignment_scores"]["final"],
            0.82
        );

        let parsed = KnowledgeCell::from_jsonl_line(&line).unwrap();
        assert_eq!(parsed.policy_evidence[0].paragraph_id, 11);
    }
}
