//! Flattened CSV export.
//!
//! A spreadsheet-friendly view of the dataset: one row per cell with
//! summary columns. The JSONL export stays the canonical format; this
//! one loses the per-evidence detail by design.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::types::cell::KnowledgeCell;

const HEADER: &[&str] = &[
    "concept_id",
    "primary_term",
    "term_zh",
    "definition_en",
    "definition_zh",
    "policy_evidence_count",
    "sentiment_evidence_count",
    "overall_score",
    "avg_policy_score",
    "avg_sentiment_score",
    "top_policy_source",
    "top_policy_text",
    "dominant_sentiment",
];

/// Maximum characters of paragraph text carried into the CSV.
const TEXT_PREVIEW_CHARS: usize = 200;

/// Write one summary row per cell. Starts with a UTF-8 BOM so Excel
/// renders the CJK columns correctly.
pub fn write_csv(cells: &[KnowledgeCell], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(b"\xEF\xBB\xBF")?;
    writeln!(writer, "{}", HEADER.join(","))?;

    for cell in cells {
        let fields = row_fields(cell);
        let quoted: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        writeln!(writer, "{}", quoted.join(","))?;
    }
    writer.flush()?;

    info!(cells = cells.len(), path = %path.display(), "wrote CSV export");
    Ok(())
}

fn row_fields(cell: &KnowledgeCell) -> Vec<String> {
    let metrics = &cell.metadata.quality_metrics;
    let top_policy = cell.policy_evidence.first();

    vec![
        cell.concept_id.clone(),
        cell.primary_term.clone(),
        cell.definitions
            .get("zh")
            .map(|d| d.term.clone())
            .unwrap_or_default(),
        preview(
            cell.definitions
                .get("en")
                .map(|d| d.summary.as_str())
                .unwrap_or(""),
        ),
        preview(
            cell.definitions
                .get("zh")
                .map(|d| d.summary.as_str())
                .unwrap_or(""),
        ),
        metrics.policy_evidence_count.to_string(),
        metrics.sentiment_evidence_count.to_string(),
        format!("{:.3}", metrics.overall_score),
        format!("{:.3}", metrics.avg_policy_score),
        format!("{:.3}", metrics.avg_sentiment_score),
        top_policy.map(|e| e.source.clone()).unwrap_or_default(),
        preview(top_policy.map(|e| e.text.as_str()).unwrap_or("")),
        dominant_sentiment(cell).unwrap_or_default(),
    ]
}

/// Most frequent sentiment label across a cell's news evidence.
fn dominant_sentiment(cell: &KnowledgeCell) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for evidence in &cell.sentiment_evidence {
        *counts.entry(evidence.sentiment.label.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(label, _)| label.to_string())
}

fn preview(text: &str) -> String {
    if text.chars().count() <= TEXT_PREVIEW_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
    format!("{truncated}…")
}

/// RFC 4180 quoting: wrap fields containing separators or quotes,
/// doubling embedded quotes.
fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::cell::{
        AlignmentScores, PolicyEvidence, QualityMetrics, ReportMetadata, SentimentEvidence,
        SentimentInfo, TermDefinition,
    };

    fn sentiment(label: &str) -> SentimentEvidence {
        SentimentEvidence {
            article_id: 1,
            title: "title".to_string(),
            source: "Reuters".to_string(),
            url: String::new(),
            published_date: "2026-01-01".to_string(),
            sentiment: SentimentInfo {
                label: label.to_string(),
                confidence: 0.9,
                annotator: "sentiment_pipeline".to_string(),
            },
            alignment_scores: AlignmentScores {
                llm: None,
                vector: None,
                rule: Some(0.8),
                final_score: 0.8,
            },
        }
    }

    #[test]
    fn test_quote_escapes_embedded_quotes_and_commas() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_dominant_sentiment_majority() {
        let mut cell = KnowledgeCell::empty(1, "Inflation");
        cell.sentiment_evidence = vec![
            sentiment("bullish"),
            sentiment("bearish"),
            sentiment("bullish"),
        ];
        assert_eq!(dominant_sentiment(&cell).as_deref(), Some("bullish"));

        cell.sentiment_evidence.clear();
        assert_eq!(dominant_sentiment(&cell), None);
    }

    #[test]
    fn test_csv_has_header_and_row_per_cell() {
        let mut cell = KnowledgeCell::empty(1, "Inflation");
        cell.definitions.insert(
            "en".to_string(),
            TermDefinition {
                language: "en".to_string(),
                term: "Inflation".to_string(),
                summary: "A rise in prices, broadly".to_string(),
                url: String::new(),
                source: "Wikipedia".to_string(),
            },
        );
        cell.policy_evidence = vec![PolicyEvidence {
            source: "fed".to_string(),
            paragraph_id: 9,
            text: "Inflation eased".to_string(),
            topic: None,
            alignment_scores: AlignmentScores {
                llm: None,
                vector: None,
                rule: Some(0.7),
                final_score: 0.7,
            },
            alignment_method: "hybrid_ensemble".to_string(),
            report_metadata: ReportMetadata {
                title: "MPR".to_string(),
                date: "2026-06-01".to_string(),
                section: None,
            },
        }];
        cell.metadata.quality_metrics = QualityMetrics::compute(&cell);

        let dir = std::env::temp_dir().join("alignment-csv-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cells.csv");
        write_csv(&[cell], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let content = content.trim_start_matches('\u{feff}');
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("concept_id,primary_term"));
        assert!(lines[1].starts_with("TERM_1,Inflation"));
        // The definition contains a comma and must be quoted
        assert!(lines[1].contains("\"A rise in prices, broadly\""));
    }
}
