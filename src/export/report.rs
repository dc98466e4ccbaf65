//! Markdown quality report.
//!
//! A human-readable review digest of a run: aggregate statistics, the
//! strongest cells, and the cells weak enough to need manual review.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::error::Result;
use crate::types::cell::KnowledgeCell;

/// Cells scoring below this land in the review section.
const REVIEW_THRESHOLD: f64 = 0.5;

/// Rows in the top-cells table.
const TOP_CELLS: usize = 10;

/// Write the quality report for a set of cells.
pub fn write_quality_report(cells: &[KnowledgeCell], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write!(writer, "{}", render(cells))?;
    writer.flush()?;

    info!(cells = cells.len(), path = %path.display(), "wrote quality report");
    Ok(())
}

fn render(cells: &[KnowledgeCell]) -> String {
    let mut out = String::new();
    out.push_str("# Knowledge Cell Quality Report\n\n");
    out.push_str(&format!(
        "Generated: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));

    render_summary(&mut out, cells);
    render_top_cells(&mut out, cells);
    render_review_section(&mut out, cells);
    out
}

fn render_summary(out: &mut String, cells: &[KnowledgeCell]) {
    let total = cells.len();
    let with_policy = cells.iter().filter(|c| !c.policy_evidence.is_empty()).count();
    let with_sentiment = cells
        .iter()
        .filter(|c| !c.sentiment_evidence.is_empty())
        .count();
    let total_policy: usize = cells.iter().map(|c| c.policy_evidence.len()).sum();
    let total_sentiment: usize = cells.iter().map(|c| c.sentiment_evidence.len()).sum();
    let avg_overall = if total == 0 {
        0.0
    } else {
        cells
            .iter()
            .map(|c| c.metadata.quality_metrics.overall_score)
            .sum::<f64>()
            / total as f64
    };

    out.push_str("## Summary\n\n");
    out.push_str("| Metric | Value |\n|---|---|\n");
    out.push_str(&format!("| Total cells | {total} |\n"));
    out.push_str(&format!("| Cells with policy evidence | {with_policy} |\n"));
    out.push_str(&format!(
        "| Cells with sentiment evidence | {with_sentiment} |\n"
    ));
    out.push_str(&format!("| Total policy paragraphs | {total_policy} |\n"));
    out.push_str(&format!("| Total news articles | {total_sentiment} |\n"));
    out.push_str(&format!("| Average overall score | {avg_overall:.3} |\n\n"));
}

fn render_top_cells(out: &mut String, cells: &[KnowledgeCell]) {
    let mut ranked: Vec<&KnowledgeCell> = cells.iter().collect();
    ranked.sort_by(|a, b| {
        b.metadata
            .quality_metrics
            .overall_score
            .total_cmp(&a.metadata.quality_metrics.overall_score)
    });

    out.push_str("## Top Cells\n\n");
    out.push_str("| Concept | Term | Overall | Policy | Sentiment |\n|---|---|---|---|---|\n");
    for cell in ranked.iter().take(TOP_CELLS) {
        let metrics = &cell.metadata.quality_metrics;
        out.push_str(&format!(
            "| {} | {} | {:.3} | {} | {} |\n",
            cell.concept_id,
            cell.primary_term,
            metrics.overall_score,
            metrics.policy_evidence_count,
            metrics.sentiment_evidence_count,
        ));
    }
    out.push('\n');
}

fn render_review_section(out: &mut String, cells: &[KnowledgeCell]) {
    let weak: Vec<&KnowledgeCell> = cells
        .iter()
        .filter(|c| c.metadata.quality_metrics.overall_score < REVIEW_THRESHOLD)
        .collect();

    out.push_str("## Needs Review\n\n");
    if weak.is_empty() {
        out.push_str("No cells below the review threshold.\n");
        return;
    }

    out.push_str(&format!(
        "{} cell(s) scored below {REVIEW_THRESHOLD}:\n\n",
        weak.len()
    ));
    for cell in weak {
        out.push_str(&format!(
            "- **{}** ({}): overall {:.3}, {} policy / {} sentiment\n",
            cell.primary_term,
            cell.concept_id,
            cell.metadata.quality_metrics.overall_score,
            cell.policy_evidence.len(),
            cell.sentiment_evidence.len(),
        ));
    }
}
