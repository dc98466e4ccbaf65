//! Alignment engine - orchestrates the per-term alignment workflow.
//!
//! For every input term the engine searches both candidate pools, runs
//! the hybrid ensemble over each pool, filters accepted evidence by the
//! global score floor, and assembles one Knowledge Cell. Terms are
//! processed sequentially; a failure while processing one term degrades
//! that term to an empty cell and never aborts the run.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::aligners::{AlignmentResult, HybridAligner, HYBRID_METHOD};
use crate::error::Result;
use crate::traits::ai::ChatModel;
use crate::traits::embedder::Embedder;
use crate::traits::source::CandidateSource;
use crate::types::candidate::{AlignCandidate, NewsCandidate, PolicyCandidate, PoolKind};
use crate::types::cell::{
    AlignmentScores, CellMetadata, KnowledgeCell, PolicyEvidence, QualityMetrics, ReportMetadata,
    SentimentEvidence, SentimentInfo, TermDefinition,
};
use crate::types::config::AlignmentConfig;
use crate::types::term::Term;

/// Aggregate statistics for one engine run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Cells produced (one per input term)
    pub total_cells: usize,

    /// Cells with at least one policy paragraph
    pub cells_with_policy: usize,

    /// Cells with at least one news article
    pub cells_with_sentiment: usize,

    /// Mean overall quality score across all cells
    pub avg_overall_score: f64,
}

/// Orchestrates candidate search, ensemble alignment, and cell assembly.
pub struct AlignmentEngine<S: CandidateSource> {
    source: S,
    aligner: HybridAligner,
    config: AlignmentConfig,
}

impl<S: CandidateSource> AlignmentEngine<S> {
    /// Build an engine over a candidate source with whichever providers
    /// are available. Strategies without a provider are dropped from
    /// the ensemble with a warning.
    pub fn new(
        source: S,
        config: AlignmentConfig,
        chat: Option<Arc<dyn ChatModel>>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Self {
        let aligner = HybridAligner::from_config(&config, chat, embedder);
        Self {
            source,
            aligner,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Process every term sequentially and return one cell per term,
    /// in input order. A term whose processing fails yields an empty
    /// cell rather than failing the run.
    pub async fn run(&self, terms: &[Term]) -> (Vec<KnowledgeCell>, RunSummary) {
        info!(terms = terms.len(), "starting alignment run");

        let mut cells = Vec::with_capacity(terms.len());
        for term in terms {
            let cell = match self.align_term(term).await {
                Ok(cell) => cell,
                Err(error) => {
                    warn!(term = %term.term, %error, "term failed; emitting empty cell");
                    KnowledgeCell::empty(term.id, &term.term)
                }
            };
            cells.push(cell);
        }

        let summary = summarize(&cells);
        info!(
            total = summary.total_cells,
            with_policy = summary.cells_with_policy,
            with_sentiment = summary.cells_with_sentiment,
            avg_score = summary.avg_overall_score,
            "alignment run complete"
        );
        (cells, summary)
    }

    /// Build one Knowledge Cell for a term.
    pub async fn align_term(&self, term: &Term) -> Result<KnowledgeCell> {
        let definition = term.definition().to_string();
        let variants = term.variants();
        debug!(term = %term.term, variants = variants.len(), "aligning term");

        let mut cell = KnowledgeCell::empty(term.id, &term.term);
        cell.definitions = build_definitions(term);

        let policy_candidates = self
            .source
            .search_policy_candidates(&term.term, &variants, self.config.global.policy_search_limit)
            .await?;
        let news_candidates = self
            .source
            .search_sentiment_candidates(
                &term.term,
                &variants,
                self.config.global.sentiment_time_window_days,
                self.config.global.sentiment_search_limit,
            )
            .await?;

        debug!(
            term = %term.term,
            policy = policy_candidates.len(),
            news = news_candidates.len(),
            "candidate pools loaded"
        );

        cell.policy_evidence = self
            .align_policy_pool(&term.term, &definition, &policy_candidates)
            .await;
        cell.sentiment_evidence = self
            .align_sentiment_pool(&term.term, &definition, &news_candidates)
            .await;

        cell.metadata = CellMetadata::new(QualityMetrics::compute(&cell));
        Ok(cell)
    }

    async fn align_policy_pool(
        &self,
        term: &str,
        definition: &str,
        candidates: &[PolicyCandidate],
    ) -> Vec<PolicyEvidence> {
        let inputs: Vec<AlignCandidate> = candidates.iter().map(AlignCandidate::from).collect();
        let accepted = self
            .accept(term, definition, &inputs, PoolKind::Policy)
            .await;

        let by_id: HashMap<i64, &PolicyCandidate> =
            candidates.iter().map(|c| (c.id, c)).collect();

        accepted
            .into_iter()
            .take(self.config.global.max_policy_evidence)
            .filter_map(|result| {
                by_id
                    .get(&result.candidate_id)
                    .map(|candidate| policy_evidence(candidate, &result))
            })
            .collect()
    }

    async fn align_sentiment_pool(
        &self,
        term: &str,
        definition: &str,
        candidates: &[NewsCandidate],
    ) -> Vec<SentimentEvidence> {
        let inputs: Vec<AlignCandidate> = candidates.iter().map(AlignCandidate::from).collect();
        let accepted = self
            .accept(term, definition, &inputs, PoolKind::Sentiment)
            .await;

        let by_id: HashMap<i64, &NewsCandidate> = candidates.iter().map(|c| (c.id, c)).collect();

        accepted
            .into_iter()
            .take(self.config.global.max_sentiment_evidence)
            .filter_map(|result| {
                by_id
                    .get(&result.candidate_id)
                    .map(|candidate| sentiment_evidence(candidate, &result))
            })
            .collect()
    }

    /// Run the ensemble over one pool, keep results at or above the
    /// score floor, sorted descending by final score.
    async fn accept(
        &self,
        term: &str,
        definition: &str,
        candidates: &[AlignCandidate],
        pool: PoolKind,
    ) -> Vec<AlignmentResult> {
        let mut results: Vec<AlignmentResult> = self
            .aligner
            .align(term, definition, candidates, pool)
            .await
            .into_iter()
            .filter(|r| r.score >= self.config.global.min_final_score)
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }
}

fn build_definitions(term: &Term) -> indexmap::IndexMap<String, TermDefinition> {
    term.translations
        .iter()
        .filter_map(|(language, localized)| {
            let summary = localized.summary.clone()?;
            Some((
                language.clone(),
                TermDefinition {
                    language: language.clone(),
                    term: localized.term.clone().unwrap_or_else(|| term.term.clone()),
                    summary,
                    url: localized.url.clone().unwrap_or_default(),
                    source: "Wikipedia".to_string(),
                },
            ))
        })
        .collect()
}

fn method_scores(result: &AlignmentResult) -> AlignmentScores {
    AlignmentScores {
        llm: result.individual_score("llm"),
        vector: result.individual_score("vector"),
        rule: result.individual_score("rule"),
        final_score: result.score,
    }
}

fn policy_evidence(candidate: &PolicyCandidate, result: &AlignmentResult) -> PolicyEvidence {
    PolicyEvidence {
        source: candidate.source.clone(),
        paragraph_id: candidate.id,
        text: candidate.text.clone(),
        topic: candidate.topic.clone(),
        alignment_scores: method_scores(result),
        alignment_method: HYBRID_METHOD.to_string(),
        report_metadata: ReportMetadata {
            title: candidate.report_title.clone().unwrap_or_default(),
            date: candidate.report_date.clone().unwrap_or_default(),
            section: candidate.section_title.clone(),
        },
    }
}

fn sentiment_evidence(candidate: &NewsCandidate, result: &AlignmentResult) -> SentimentEvidence {
    SentimentEvidence {
        article_id: candidate.id,
        title: candidate.title.clone(),
        source: candidate.source.clone(),
        url: candidate.url.clone(),
        published_date: candidate.published_date.clone(),
        sentiment: SentimentInfo {
            label: candidate
                .sentiment_label
                .clone()
                .unwrap_or_else(|| "neutral".to_string()),
            confidence: candidate.sentiment_confidence.unwrap_or(0.0),
            annotator: "sentiment_pipeline".to_string(),
        },
        alignment_scores: method_scores(result),
    }
}

fn summarize(cells: &[KnowledgeCell]) -> RunSummary {
    let total = cells.len();
    let with_policy = cells.iter().filter(|c| !c.policy_evidence.is_empty()).count();
    let with_sentiment = cells
        .iter()
        .filter(|c| !c.sentiment_evidence.is_empty())
        .count();
    let avg = if total == 0 {
        0.0
    } else {
        cells
            .iter()
            .map(|c| c.metadata.quality_metrics.overall_score)
            .sum::<f64>()
            / total as f64
    };

    RunSummary {
        total_cells: total,
        cells_with_policy: with_policy,
        cells_with_sentiment: with_sentiment,
        avg_overall_score: avg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSource;
    use crate::types::term::LocalizedTerm;

    fn paragraph(id: i64, text: &str) -> PolicyCandidate {
        PolicyCandidate {
            id,
            report_id: 1,
            text: text.to_string(),
            source: "fed".to_string(),
            topic: Some("inflation".to_string()),
            section_title: Some("Outlook".to_string()),
            report_title: Some("Monetary Policy Report".to_string()),
            report_date: Some("2026-06-01".to_string()),
        }
    }

    fn rule_only_config() -> AlignmentConfig {
        let mut config = AlignmentConfig::default();
        config.rule.weight = 1.0;
        config.vector.enabled = false;
        config.llm.enabled = false;
        config.global.min_final_score = 0.1;
        config
    }

    fn inflation_term() -> Term {
        Term::new(1, "Inflation").with_translation(
            "en",
            LocalizedTerm {
                term: Some("Inflation".to_string()),
                summary: Some("A sustained general rise in prices".to_string()),
                url: Some("https://en.wikipedia.org/wiki/Inflation".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn test_align_term_builds_definitions_and_evidence() {
        let source = MockSource::new().with_policy(
            "Inflation",
            vec![paragraph(10, "Inflation pressures eased as prices stabilized")],
        );
        let engine = AlignmentEngine::new(source, rule_only_config(), None, None);

        let cell = engine.align_term(&inflation_term()).await.unwrap();

        assert_eq!(cell.concept_id, "TERM_1");
        assert_eq!(cell.definitions.len(), 1);
        assert_eq!(cell.definitions["en"].term, "Inflation");
        assert_eq!(cell.policy_evidence.len(), 1);
        assert_eq!(cell.policy_evidence[0].paragraph_id, 10);
        assert_eq!(cell.policy_evidence[0].alignment_method, HYBRID_METHOD);
        assert_eq!(cell.policy_evidence[0].report_metadata.date, "2026-06-01");
        assert!(cell.metadata.quality_metrics.overall_score > 0.0);
    }

    #[tokio::test]
    async fn test_evidence_sorted_and_capped() {
        let paragraphs: Vec<PolicyCandidate> = (0..20)
            .map(|i| {
                // Earlier ids mention the term more often, so they score higher
                let mentions = "inflation ".repeat(20 - i as usize);
                paragraph(i, &format!("{mentions} and other factors"))
            })
            .collect();
        let source = MockSource::new().with_policy("Inflation", paragraphs);

        let mut config = rule_only_config();
        config.global.max_policy_evidence = 5;
        let engine = AlignmentEngine::new(source, config, None, None);

        let cell = engine.align_term(&inflation_term()).await.unwrap();
        assert_eq!(cell.policy_evidence.len(), 5);
        let scores: Vec<f64> = cell
            .policy_evidence
            .iter()
            .map(|e| e.alignment_scores.final_score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_threshold_filters_low_scores() {
        let source = MockSource::new().with_policy(
            "Inflation",
            vec![paragraph(1, "completely unrelated zoning ordinance text")],
        );
        let mut config = rule_only_config();
        config.global.min_final_score = 0.65;
        let engine = AlignmentEngine::new(source, config, None, None);

        let cell = engine.align_term(&inflation_term()).await.unwrap();
        assert!(cell.policy_evidence.is_empty());
        assert_eq!(cell.metadata.quality_metrics.overall_score, 0.0);
    }

    #[tokio::test]
    async fn test_run_isolates_term_failures() {
        let source = MockSource::new()
            .with_policy(
                "Inflation",
                vec![paragraph(1, "Inflation expectations remain anchored")],
            )
            .with_failing_term("Deflation");
        let engine = AlignmentEngine::new(source, rule_only_config(), None, None);

        let terms = vec![inflation_term(), Term::new(2, "Deflation")];
        let (cells, summary) = engine.run(&terms).await;

        assert_eq!(cells.len(), 2);
        assert!(!cells[0].policy_evidence.is_empty());
        assert_eq!(cells[1].concept_id, "TERM_2");
        assert!(cells[1].policy_evidence.is_empty());
        assert_eq!(summary.total_cells, 2);
        assert_eq!(summary.cells_with_policy, 1);
    }
}
