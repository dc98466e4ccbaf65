//! CandidateSource trait - the candidate pre-filter search contract.
//!
//! A candidate source supplies the untyped text pools the aligners score.
//! Both searches are best-effort substring matching: false negatives are
//! acceptable, false positives are filtered out downstream by the
//! alignment strategies.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::candidate::{NewsCandidate, PolicyCandidate};

/// Supplies candidate evidence pools for a term.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Find policy paragraphs that plausibly mention the term or any of
    /// its variants. Returns at most `limit` candidates.
    async fn search_policy_candidates(
        &self,
        term: &str,
        variants: &[String],
        limit: usize,
    ) -> Result<Vec<PolicyCandidate>>;

    /// Find news articles published within the last `days_back` days
    /// that plausibly mention the term or any of its variants in title
    /// or summary. Returns at most `limit` candidates.
    async fn search_sentiment_candidates(
        &self,
        term: &str,
        variants: &[String],
        days_back: u32,
        limit: usize,
    ) -> Result<Vec<NewsCandidate>>;
}
