//! In-memory candidate source.
//!
//! Holds both candidate pools as plain vectors and serves the search
//! contract with case-insensitive substring matching, mirroring the SQL
//! `LIKE`-based pre-filter a database-backed source would run. Useful
//! for tests and for runs fed from bulk file loads.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::error::Result;
use crate::traits::source::CandidateSource;
use crate::types::candidate::{NewsCandidate, PolicyCandidate};

/// Vector-backed [`CandidateSource`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    policy: Vec<PolicyCandidate>,
    news: Vec<NewsCandidate>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the policy paragraph pool.
    pub fn with_policy(mut self, policy: Vec<PolicyCandidate>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the news article pool.
    pub fn with_news(mut self, news: Vec<NewsCandidate>) -> Self {
        self.news = news;
        self
    }

    /// Total candidates held, both pools.
    pub fn len(&self) -> usize {
        self.policy.len() + self.news.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policy.is_empty() && self.news.is_empty()
    }
}

/// Lowercased search needles for a term and its variants.
fn needles(term: &str, variants: &[String]) -> Vec<String> {
    let mut needles = vec![term.to_lowercase()];
    needles.extend(variants.iter().map(|v| v.to_lowercase()));
    needles.retain(|n| !n.is_empty());
    needles
}

fn matches_any(text: &str, needles: &[String]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().any(|n| lower.contains(n.as_str()))
}

#[async_trait]
impl CandidateSource for MemorySource {
    async fn search_policy_candidates(
        &self,
        term: &str,
        variants: &[String],
        limit: usize,
    ) -> Result<Vec<PolicyCandidate>> {
        let needles = needles(term, variants);

        let found: Vec<PolicyCandidate> = self
            .policy
            .iter()
            .filter(|c| matches_any(&c.text, &needles))
            .take(limit)
            .cloned()
            .collect();

        debug!(term, found = found.len(), "policy candidate search");
        Ok(found)
    }

    async fn search_sentiment_candidates(
        &self,
        term: &str,
        variants: &[String],
        days_back: u32,
        limit: usize,
    ) -> Result<Vec<NewsCandidate>> {
        let needles = needles(term, variants);
        // Dates are YYYY-MM-DD strings, so lexicographic compare is
        // chronological
        let cutoff = (Utc::now() - Duration::days(i64::from(days_back)))
            .format("%Y-%m-%d")
            .to_string();

        let mut found: Vec<NewsCandidate> = self
            .news
            .iter()
            .filter(|c| c.published_date.as_str() >= cutoff.as_str())
            .filter(|c| {
                matches_any(&c.title, &needles)
                    || c.summary
                        .as_deref()
                        .is_some_and(|s| matches_any(s, &needles))
            })
            .cloned()
            .collect();

        found.sort_by(|a, b| b.published_date.cmp(&a.published_date));
        found.truncate(limit);

        debug!(term, found = found.len(), "sentiment candidate search");
        Ok(found)
    }
}
