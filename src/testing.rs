//! Test doubles for the provider and source traits.
//!
//! These are deliberately simple scripted mocks: each one replays a
//! queued sequence of replies and records the calls it received, so
//! tests can assert on both outputs and interaction counts.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{AlignmentError, Result};
use crate::traits::ai::{ChatModel, ChatParams};
use crate::traits::embedder::Embedder;
use crate::traits::source::CandidateSource;
use crate::types::candidate::{NewsCandidate, PolicyCandidate};

/// A recorded chat-completion call.
#[derive(Debug, Clone)]
pub struct ChatCall {
    pub system: String,
    pub user: String,
}

/// Scripted [`ChatModel`]. Replies are consumed in the order they were
/// queued; clones share the same queue and call log.
#[derive(Clone, Default)]
pub struct MockChat {
    replies: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    calls: Arc<Mutex<Vec<ChatCall>>>,
}

impl MockChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful completion.
    pub fn with_response(self, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        self
    }

    /// Queue a failed completion.
    pub fn with_error(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, system: &str, user: &str, _params: &ChatParams) -> Result<String> {
        self.calls.lock().unwrap().push(ChatCall {
            system: system.to_string(),
            user: user.to_string(),
        });

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AlignmentError::Provider(message.into())),
            None => Err(AlignmentError::Provider(
                "mock reply queue exhausted".into(),
            )),
        }
    }

    fn model(&self) -> &str {
        "mock-chat"
    }
}

/// Deterministic [`Embedder`] built on hashed bag-of-words vectors.
///
/// Texts sharing words land near each other, so similarity-ordering
/// assertions behave sensibly without a real model. Specific texts can
/// be pinned to fixed vectors with [`MockEmbedder::with_vector`].
#[derive(Clone, Default)]
pub struct MockEmbedder {
    pinned: HashMap<String, Vec<f32>>,
    fail: bool,
}

const MOCK_DIMENSIONS: usize = 32;

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin an exact text to a fixed vector.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.pinned.insert(text.to_string(), vector);
        self
    }

    /// Make every encode call fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn hash_embed(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; MOCK_DIMENSIONS];
        for word in text.to_lowercase().split_whitespace() {
            let mut hash: u64 = 1469598103934665603;
            for byte in word.bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(1099511628211);
            }
            vector[(hash % MOCK_DIMENSIONS as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail {
            return Err(AlignmentError::Embedding("mock encode failure".to_string()));
        }

        Ok(texts
            .iter()
            .map(|text| {
                self.pinned
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| Self::hash_embed(text))
            })
            .collect())
    }

    fn model(&self) -> &str {
        "mock-embedder"
    }
}

/// Scripted [`CandidateSource`] keyed by term. Terms listed as failing
/// return a source error from both searches.
#[derive(Clone, Default)]
pub struct MockSource {
    policy: HashMap<String, Vec<PolicyCandidate>>,
    news: HashMap<String, Vec<NewsCandidate>>,
    failing_terms: Vec<String>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, term: &str, candidates: Vec<PolicyCandidate>) -> Self {
        self.policy.insert(term.to_string(), candidates);
        self
    }

    pub fn with_news(mut self, term: &str, candidates: Vec<NewsCandidate>) -> Self {
        self.news.insert(term.to_string(), candidates);
        self
    }

    /// Make both searches fail for the given term.
    pub fn with_failing_term(mut self, term: &str) -> Self {
        self.failing_terms.push(term.to_string());
        self
    }

    fn check_failure(&self, term: &str) -> Result<()> {
        if self.failing_terms.iter().any(|t| t == term) {
            return Err(AlignmentError::Source(
                format!("scripted failure for term '{term}'").into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CandidateSource for MockSource {
    async fn search_policy_candidates(
        &self,
        term: &str,
        _variants: &[String],
        limit: usize,
    ) -> Result<Vec<PolicyCandidate>> {
        self.check_failure(term)?;
        let mut found = self.policy.get(term).cloned().unwrap_or_default();
        found.truncate(limit);
        Ok(found)
    }

    async fn search_sentiment_candidates(
        &self,
        term: &str,
        _variants: &[String],
        _days_back: u32,
        limit: usize,
    ) -> Result<Vec<NewsCandidate>> {
        self.check_failure(term)?;
        let mut found = self.news.get(term).cloned().unwrap_or_default();
        found.truncate(limit);
        Ok(found)
    }
}
