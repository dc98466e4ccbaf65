//! Rule-based keyword aligner.
//!
//! Deterministic and explainable, no external calls. Extracts a keyword
//! set from the term and its definition, then scores each candidate from
//! four signals combined with fixed weights:
//! direct substring match (0.4), Jaccard keyword overlap (0.3), capped
//! keyword frequency (0.2), fuzzy term-variant match (0.1).

use std::collections::BTreeSet;

use serde_json::json;

use super::{clamp_score, AlignmentResult};
use crate::types::candidate::{AlignCandidate, PoolKind};
use crate::types::config::RuleConfig;

/// Stopwords excluded from keyword extraction. English function words
/// plus common CJK particles.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "need", "dare", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as",
    "into", "through", "during", "before", "after", "above", "below", "between", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own",
    "same", "so", "than", "too", "very", "just", "and", "but", "if", "or", "because", "until",
    "while", "although", "this", "that", "these", "those", "it", "its", "which", "who", "的",
    "是", "在", "了", "和", "与", "或", "等", "及", "把", "被",
];

/// Method name attached to results from this aligner.
pub const RULE_METHOD: &str = "rule_keyword";

/// Deterministic keyword/Jaccard scoring strategy.
pub struct RuleAligner {
    config: RuleConfig,
}

impl RuleAligner {
    /// Create from configuration.
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// Whether this strategy participates in the ensemble.
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Ensemble contribution weight.
    pub fn weight(&self) -> f64 {
        self.config.weight
    }

    /// Score all candidates. Pure: identical inputs always produce
    /// identical outputs.
    pub fn align(
        &self,
        term: &str,
        definition: &str,
        candidates: &[AlignCandidate],
        _pool: PoolKind,
    ) -> Vec<AlignmentResult> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let term_keywords = extract_keywords(&format!("{term} {definition}"));

        candidates
            .iter()
            .map(|candidate| {
                let text = candidate.full_text();
                let score = self.score(term, &term_keywords, &text);

                let candidate_keywords = extract_keywords(&text);
                let matched: Vec<&String> =
                    term_keywords.intersection(&candidate_keywords).collect();

                let reason = if matched.is_empty() {
                    None
                } else {
                    let shown: Vec<&str> =
                        matched.iter().take(5).map(|s| s.as_str()).collect();
                    Some(format!("Matched: {}", shown.join(", ")))
                };

                let mut result = AlignmentResult::new(candidate.id, score, RULE_METHOD)
                    .with_metadata("matched_keywords", json!(matched))
                    .with_metadata("match_count", json!(matched.len()))
                    .with_metadata("term_keywords_count", json!(term_keywords.len()));
                if let Some(reason) = reason {
                    result = result.with_reason(reason);
                }
                result
            })
            .collect()
    }

    /// Combine the four signals with fixed weights.
    fn score(&self, term: &str, term_keywords: &BTreeSet<String>, candidate_text: &str) -> f64 {
        if term_keywords.is_empty() {
            return 0.0;
        }

        let candidate_lower = candidate_text.to_lowercase();
        let term_lower = term.to_lowercase();

        let direct_match = if candidate_lower.contains(&term_lower) {
            1.0
        } else {
            0.0
        };

        let candidate_keywords = extract_keywords(candidate_text);
        let overlap_score = if candidate_keywords.is_empty() {
            0.0
        } else {
            let matched = term_keywords.intersection(&candidate_keywords).count();
            let union = term_keywords.union(&candidate_keywords).count();
            matched as f64 / union as f64
        };

        let mut freq_score = 0.0;
        for keyword in term_keywords {
            let count = candidate_lower.matches(keyword.as_str()).count();
            if count > 0 {
                freq_score += (count as f64 * 0.1).min(0.3);
            }
        }
        let freq_score = freq_score.min(1.0);

        let fuzzy_score = if self.config.use_fuzzy {
            fuzzy_match_score(&term_lower, &candidate_lower)
        } else {
            0.0
        };

        clamp_score(direct_match * 0.4 + overlap_score * 0.3 + freq_score * 0.2 + fuzzy_score * 0.1)
    }
}

/// Longest CJK n-gram emitted as a keyword. Chinese terms of interest
/// here are 2-4 characters; longer windows add noise, not signal.
const MAX_CJK_NGRAM: usize = 4;

/// Extract meaningful keywords from text: lowercase Latin words longer
/// than two characters minus stopwords, unioned with the 2- to
/// 4-character substrings of every CJK run.
fn extract_keywords(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    let mut keywords = BTreeSet::new();

    let mut latin = String::new();
    let mut cjk: Vec<char> = Vec::new();

    fn flush_latin(buf: &mut String, out: &mut BTreeSet<String>) {
        if buf.len() > 2 && !STOPWORDS.contains(&buf.as_str()) {
            out.insert(buf.clone());
        }
        buf.clear();
    }
    fn flush_cjk(run: &mut Vec<char>, out: &mut BTreeSet<String>) {
        for len in 2..=MAX_CJK_NGRAM.min(run.len()) {
            for window in run.windows(len) {
                out.insert(window.iter().collect());
            }
        }
        run.clear();
    }

    for ch in lower.chars() {
        if ch.is_ascii_alphabetic() {
            flush_cjk(&mut cjk, &mut keywords);
            latin.push(ch);
        } else if is_cjk(ch) {
            flush_latin(&mut latin, &mut keywords);
            cjk.push(ch);
        } else {
            flush_latin(&mut latin, &mut keywords);
            flush_cjk(&mut cjk, &mut keywords);
        }
    }
    flush_latin(&mut latin, &mut keywords);
    flush_cjk(&mut cjk, &mut keywords);

    keywords
}

fn is_cjk(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

/// 0.8 when any common variant of the term appears in the text, else 0.
fn fuzzy_match_score(term_lower: &str, text_lower: &str) -> f64 {
    generate_variants(term_lower)
        .iter()
        .any(|v| text_lower.contains(v.as_str()))
        .then_some(0.8)
        .unwrap_or(0.0)
}

/// Generate common spelling variants of a term: singular/plural,
/// -tion/-ting suffix swaps, -ary/-ory, and hyphen/joined forms of
/// multi-word terms.
fn generate_variants(term: &str) -> Vec<String> {
    let mut variants = vec![term.to_string()];

    if let Some(stem) = term.strip_suffix('s') {
        variants.push(stem.to_string());
    } else {
        variants.push(format!("{term}s"));
    }

    if let Some(stem) = term.strip_suffix("tion") {
        variants.push(format!("{stem}ting"));
        variants.push(format!("{stem}t"));
    } else if let Some(stem) = term.strip_suffix("ting") {
        variants.push(format!("{stem}tion"));
    }

    if let Some(stem) = term.strip_suffix("ary") {
        variants.push(format!("{stem}ory"));
    }

    if term.contains(' ') {
        variants.push(term.replace(' ', "-"));
        variants.push(term.replace(' ', ""));
    }

    variants
}
