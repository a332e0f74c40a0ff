//! Header to synonym matching.

use rapidfuzz::distance::levenshtein;
use serde::{Deserialize, Serialize};

/// Default minimum confidence for [`best_match`].
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

const EXACT_CONFIDENCE: f64 = 1.0;
const CONTAINS_CONFIDENCE: f64 = 0.8;

/// Best header for a set of patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub header: Option<String>,
    pub confidence: f64,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            header: None,
            confidence: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.header.is_some()
    }
}

/// Confidence that `header` names the same thing as one of `patterns`.
///
/// Exact (case-insensitive) equality scores 1.0, containment either way
/// 0.8, anything else the normalized Levenshtein similarity over
/// characters. The best pattern wins.
pub fn match_header<S: AsRef<str>>(header: &str, patterns: &[S]) -> f64 {
    let header = header.trim().to_lowercase();
    if header.is_empty() {
        return 0.0;
    }
    let mut best = 0.0_f64;
    for pattern in patterns {
        let pattern = pattern.as_ref().trim().to_lowercase();
        if pattern.is_empty() {
            continue;
        }
        let confidence = pattern_confidence(&header, &pattern);
        if confidence > best {
            best = confidence;
        }
        if best >= EXACT_CONFIDENCE {
            break;
        }
    }
    best
}

fn pattern_confidence(header: &str, pattern: &str) -> f64 {
    if header == pattern {
        return EXACT_CONFIDENCE;
    }
    if header.contains(pattern) || pattern.contains(header) {
        return CONTAINS_CONFIDENCE;
    }
    edit_similarity(header, pattern)
}

/// `1 - levenshtein / max_len`, counted in characters.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein::distance(a.chars(), b.chars());
    1.0 - distance as f64 / max_len as f64
}

/// Highest-confidence header for `patterns` at or above `threshold`.
///
/// Ties keep the first header in iteration order. A zero-confidence
/// match is never returned.
pub fn best_match<I, S, P>(headers: I, patterns: &[P], threshold: f64) -> MatchResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    P: AsRef<str>,
{
    let mut best: Option<(String, f64)> = None;
    for header in headers {
        let header = header.as_ref();
        let confidence = match_header(header, patterns);
        let improves = match &best {
            Some((_, current)) => confidence > *current,
            None => confidence > 0.0,
        };
        if improves {
            best = Some((header.to_string(), confidence));
        }
    }
    match best {
        Some((header, confidence)) if confidence >= threshold => MatchResult {
            header: Some(header),
            confidence,
        },
        _ => MatchResult::none(),
    }
}
