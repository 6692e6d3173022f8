//! Fuzzy keyword lookups outside intent detection, e.g. matching a spoken
//! clothing item against the items already in a user's wardrobe.

use serde::Serialize;

use crate::config::{check_threshold, EngineSettings, DEFAULT_LOOKUP_THRESHOLD};
use crate::error::Result;
use crate::similarity::partial_ratio;

/// Candidate picked by [`KeywordLookup::best_match`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordMatch {
    /// Candidate as passed in (original casing)
    pub candidate: String,
    /// Partial-similarity score (0 to 100)
    pub score: f64,
}

/// Fuzzy keyword matching against an ad-hoc candidate list.
#[derive(Debug, Clone, Copy)]
pub struct KeywordLookup {
    threshold: f64,
}

impl KeywordLookup {
    /// `threshold` of 100 only accepts candidates contained verbatim.
    ///
    /// Fails unless `threshold` is within `0..=100`.
    pub fn new(threshold: f64) -> Result<Self> {
        check_threshold("lookup_threshold", threshold)?;
        Ok(Self { threshold })
    }

    /// Lookup using the configured `lookup_threshold`.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        Self::new(settings.lookup_threshold)
    }

    /// Minimum accepted score.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Highest-scoring candidate at or above the threshold.
    ///
    /// Ties keep the earliest candidate.
    pub fn best_match<'a, I>(&self, query: &str, candidates: I) -> Option<KeywordMatch>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let mut best: Option<KeywordMatch> = None;
        for candidate in candidates {
            let score = partial_ratio(&candidate.trim().to_lowercase(), &query);
            if score < self.threshold {
                continue;
            }
            if best.as_ref().map_or(true, |current| score > current.score) {
                best = Some(KeywordMatch {
                    candidate: candidate.to_string(),
                    score,
                });
            }
        }
        best
    }

    /// Whether any keyword reaches the threshold against `text`.
    pub fn matches_any<S: AsRef<str>>(&self, text: &str, keywords: &[S]) -> bool {
        let text = text.trim().to_lowercase();
        !text.is_empty()
            && keywords
                .iter()
                .any(|keyword| partial_ratio(&keyword.as_ref().to_lowercase(), &text) >= self.threshold)
    }
}

impl Default for KeywordLookup {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LOOKUP_THRESHOLD,
        }
    }
}
