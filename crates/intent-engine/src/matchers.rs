//! Matching strategies behind one interface.
//!
//! Every matcher expects `text` to be normalized already (trimmed and
//! lowercased); rule entries are normalized when the configuration loads.

use crate::config::IntentRule;
use crate::similarity::partial_ratio;
use crate::types::MatchMethod;

/// Does this text match this rule under one strategy.
pub trait RuleMatcher: Send + Sync {
    /// Strategy implemented by this matcher.
    fn method(&self) -> MatchMethod;

    fn matches(&self, text: &str, rule: &IntentRule) -> bool;
}

/// Full-string equality against the rule's exact phrases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactPhraseMatcher;

impl RuleMatcher for ExactPhraseMatcher {
    fn method(&self) -> MatchMethod {
        MatchMethod::Exact
    }

    fn matches(&self, text: &str, rule: &IntentRule) -> bool {
        rule.exact_phrases.contains(text)
    }
}

/// Highest partial-similarity score of any keyword against `text`.
///
/// `None` when there are no keywords to score.
pub fn best_keyword_score<S: AsRef<str>>(text: &str, keywords: &[S]) -> Option<f64> {
    keywords
        .iter()
        .map(|keyword| partial_ratio(keyword.as_ref(), text))
        .reduce(f64::max)
}

/// Approximate substring similarity of the rule's keywords.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyKeywordMatcher {
    threshold: f64,
}

impl FuzzyKeywordMatcher {
    /// Keywords scoring at least `threshold` (0 to 100) match.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best keyword score for `rule`, regardless of the threshold.
    pub fn score(&self, text: &str, rule: &IntentRule) -> Option<f64> {
        best_keyword_score(text, &rule.keywords)
    }
}

impl RuleMatcher for FuzzyKeywordMatcher {
    fn method(&self) -> MatchMethod {
        MatchMethod::Fuzzy
    }

    fn matches(&self, text: &str, rule: &IntentRule) -> bool {
        rule.keywords
            .iter()
            .any(|keyword| partial_ratio(keyword, text) >= self.threshold)
    }
}

/// Regular-expression search anywhere in the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl RuleMatcher for PatternMatcher {
    fn method(&self) -> MatchMethod {
        MatchMethod::Pattern
    }

    fn matches(&self, text: &str, rule: &IntentRule) -> bool {
        rule.patterns.iter().any(|pattern| pattern.is_match(text))
    }
}
