//! Priority resolver and confidence estimator.

use std::sync::Arc;

use crate::config::IntentConfiguration;
use crate::error::Result;
use crate::matchers::{ExactPhraseMatcher, FuzzyKeywordMatcher, PatternMatcher, RuleMatcher};
use crate::types::{Classification, Intent, LanguageBucket, MatchMethod, PRIORITY_LIST};

/// Score reported when the winning intent is explained by an exact phrase.
pub const EXACT_CONFIDENCE: f64 = 100.0;
/// Score reported when the winning intent is explained by a pattern.
pub const PATTERN_CONFIDENCE: f64 = 90.0;

/// Trimmed, lowercased utterance; `None` for empty or all-whitespace input.
pub fn normalize(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

struct Resolved {
    text: String,
    bucket: LanguageBucket,
    intent: Intent,
    method: MatchMethod,
}

/// Immutable intent classifier over a shared rule set.
///
/// Runs exact, fuzzy and pattern matching as separate phases. Each phase
/// scans every intent in [`PRIORITY_LIST`] order before the next phase
/// starts, and the first hit wins.
pub struct IntentClassifier {
    config: Arc<IntentConfiguration>,
    exact: ExactPhraseMatcher,
    fuzzy: FuzzyKeywordMatcher,
    pattern: PatternMatcher,
}

impl IntentClassifier {
    /// Build a classifier owning `config`.
    pub fn new(config: IntentConfiguration) -> Self {
        Self::with_shared(Arc::new(config))
    }

    /// Build a classifier over a configuration shared with other owners.
    pub fn with_shared(config: Arc<IntentConfiguration>) -> Self {
        let fuzzy = FuzzyKeywordMatcher::new(config.settings().fuzzy_threshold);
        Self {
            config,
            exact: ExactPhraseMatcher,
            fuzzy,
            pattern: PatternMatcher,
        }
    }

    /// Classifier over the rules embedded in the crate.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(IntentConfiguration::builtin()?))
    }

    /// Rules this classifier matches against.
    pub fn config(&self) -> &IntentConfiguration {
        &self.config
    }

    /// Another handle to the same rules, for building sibling classifiers.
    pub fn shared_config(&self) -> Arc<IntentConfiguration> {
        Arc::clone(&self.config)
    }

    fn phases(&self) -> [&dyn RuleMatcher; 3] {
        [&self.exact, &self.fuzzy, &self.pattern]
    }

    /// First intent in priority order that `matcher` accepts.
    fn first_match(
        &self,
        matcher: &dyn RuleMatcher,
        text: &str,
        bucket: LanguageBucket,
    ) -> Option<Intent> {
        PRIORITY_LIST
            .into_iter()
            .find(|intent| matcher.matches(text, self.config.rules_for(bucket, *intent)))
    }

    /// Normalized text, bucket, winning intent and the phase that won.
    fn resolve(&self, text: &str, language: &str) -> Option<Resolved> {
        let Some(text) = normalize(text) else {
            tracing::trace!("empty utterance");
            return None;
        };
        let bucket = LanguageBucket::resolve(language);

        for matcher in self.phases() {
            if let Some(intent) = self.first_match(matcher, &text, bucket) {
                let method = matcher.method();
                tracing::debug!(%intent, %method, %bucket, "intent detected");
                return Some(Resolved {
                    text,
                    bucket,
                    intent,
                    method,
                });
            }
        }

        tracing::debug!(%bucket, "no intent matched");
        None
    }

    /// Detect the intent of an utterance.
    ///
    /// `language` is any language code; codes starting with `de` use the
    /// German rules, everything else the English ones.
    pub fn detect_intent(&self, text: &str, language: &str) -> Option<Intent> {
        self.resolve(text, language).map(|resolved| resolved.intent)
    }

    /// Detect the intent and report how strongly it is justified.
    ///
    /// The winning intent's own rules are re-checked in the order exact
    /// phrase (100), pattern (90), fuzzy keyword (best keyword score).
    /// Pattern is only reported when the pattern phase on its own would
    /// have picked the same intent.
    pub fn confidence(&self, text: &str, language: &str) -> Classification {
        let Some(Resolved {
            text,
            bucket,
            intent,
            method,
        }) = self.resolve(text, language)
        else {
            return Classification::none();
        };
        let rule = self.config.rules_for(bucket, intent);

        let (confidence, method) = match method {
            MatchMethod::Exact => (EXACT_CONFIDENCE, MatchMethod::Exact),
            MatchMethod::Pattern => (PATTERN_CONFIDENCE, MatchMethod::Pattern),
            MatchMethod::Fuzzy => {
                if self.first_match(&self.pattern, &text, bucket) == Some(intent) {
                    (PATTERN_CONFIDENCE, MatchMethod::Pattern)
                } else {
                    let score = self.fuzzy.score(&text, rule).unwrap_or(0.0);
                    (score, MatchMethod::Fuzzy)
                }
            }
        };

        Classification {
            intent: Some(intent),
            confidence,
            method: Some(method),
        }
    }
}
