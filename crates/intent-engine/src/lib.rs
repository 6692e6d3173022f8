//! Intent classification for bilingual (German/English) assistant utterances
//!
//! This crate turns a free-form utterance plus a language code into one of a
//! closed set of intents (packing, wardrobe, routines, reminders, weather,
//! help, outfit preference feedback) or no intent at all, together with a
//! confidence score explaining the decision.
//!
//! Matching runs in three strictly ordered phases over a static rule set:
//! exact phrases, then fuzzy keywords, then regular expressions. Within a
//! phase, intents are tried in [`PRIORITY_LIST`] order.

mod classifier;
mod config;
mod error;
mod lookup;
mod matchers;
pub mod similarity;
mod types;

pub use classifier::{normalize, IntentClassifier, EXACT_CONFIDENCE, PATTERN_CONFIDENCE};
pub use config::{
    load_config_file, ConfigSource, EngineSettings, IntentConfiguration, IntentRule, RuleSource,
    RuleSummary, BUILTIN_RULES,
};
pub use error::{ConfigError, Result, UnknownIntent};
pub use lookup::{KeywordLookup, KeywordMatch};
pub use matchers::{
    best_keyword_score, ExactPhraseMatcher, FuzzyKeywordMatcher, PatternMatcher, RuleMatcher,
};
pub use types::{Classification, Intent, LanguageBucket, MatchMethod, PRIORITY_LIST};

/// Create a classifier over the built-in rules
pub fn create_classifier() -> Result<IntentClassifier> {
    tracing::info!("Initializing intent classifier with built-in rules");
    IntentClassifier::builtin()
}
