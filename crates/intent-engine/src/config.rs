//! Intent rule sets: declarative source documents and their validated,
//! compiled form.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::types::{Intent, LanguageBucket, PRIORITY_LIST};

/// Rules shipped with the engine.
pub const BUILTIN_RULES: &str = include_str!("../config/intents.yaml");

const DEFAULT_FUZZY_THRESHOLD: f64 = 80.0;
pub(crate) const DEFAULT_LOOKUP_THRESHOLD: f64 = 90.0;

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}

fn default_lookup_threshold() -> f64 {
    DEFAULT_LOOKUP_THRESHOLD
}

/// Tunables shared by the classifier and standalone lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// Minimum partial-similarity score for the fuzzy keyword phase
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Minimum score for standalone keyword lookups (wardrobe items etc.)
    #[serde(default = "default_lookup_threshold")]
    pub lookup_threshold: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            lookup_threshold: DEFAULT_LOOKUP_THRESHOLD,
        }
    }
}

/// One intent's rules as written in the source document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSource {
    #[serde(default)]
    pub exact_phrases: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Top-level rules document (YAML or JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSource {
    #[serde(default)]
    pub settings: EngineSettings,
    pub languages: BTreeMap<LanguageBucket, BTreeMap<Intent, RuleSource>>,
}

/// Compiled rules for one (language, intent) pair.
#[derive(Debug, Clone, Default)]
pub struct IntentRule {
    /// Lowercased phrases requiring full equality
    pub exact_phrases: HashSet<String>,
    /// Lowercased keywords for partial-similarity scoring
    pub keywords: Vec<String>,
    /// Case-insensitive patterns, searched anywhere in the text
    pub patterns: Vec<Regex>,
}

impl IntentRule {
    /// No phrases, keywords or patterns; never matches.
    pub fn is_empty(&self) -> bool {
        self.exact_phrases.is_empty() && self.keywords.is_empty() && self.patterns.is_empty()
    }

    fn compile(language: LanguageBucket, intent: Intent, source: &RuleSource) -> Result<Self> {
        let exact_phrases = normalize_entries(language, intent, "exact_phrases", &source.exact_phrases)?
            .into_iter()
            .collect();
        let keywords = normalize_entries(language, intent, "keywords", &source.keywords)?;

        let mut patterns = Vec::with_capacity(source.patterns.len());
        for pattern in &source.patterns {
            if pattern.trim().is_empty() {
                return Err(ConfigError::EmptyEntry {
                    language,
                    intent,
                    field: "patterns",
                });
            }
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    language,
                    intent,
                    pattern: pattern.clone(),
                    source,
                })?;
            patterns.push(regex);
        }

        Ok(Self {
            exact_phrases,
            keywords,
            patterns,
        })
    }
}

fn normalize_entries(
    language: LanguageBucket,
    intent: Intent,
    field: &'static str,
    entries: &[String],
) -> Result<Vec<String>> {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                Err(ConfigError::EmptyEntry {
                    language,
                    intent,
                    field,
                })
            } else {
                Ok(entry.to_lowercase())
            }
        })
        .collect()
}

pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { name, value })
    }
}

/// Complete, immutable mapping `LanguageBucket × Intent → IntentRule`.
#[derive(Debug, Clone)]
pub struct IntentConfiguration {
    rules: HashMap<(LanguageBucket, Intent), IntentRule>,
    settings: EngineSettings,
    empty: IntentRule,
}

impl IntentConfiguration {
    /// Compile the rules embedded in the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_RULES)
    }

    /// Parse and compile a YAML rules document.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let source: ConfigSource = serde_yaml::from_str(raw)?;
        Self::from_source(source)
    }

    /// Parse and compile a JSON rules document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let source: ConfigSource = serde_json::from_str(raw)?;
        Self::from_source(source)
    }

    /// Validate a parsed document and compile every pattern.
    pub fn from_source(source: ConfigSource) -> Result<Self> {
        check_threshold("fuzzy_threshold", source.settings.fuzzy_threshold)?;
        check_threshold("lookup_threshold", source.settings.lookup_threshold)?;

        let mut rules = HashMap::new();
        for language in LanguageBucket::ALL {
            let intents = source
                .languages
                .get(&language)
                .ok_or(ConfigError::MissingLanguage(language))?;
            for (intent, rule_source) in intents {
                let rule = IntentRule::compile(language, *intent, rule_source)?;
                rules.insert((language, *intent), rule);
            }
        }

        let config = Self {
            rules,
            settings: source.settings,
            empty: IntentRule::default(),
        };
        tracing::debug!(
            rules = config.rules.len(),
            fuzzy_threshold = config.settings.fuzzy_threshold,
            "loaded intent configuration"
        );
        Ok(config)
    }

    /// Rules for a pair; the empty rule when none are configured.
    pub fn rules_for(&self, language: LanguageBucket, intent: Intent) -> &IntentRule {
        self.rules.get(&(language, intent)).unwrap_or(&self.empty)
    }

    /// Thresholds this configuration was loaded with.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Per-intent rule counts for a bucket, in priority order.
    pub fn summary(&self, language: LanguageBucket) -> Vec<RuleSummary> {
        PRIORITY_LIST
            .iter()
            .map(|intent| {
                let rule = self.rules_for(language, *intent);
                RuleSummary {
                    language,
                    intent: *intent,
                    exact_phrases: rule.exact_phrases.len(),
                    keywords: rule.keywords.len(),
                    patterns: rule.patterns.len(),
                }
            })
            .collect()
    }
}

/// Rule counts for one (language, intent) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub language: LanguageBucket,
    pub intent: Intent,
    pub exact_phrases: usize,
    pub keywords: usize,
    pub patterns: usize,
}

/// Load rules from a `.yaml`/`.yml` or `.json` file.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<IntentConfiguration> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "yaml" | "yml" => IntentConfiguration::from_yaml_str(&raw),
        "json" => IntentConfiguration::from_json_str(&raw),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
languages:
  de:
    help:
      exact_phrases: ["  Hilfe "]
  en:
    help:
      keywords: ["Help Me"]
      patterns: ['^help\b']
"#;

    #[test]
    fn test_builtin_rules_load() {
        let config = IntentConfiguration::builtin().unwrap();
        assert_eq!(config.settings().fuzzy_threshold, 80.0);
        assert_eq!(config.settings().lookup_threshold, 90.0);
        for language in LanguageBucket::ALL {
            for intent in PRIORITY_LIST {
                assert!(
                    !config.rules_for(language, intent).is_empty(),
                    "no rules for {language}/{intent}"
                );
            }
        }
    }

    #[test]
    fn test_entries_are_normalized() {
        let config = IntentConfiguration::from_yaml_str(MINIMAL).unwrap();
        let de = config.rules_for(LanguageBucket::De, Intent::Help);
        assert!(de.exact_phrases.contains("hilfe"));
        let en = config.rules_for(LanguageBucket::En, Intent::Help);
        assert_eq!(en.keywords, vec!["help me".to_string()]);
        assert!(en.patterns[0].is_match("HELP please"));
    }

    #[test]
    fn test_absent_pair_yields_empty_rule() {
        let config = IntentConfiguration::from_yaml_str(MINIMAL).unwrap();
        assert!(config.rules_for(LanguageBucket::De, Intent::Weather).is_empty());
        assert!(config.rules_for(LanguageBucket::En, Intent::Packing).is_empty());
    }

    #[test]
    fn test_missing_language_is_fatal() {
        let raw = "languages:\n  de:\n    help:\n      keywords: [hilfe]\n";
        let err = IntentConfiguration::from_yaml_str(raw).unwrap_err();
        assert!(matches!(err, ConfigError::MissingLanguage(LanguageBucket::En)));
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let raw = "languages:\n  de: {}\n  en:\n    weather:\n      patterns: ['(unclosed']\n";
        let err = IntentConfiguration::from_yaml_str(raw).unwrap_err();
        match err {
            ConfigError::InvalidPattern {
                language, intent, ..
            } => {
                assert_eq!(language, LanguageBucket::En);
                assert_eq!(intent, Intent::Weather);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_misspelled_keys_are_rejected() {
        let unknown_intent = "languages:\n  de: {}\n  en:\n    wether:\n      keywords: [rain]\n";
        assert!(matches!(
            IntentConfiguration::from_yaml_str(unknown_intent),
            Err(ConfigError::Yaml(_))
        ));

        let unknown_field = "languages:\n  de: {}\n  en:\n    weather:\n      keyword: [rain]\n";
        assert!(matches!(
            IntentConfiguration::from_yaml_str(unknown_field),
            Err(ConfigError::Yaml(_))
        ));

        let unknown_language = "languages:\n  de: {}\n  en: {}\n  fr: {}\n";
        assert!(matches!(
            IntentConfiguration::from_yaml_str(unknown_language),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_empty_entries_are_rejected() {
        let raw = "languages:\n  de: {}\n  en:\n    help:\n      keywords: ['  ']\n";
        assert!(matches!(
            IntentConfiguration::from_yaml_str(raw),
            Err(ConfigError::EmptyEntry {
                field: "keywords",
                ..
            })
        ));
    }

    #[test]
    fn test_threshold_range_checked() {
        let raw = "settings:\n  fuzzy_threshold: 120\nlanguages:\n  de: {}\n  en: {}\n";
        assert!(matches!(
            IntentConfiguration::from_yaml_str(raw),
            Err(ConfigError::ThresholdOutOfRange {
                name: "fuzzy_threshold",
                ..
            })
        ));
    }

    #[test]
    fn test_json_source() {
        let raw = r#"{
            "settings": {"fuzzy_threshold": 85},
            "languages": {
                "de": {"weather": {"keywords": ["Wetter"]}},
                "en": {"weather": {"keywords": ["weather"]}}
            }
        }"#;
        let config = IntentConfiguration::from_json_str(raw).unwrap();
        assert_eq!(config.settings().fuzzy_threshold, 85.0);
        assert_eq!(config.settings().lookup_threshold, 90.0);
        assert_eq!(
            config.rules_for(LanguageBucket::De, Intent::Weather).keywords,
            vec!["wetter".to_string()]
        );
    }

    #[test]
    fn test_summary_in_priority_order() {
        let config = IntentConfiguration::from_yaml_str(MINIMAL).unwrap();
        let summary = config.summary(LanguageBucket::En);
        assert_eq!(summary.len(), PRIORITY_LIST.len());
        assert_eq!(summary[0].intent, Intent::Preference);
        let help = summary[8];
        assert_eq!(help.intent, Intent::Help);
        assert_eq!((help.exact_phrases, help.keywords, help.patterns), (0, 1, 1));
    }

    #[test]
    fn test_load_config_file_by_extension() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        let yaml = dir.path().join("rules.yaml");
        fs::write(&yaml, MINIMAL)?;
        let config = load_config_file(&yaml)?;
        assert!(!config.rules_for(LanguageBucket::En, Intent::Help).is_empty());

        let txt = dir.path().join("rules.txt");
        fs::write(&txt, MINIMAL)?;
        assert!(matches!(
            load_config_file(&txt),
            Err(ConfigError::UnsupportedFormat(_))
        ));

        let missing = dir.path().join("absent.yaml");
        assert!(matches!(load_config_file(&missing), Err(ConfigError::Io { .. })));
        Ok(())
    }
}
