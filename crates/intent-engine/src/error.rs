use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Intent, LanguageBucket};

pub type Result<T, E = ConfigError> = core::result::Result<T, E>;

/// Errors raised while loading or validating intent rules.
///
/// These only ever surface at startup; classification itself is total.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading intent rules {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing yaml intent rules: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("parsing json intent rules: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported intent rules format: {0}")]
    UnsupportedFormat(String),
    #[error("missing language bucket: {0}")]
    MissingLanguage(LanguageBucket),
    #[error("invalid pattern for {language}/{intent} `{pattern}`: {source}")]
    InvalidPattern {
        language: LanguageBucket,
        intent: Intent,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("empty {field} entry for {language}/{intent}")]
    EmptyEntry {
        language: LanguageBucket,
        intent: Intent,
        field: &'static str,
    },
    #[error("{name} must be within 0..=100, got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
}

/// A string that is not one of the closed set of intent tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown intent tag: {0}")]
pub struct UnknownIntent(pub String);
