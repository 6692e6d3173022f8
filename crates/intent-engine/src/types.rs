use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownIntent;

/// Capability an utterance is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Feedback on a suggested outfit ("too warm", "lieber ein T-Shirt")
    Preference,
    /// List the user's routines
    RoutineList,
    /// Delete a routine
    RoutineDelete,
    /// Packing list / outfit suggestion
    Packing,
    /// Manage wardrobe items
    Wardrobe,
    /// Create a routine
    Routine,
    /// One-off reminder
    Reminder,
    /// Weather lookup
    Weather,
    /// Help menu
    Help,
}

/// Tie-break order across intents, highest precedence first.
///
/// Preference shares vocabulary with packing and wardrobe, and the specific
/// routine intents must be checked before the general one.
pub const PRIORITY_LIST: [Intent; 9] = [
    Intent::Preference,
    Intent::RoutineList,
    Intent::RoutineDelete,
    Intent::Packing,
    Intent::Wardrobe,
    Intent::Routine,
    Intent::Reminder,
    Intent::Weather,
    Intent::Help,
];

impl Intent {
    /// Every intent, in priority order.
    pub const ALL: [Intent; 9] = PRIORITY_LIST;

    /// Tag used in rule files and JSON output ("routine_list").
    pub const fn as_str(self) -> &'static str {
        match self {
            Intent::Preference => "preference",
            Intent::RoutineList => "routine_list",
            Intent::RoutineDelete => "routine_delete",
            Intent::Packing => "packing",
            Intent::Wardrobe => "wardrobe",
            Intent::Routine => "routine",
            Intent::Reminder => "reminder",
            Intent::Weather => "weather",
            Intent::Help => "help",
        }
    }

    /// Position in [`PRIORITY_LIST`]; lower wins ties.
    pub fn priority(self) -> usize {
        PRIORITY_LIST
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or(PRIORITY_LIST.len())
    }

    /// Help section shown for this capability.
    pub const fn help_topic(self) -> Option<&'static str> {
        match self {
            Intent::Packing => Some("packing"),
            Intent::Routine | Intent::RoutineList | Intent::RoutineDelete => Some("routines"),
            Intent::Wardrobe => Some("wardrobe"),
            Intent::Reminder => Some("reminders"),
            Intent::Weather => Some("weather"),
            Intent::Preference | Intent::Help => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| UnknownIntent(s.to_string()))
    }
}

/// Resolved language context for rule lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageBucket {
    De,
    En,
}

impl LanguageBucket {
    /// Both buckets; every rules document must define each.
    pub const ALL: [LanguageBucket; 2] = [LanguageBucket::De, LanguageBucket::En];

    /// Map a language code ("de", "de-DE", "en-US", ...) to a bucket.
    ///
    /// Anything that does not start with `de` is English; rejecting
    /// unsupported languages is up to the caller.
    pub fn resolve(code: &str) -> Self {
        if code.starts_with("de") {
            LanguageBucket::De
        } else {
            LanguageBucket::En
        }
    }

    /// Two-letter code of the bucket.
    pub const fn as_str(self) -> &'static str {
        match self {
            LanguageBucket::De => "de",
            LanguageBucket::En => "en",
        }
    }
}

impl fmt::Display for LanguageBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy that justified a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Fuzzy,
    Pattern,
}

impl MatchMethod {
    /// Lowercase name ("exact", "fuzzy", "pattern").
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Fuzzy => "fuzzy",
            MatchMethod::Pattern => "pattern",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the confidence estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    /// Winning intent, if any
    pub intent: Option<Intent>,
    /// Confidence score (0 to 100)
    pub confidence: f64,
    /// Strategy that explains the win
    pub method: Option<MatchMethod>,
}

impl Classification {
    /// No intent, confidence 0.
    pub const fn none() -> Self {
        Self {
            intent: None,
            confidence: 0.0,
            method: None,
        }
    }
}
