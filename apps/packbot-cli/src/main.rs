use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use intent_engine::{
    load_config_file, Classification, EngineSettings, Intent, IntentClassifier,
    IntentConfiguration, KeywordLookup, KeywordMatch, LanguageBucket, RuleSummary,
};

#[derive(Parser, Debug)]
#[command(
    name = "packbot",
    version,
    about = "Packbot intent classification CLI",
    disable_help_subcommand = true
)]
struct Cli {
    /// Intent rules file (.yaml, .yml or .json); built-in rules when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print one JSON object per result
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify one utterance
    Classify {
        /// Utterance to classify
        #[arg(long)]
        text: String,
        /// Language code (de, de-DE, en, en-US, ...)
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Classify one utterance and explain the confidence score
    Explain {
        /// Utterance to classify
        #[arg(long)]
        text: String,
        /// Language code (de, de-DE, en, en-US, ...)
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Classify utterances read from stdin, one per line
    Batch {
        /// Language code applied to every line
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Validate the intent rules and print per-intent rule counts
    CheckConfig,
    /// Fuzzy-match a query against candidate names (e.g. wardrobe items)
    Lookup {
        /// Text to look up
        #[arg(long)]
        query: String,
        /// Comma-separated candidates
        #[arg(long, value_delimiter = ',', required = true)]
        candidates: Vec<String>,
        /// Minimum score (0-100); defaults to the configured lookup threshold
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Serialize)]
struct DetectionRecord<'a> {
    text: &'a str,
    language: LanguageBucket,
    intent: Option<Intent>,
}

#[derive(Serialize)]
struct ExplanationRecord<'a> {
    text: &'a str,
    language: LanguageBucket,
    #[serde(flatten)]
    result: Classification,
    help_topic: Option<&'static str>,
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    settings: &'a EngineSettings,
    rules: Vec<RuleSummary>,
}

#[derive(Serialize)]
struct LookupRecord<'a> {
    query: &'a str,
    threshold: f64,
    #[serde(rename = "match")]
    found: Option<KeywordMatch>,
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify { text, language } => {
            let classifier = IntentClassifier::new(config);
            classify(&classifier, &text, &language, cli.json)
        }
        Commands::Explain { text, language } => {
            let classifier = IntentClassifier::new(config);
            explain(&classifier, &text, &language, cli.json)
        }
        Commands::Batch { language } => {
            let classifier = IntentClassifier::new(config);
            batch(&classifier, &language, cli.json)
        }
        Commands::CheckConfig => check_config(&config, cli.json),
        Commands::Lookup {
            query,
            candidates,
            threshold,
        } => lookup(&config, &query, &candidates, threshold, cli.json),
    }
}

fn setup_tracing() {
    // stdout carries results; logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<IntentConfiguration> {
    match path {
        Some(path) => {
            info!("Loading intent rules from {}", path.display());
            load_config_file(path)
                .with_context(|| format!("loading intent rules: {}", path.display()))
        }
        None => IntentConfiguration::builtin().context("compiling built-in intent rules"),
    }
}

/// Reply shown by the chat layer when nothing matched.
fn no_match_message(bucket: LanguageBucket) -> &'static str {
    match bucket {
        LanguageBucket::De => "Entschuldigung, das habe ich nicht verstanden.",
        LanguageBucket::En => "Sorry, I didn't understand that.",
    }
}

fn render_detection(intent: Option<Intent>, bucket: LanguageBucket) -> String {
    match intent {
        Some(intent) => intent.to_string(),
        None => format!("none\t{}", no_match_message(bucket)),
    }
}

fn render_explanation(result: &Classification, bucket: LanguageBucket) -> String {
    match (result.intent, result.method) {
        (Some(intent), Some(method)) => format!(
            "{intent}\tmethod={method}\tconfidence={:.1}",
            result.confidence
        ),
        _ => format!("none\tconfidence=0.0\t{}", no_match_message(bucket)),
    }
}

fn classify(classifier: &IntentClassifier, text: &str, language: &str, json: bool) -> Result<()> {
    let bucket = LanguageBucket::resolve(language);
    let intent = classifier.detect_intent(text, language);
    if json {
        let record = DetectionRecord {
            text,
            language: bucket,
            intent,
        };
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("{}", render_detection(intent, bucket));
    }
    Ok(())
}

fn explain(classifier: &IntentClassifier, text: &str, language: &str, json: bool) -> Result<()> {
    let bucket = LanguageBucket::resolve(language);
    let result = classifier.confidence(text, language);
    if json {
        let record = ExplanationRecord {
            text,
            language: bucket,
            result,
            help_topic: result.intent.and_then(Intent::help_topic),
        };
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("{}", render_explanation(&result, bucket));
    }
    Ok(())
}

fn batch(classifier: &IntentClassifier, language: &str, json: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut count = 0usize;
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        classify(classifier, &line, language, json)?;
        count += 1;
    }
    debug!("batch: classified {count} lines");
    Ok(())
}

fn check_config(config: &IntentConfiguration, json: bool) -> Result<()> {
    let rules: Vec<RuleSummary> = LanguageBucket::ALL
        .into_iter()
        .flat_map(|bucket| config.summary(bucket))
        .collect();

    if json {
        let report = ConfigReport {
            settings: config.settings(),
            rules,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for row in &rules {
        println!(
            "{}\t{}\texact={}\tkeywords={}\tpatterns={}",
            row.language, row.intent, row.exact_phrases, row.keywords, row.patterns
        );
    }
    let settings = config.settings();
    println!(
        "ok: fuzzy_threshold={} lookup_threshold={}",
        settings.fuzzy_threshold, settings.lookup_threshold
    );
    Ok(())
}

fn lookup(
    config: &IntentConfiguration,
    query: &str,
    candidates: &[String],
    threshold: Option<f64>,
    json: bool,
) -> Result<()> {
    let lookup = match threshold {
        Some(t) => KeywordLookup::new(t).context("invalid --threshold")?,
        None => KeywordLookup::from_settings(config.settings())?,
    };
    let found = lookup.best_match(query, candidates.iter().map(String::as_str));

    if json {
        let record = LookupRecord {
            query,
            threshold: lookup.threshold(),
            found,
        };
        println!("{}", serde_json::to_string(&record)?);
    } else if let Some(found) = found {
        println!("{}\tscore={:.1}", found.candidate, found.score);
    } else {
        println!("none");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_engine::MatchMethod;

    #[test]
    fn test_cli_parses_classify() {
        let cli = Cli::try_parse_from([
            "packbot",
            "--json",
            "classify",
            "--text",
            "wie ist das wetter",
            "--language",
            "de-DE",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Classify { text, language } => {
                assert_eq!(text, "wie ist das wetter");
                assert_eq!(language, "de-DE");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_splits_lookup_candidates() {
        let cli = Cli::try_parse_from([
            "packbot",
            "lookup",
            "--query",
            "regenjacke",
            "--candidates",
            "Jeans,Regenjacke,Pullover",
        ])
        .unwrap();
        match cli.command {
            Commands::Lookup {
                candidates,
                threshold,
                ..
            } => {
                assert_eq!(candidates, vec!["Jeans", "Regenjacke", "Pullover"]);
                assert_eq!(threshold, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_rejects_out_of_range_threshold() {
        let config = IntentConfiguration::builtin().unwrap();
        let candidates = vec!["Pullover".to_string()];
        assert!(lookup(&config, "pullover", &candidates, Some(150.0), true).is_err());
        assert!(lookup(&config, "pullover", &candidates, Some(-5.0), true).is_err());
        assert!(lookup(&config, "pullover", &candidates, Some(90.0), true).is_ok());
    }

    #[test]
    fn test_render_detection() {
        assert_eq!(
            render_detection(Some(Intent::RoutineList), LanguageBucket::En),
            "routine_list"
        );
        assert_eq!(
            render_detection(None, LanguageBucket::De),
            "none\tEntschuldigung, das habe ich nicht verstanden."
        );
    }

    #[test]
    fn test_render_explanation() {
        let result = Classification {
            intent: Some(Intent::Help),
            confidence: 100.0,
            method: Some(MatchMethod::Exact),
        };
        assert_eq!(
            render_explanation(&result, LanguageBucket::En),
            "help\tmethod=exact\tconfidence=100.0"
        );
        assert_eq!(
            render_explanation(&Classification::none(), LanguageBucket::En),
            "none\tconfidence=0.0\tSorry, I didn't understand that."
        );
    }

    #[test]
    fn test_explanation_record_json() {
        let classifier = IntentClassifier::builtin().unwrap();
        let result = classifier.confidence("?", "en");
        let record = ExplanationRecord {
            text: "?",
            language: LanguageBucket::En,
            result,
            help_topic: result.intent.and_then(Intent::help_topic),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["intent"], "help");
        assert_eq!(value["method"], "exact");
        assert_eq!(value["confidence"], 100.0);
        assert_eq!(value["language"], "en");
        assert!(value["help_topic"].is_null());
    }
}
