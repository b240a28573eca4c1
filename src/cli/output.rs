//! Output formatting for CLI commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cli::args::{GlossaArgs, OutputFormat};
use crate::search::SearchHit;
use crate::spelling::analytics::SearchQueryStats;
use crate::spelling::strategy::CorrectionStep;
use crate::synonym::SynonymGroups;
use crate::synonym::store::SynonymStatistics;

/// Result of a mining run.
#[derive(Debug, Serialize, Deserialize)]
pub struct MiningReport {
    pub articles: usize,
    pub output: Option<String>,
    pub duration_ms: u64,
    pub statistics: SynonymStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<SynonymGroups>,
}

/// Result of a query expansion.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpansionReport {
    pub query: String,
    pub expanded: String,
    pub threshold: f64,
    pub added_terms: Vec<String>,
}

/// Result of a correction.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorrectionReport {
    pub original: String,
    pub corrected: String,
    pub has_changes: bool,
    pub confidence: f64,
    pub duration_ms: u64,
    pub strategies: Vec<String>,
    pub steps: Vec<CorrectionStep>,
}

/// Result of a search.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchReport {
    pub original: String,
    pub corrected: String,
    pub expanded: String,
    pub total_count: usize,
    pub hits: Vec<SearchHit>,
    pub highlights: BTreeMap<String, Vec<String>>,
}

/// Co-occurrence comparison of two words.
#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub word1: String,
    pub word2: String,
    pub documents1: usize,
    pub documents2: usize,
    pub jaccard: f64,
    pub context_similarity: f64,
}

/// Synonym and analytics statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsReport {
    pub synonyms_file: String,
    pub last_updated: Option<String>,
    pub statistics: SynonymStatistics,
    pub analytics_file: String,
    pub tracked_queries: usize,
    pub top_queries: Vec<SearchQueryStats>,
}

/// Print a command result in the selected format.
pub fn output_result<T: Serialize>(
    message: &str,
    result: &T,
    args: &GlossaArgs,
) -> crate::error::Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(
    message: &str,
    result: &T,
    args: &GlossaArgs,
) -> crate::error::Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    print_human_value(&value, 0);
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &GlossaArgs) -> crate::error::Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Print a value as indented `key: value` lines.
fn print_human_value(value: &serde_json::Value, indent: usize) {
    let spaces = "  ".repeat(indent);

    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                match val {
                    serde_json::Value::Object(inner) if !inner.is_empty() => {
                        println!("{spaces}{key}:");
                        print_human_value(val, indent + 1);
                    }
                    serde_json::Value::Array(items) if items.iter().any(|i| i.is_object()) => {
                        println!("{spaces}{key}:");
                        for (i, item) in items.iter().enumerate() {
                            println!("{spaces}  [{}]", i + 1);
                            print_human_value(item, indent + 2);
                        }
                    }
                    _ => println!("{spaces}{key}: {}", format_value(val)),
                }
            }
        }
        _ => println!("{spaces}{}", format_value(value)),
    }
}

/// Format a scalar or flat array for human output.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{f:.3}"),
            _ => n.to_string(),
        },
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "{}".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("врач")), "врач");
        assert_eq!(format_value(&json!(3)), "3");
        assert_eq!(format_value(&json!(0.5)), "0.500");
        assert_eq!(format_value(&json!(["а", "б"])), "[а, б]");
        assert_eq!(format_value(&json!(null)), "-");
    }
}
