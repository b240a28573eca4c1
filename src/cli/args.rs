//! Command line argument parsing for the Glossa CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Glossa - synonym mining, query correction and expansion for news search
#[derive(Parser, Debug, Clone)]
#[command(name = "glossa")]
#[command(about = "Synonym mining, query correction and query expansion for news search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct GlossaArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "GLOSSA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl GlossaArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Mine synonym groups from an article corpus
    Mine(MineArgs),

    /// Expand a query with mined synonyms
    Expand(ExpandArgs),

    /// Run a query through the correction chain
    Correct(CorrectArgs),

    /// Correct, expand and run a query against a corpus, learning from the outcome
    Search(SearchArgs),

    /// Compare two words by co-occurrence in a corpus
    Similarity(SimilarityArgs),

    /// Show synonym and search analytics statistics
    Stats(StatsArgs),
}

/// Arguments for mining
#[derive(Parser, Debug, Clone)]
pub struct MineArgs {
    /// Article corpus (JSON array or JSONL)
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Where to write the synonym file (default: configured path)
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Override the minimum Jaccard similarity
    #[arg(long)]
    pub min_similarity: Option<f64>,

    /// Override the minimum word frequency
    #[arg(long)]
    pub min_frequency: Option<usize>,

    /// Compute and print groups without writing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for expansion
#[derive(Parser, Debug, Clone)]
pub struct ExpandArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Minimum group confidence (default: configured threshold)
    #[arg(short, long)]
    pub threshold: Option<f64>,
}

/// Arguments for correction
#[derive(Parser, Debug, Clone)]
pub struct CorrectArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Corpus used to check whether the query has results
    #[arg(long, value_name = "CORPUS_FILE")]
    pub corpus: Option<PathBuf>,

    /// Enable the LLM corrector for this run
    #[arg(long)]
    pub llm: bool,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Article corpus (JSON array or JSONL)
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Offset for pagination
    #[arg(short, long, default_value = "0")]
    pub offset: usize,

    /// Only return articles of this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only return articles by this author
    #[arg(long)]
    pub author: Option<String>,
}

/// Arguments for the co-occurrence diagnostic
#[derive(Parser, Debug, Clone)]
pub struct SimilarityArgs {
    /// Article corpus (JSON array or JSONL)
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// First word
    pub word1: String,

    /// Second word
    pub word2: String,
}

/// Arguments for statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Number of top queries to show
    #[arg(short, long, default_value = "10")]
    pub top: usize,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
