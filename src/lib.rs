//! # Glossa
//!
//! Text understanding between a news corpus and a full-text search engine.
//!
//! ## Features
//!
//! - Synonym mining from document co-occurrence with heuristic validation
//! - Confidence-gated query expansion with symmetric synonym lookup
//! - Ordered, cached query correction: keyboard layout, learned corrections, LLM
//! - Learning from search outcomes, persisted as human-readable JSON

pub mod analysis;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod expansion;
pub mod persistence;
pub mod pipeline;
pub mod search;
pub mod spelling;
pub mod synonym;

pub mod prelude {
    pub use crate::config::GlossaConfig;
    pub use crate::corpus::Article;
    pub use crate::error::{GlossaError, Result};
    pub use crate::expansion::QueryExpander;
    pub use crate::pipeline::{PreparedQuery, QueryPipeline};
    pub use crate::search::{SearchEngine, SearchRequest, SearchResults};
    pub use crate::spelling::composite::CompositeCorrector;
    pub use crate::spelling::strategy::{SpellCheckResult, SpellCheckStrategy};
    pub use crate::synonym::miner::SynonymMiner;
    pub use crate::synonym::options::MiningOptions;
    pub use crate::synonym::store::{SynonymData, SynonymStore};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
