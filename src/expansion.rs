//! Confidence-gated query expansion.
//!
//! The expander runs after correction. It tokenizes the corrected query and,
//! for each token whose mined confidence reaches the threshold, appends the
//! token's synonyms. Original tokens always come first and are never dropped,
//! so exact matches keep their relative weight in the search engine.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use parking_lot::RwLock;
//! use glossa::expansion::QueryExpander;
//! use glossa::synonym::store::{SynonymData, SynonymStore};
//!
//! let mut data = SynonymData::default();
//! data.synonyms.insert("врач".into(), ["доктор".to_string()].into_iter().collect());
//! data.confidence_scores.insert("врач".into(), 0.9);
//!
//! let store = Arc::new(RwLock::new(SynonymStore::from_data(data)));
//! let expander = QueryExpander::new(store);
//!
//! assert_eq!(expander.expand_query("Врач", None), "врач доктор");
//! assert_eq!(expander.expand_query("доктор", Some(0.95)), "доктор");
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::analysis::tokenizer::Tokenizer;
use crate::synonym::store::SynonymStore;

/// Confidence used when the caller does not supply one.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// A single synonym added to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    /// The query token that triggered the expansion.
    pub source_term: String,
    /// The added synonym.
    pub term: String,
    /// Confidence of the source term's group.
    pub confidence: f64,
}

/// Structured expansion result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandedQuery {
    /// Tokens of the query, in order.
    pub original_terms: Vec<String>,
    /// Added synonyms, deduplicated against each other and the originals.
    pub expansions: Vec<Expansion>,
}

impl ExpandedQuery {
    /// Original terms followed by expansion terms.
    pub fn terms(&self) -> Vec<&str> {
        self.original_terms
            .iter()
            .map(String::as_str)
            .chain(self.expansions.iter().map(|e| e.term.as_str()))
            .collect()
    }

    /// Space-joined query string for the search engine.
    pub fn to_query_string(&self) -> String {
        self.terms().join(" ")
    }

    /// Whether any synonym was added.
    pub fn is_expanded(&self) -> bool {
        !self.expansions.is_empty()
    }
}

/// Synonym-based query expander backed by a shared store.
pub struct QueryExpander {
    store: Arc<RwLock<SynonymStore>>,
    tokenizer: Tokenizer,
    default_threshold: f64,
}

impl QueryExpander {
    /// Create an expander with the default tokenizer and threshold.
    pub fn new(store: Arc<RwLock<SynonymStore>>) -> Self {
        QueryExpander {
            store,
            tokenizer: Tokenizer::new(),
            default_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    /// Use a custom tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Use a custom default threshold.
    pub fn with_default_threshold(mut self, threshold: f64) -> Self {
        self.default_threshold = threshold;
        self
    }

    /// The store this expander reads from.
    pub fn store(&self) -> &Arc<RwLock<SynonymStore>> {
        &self.store
    }

    /// Expand a corrected query into structured terms.
    pub fn expand_terms(&self, query: &str, threshold: Option<f64>) -> ExpandedQuery {
        let threshold = threshold.unwrap_or(self.default_threshold);
        let original_terms = self.tokenizer.tokenize_ordered(query);
        let mut seen: HashSet<String> = original_terms.iter().cloned().collect();
        let mut expansions = Vec::new();

        let store = self.store.read();
        for term in &original_terms {
            let Some(confidence) = store.confidence_of(term) else {
                continue;
            };
            if confidence < threshold {
                continue;
            }
            for synonym in store.synonyms_of(term) {
                if seen.insert(synonym.clone()) {
                    expansions.push(Expansion {
                        source_term: term.clone(),
                        term: synonym,
                        confidence,
                    });
                }
            }
        }

        if !expansions.is_empty() {
            debug!(
                "Expanded '{query}' with {} synonyms at threshold {threshold}",
                expansions.len()
            );
        }

        ExpandedQuery {
            original_terms,
            expansions,
        }
    }

    /// Expand a corrected query into a search string.
    ///
    /// The output always contains every token of the query; raising the
    /// threshold can only remove expansion terms.
    pub fn expand_query(&self, query: &str, threshold: Option<f64>) -> String {
        self.expand_terms(query, threshold).to_query_string()
    }
}
