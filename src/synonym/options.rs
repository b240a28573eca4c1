//! Per-run mining configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::analysis::stop_words::StopWords;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{GlossaError, Result};

/// Configuration for one synonym mining run.
///
/// All heuristics are tunable here rather than hard-coded; defaults are
/// calibrated for a Russian-language news corpus of a few thousand articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningOptions {
    /// Minimum Jaccard similarity for a candidate pair (0.0 to 1.0).
    pub min_similarity_threshold: f64,
    /// Minimum word length in characters.
    pub min_word_length: usize,
    /// Maximum word length in characters.
    pub max_word_length: usize,
    /// Minimum number of corpus occurrences for a word to be considered.
    pub min_word_frequency: usize,
    /// Words that never take part in a synonym pair.
    pub excluded_words: HashSet<String>,
    /// Words that must never be emitted (offensive terms, brand names, etc.).
    pub forbidden_words: HashSet<String>,
    /// Stop words added to the built-in Russian and English lists. Applied
    /// wherever text is tokenized: mining, expansion and search.
    pub extra_stop_words: Vec<String>,
    /// Whether to reject words that are mostly capitalized.
    pub exclude_proper_nouns: bool,
    /// Capitalized/total occurrence ratio at which a word counts as a proper noun.
    pub proper_noun_capitalization_threshold: f64,
    /// Minimum capitalized occurrences for the proper-noun rule to apply.
    pub min_proper_noun_occurrences: usize,
    /// Whether to reject pairs that frequently appear side by side.
    pub exclude_compound_terms: bool,
    /// Adjacent occurrences (either order) at which a pair counts as a collocation.
    pub min_compound_occurrences: usize,
    /// Normalized Levenshtein similarity at which two words count as variants.
    pub morphological_similarity_threshold: f64,
}

impl Default for MiningOptions {
    fn default() -> Self {
        MiningOptions {
            min_similarity_threshold: 0.3,
            min_word_length: 3,
            max_word_length: 50,
            min_word_frequency: 3,
            excluded_words: HashSet::new(),
            forbidden_words: HashSet::new(),
            extra_stop_words: Vec::new(),
            exclude_proper_nouns: true,
            proper_noun_capitalization_threshold: 0.7,
            min_proper_noun_occurrences: 3,
            exclude_compound_terms: true,
            min_compound_occurrences: 3,
            morphological_similarity_threshold: 0.8,
        }
    }
}

impl MiningOptions {
    /// Check that all thresholds are in range.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_similarity_threshold", self.min_similarity_threshold),
            (
                "proper_noun_capitalization_threshold",
                self.proper_noun_capitalization_threshold,
            ),
            (
                "morphological_similarity_threshold",
                self.morphological_similarity_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GlossaError::config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.min_word_length == 0 {
            return Err(GlossaError::config("min_word_length must be positive"));
        }
        if self.min_word_length > self.max_word_length {
            return Err(GlossaError::config(format!(
                "min_word_length ({}) exceeds max_word_length ({})",
                self.min_word_length, self.max_word_length
            )));
        }

        Ok(())
    }

    /// The built-in stop words extended with `extra_stop_words`.
    pub fn stop_words(&self) -> StopWords {
        StopWords::new().extended(&self.extra_stop_words)
    }

    /// A tokenizer with these length bounds and stop words.
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::with_bounds(self.min_word_length, self.max_word_length)
            .with_stop_words(self.stop_words())
    }

    /// Whether a normalized word is excluded or forbidden.
    pub fn is_blocked(&self, word: &str) -> bool {
        self.excluded_words.contains(word) || self.forbidden_words.contains(word)
    }
}
