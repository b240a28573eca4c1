//! Normalization and word tokenization.
//!
//! Tokens are contiguous alphabetic runs (any script), case-folded and
//! filtered by length and stop words. Lengths are measured in characters, not
//! bytes, so Cyrillic and Latin words share the same bounds.
//!
//! # Examples
//!
//! ```
//! use glossa::analysis::tokenizer::{normalize, Tokenizer};
//!
//! assert_eq!(normalize("  Москва "), "москва");
//!
//! let tokenizer = Tokenizer::new();
//! let tokens = tokenizer.tokenize("Машина едет по дороге, машина!");
//! assert!(tokens.contains("машина"));
//! assert!(tokens.contains("дороге"));
//! assert!(!tokens.contains("по"));
//! ```

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::stop_words::StopWords;

/// Default minimum token length in characters.
pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 3;

/// Default maximum token length in characters.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 50;

static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Alphabetic}+").expect("Word pattern should be valid")
});

/// Normalize text: trim surrounding whitespace and lowercase.
///
/// Total and idempotent; blank input yields an empty string.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A raw word occurrence with its original surface form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Word {
    /// The text as it appeared in the source.
    pub surface: String,
    /// The lowercased text.
    pub normalized: String,
    /// Position among the words of the source text (0-based).
    pub position: usize,
}

impl Word {
    /// Whether the word starts with an uppercase letter.
    pub fn is_capitalized(&self) -> bool {
        self.surface.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Word tokenizer with length bounds and stop-word filtering.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    min_length: usize,
    max_length: usize,
    stop_words: StopWords,
}

impl Tokenizer {
    /// Create a tokenizer with default bounds and the default stop words.
    pub fn new() -> Self {
        Self::with_bounds(DEFAULT_MIN_TOKEN_LENGTH, DEFAULT_MAX_TOKEN_LENGTH)
    }

    /// Create a tokenizer with custom length bounds and the default stop words.
    pub fn with_bounds(min_length: usize, max_length: usize) -> Self {
        Tokenizer {
            min_length,
            max_length,
            stop_words: StopWords::new(),
        }
    }

    /// Replace the stop word set.
    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Minimum token length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Maximum token length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// The stop words used by this tokenizer.
    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Check whether a normalized word passes the length and stop-word filters.
    pub fn accepts(&self, word: &str) -> bool {
        let len = word.chars().count();
        len >= self.min_length && len <= self.max_length && !self.stop_words.contains(word)
    }

    /// Extract the set of unique tokens from text.
    pub fn tokenize(&self, text: &str) -> BTreeSet<String> {
        WORD_PATTERN
            .find_iter(text)
            .map(|m| normalize(m.as_str()))
            .filter(|w| self.accepts(w))
            .collect()
    }

    /// Extract unique tokens in order of first occurrence.
    pub fn tokenize_ordered(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        WORD_PATTERN
            .find_iter(text)
            .map(|m| normalize(m.as_str()))
            .filter(|w| self.accepts(w) && seen.insert(w.clone()))
            .collect()
    }

    /// Every alphabetic run in order, unfiltered, with its surface form.
    pub fn words(&self, text: &str) -> Vec<Word> {
        WORD_PATTERN
            .find_iter(text)
            .enumerate()
            .map(|(position, m)| Word {
                surface: m.as_str().to_string(),
                normalized: normalize(m.as_str()),
                position,
            })
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}
