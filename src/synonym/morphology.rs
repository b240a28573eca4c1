//! Morphological variant detection.
//!
//! Inflected forms of one lemma ("машина", "машины", "машиной") co-occur
//! heavily and would otherwise dominate the mined synonym lists. Two words are
//! treated as variants when ANY of the following holds:
//!
//! * they share a prefix of at least `min(4, shorter_length - 1)` chars;
//! * they share a suffix of at least 4 chars;
//! * their normalized Levenshtein similarity reaches the configured threshold.
//!
//! The checks are OR-ed on purpose; requiring more than one of them lets
//! inflections through as synonyms.

use crate::spelling::levenshtein::levenshtein_similarity;

/// Minimum shared suffix length that marks two words as variants.
pub const MIN_SHARED_SUFFIX: usize = 4;

/// Upper bound on the shared prefix length required to mark variants.
pub const MAX_REQUIRED_PREFIX: usize = 4;

/// Length of the common prefix, in chars.
pub fn shared_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Length of the common suffix, in chars.
pub fn shared_suffix_len(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Whether two normalized words look like forms of the same lemma.
pub fn is_morphological_variant(a: &str, b: &str, similarity_threshold: f64) -> bool {
    let shorter = a.chars().count().min(b.chars().count());
    let required_prefix = MAX_REQUIRED_PREFIX.min(shorter.saturating_sub(1));

    // A zero requirement would match every pair of words.
    if required_prefix > 0 && shared_prefix_len(a, b) >= required_prefix {
        return true;
    }
    if shared_suffix_len(a, b) >= MIN_SHARED_SUFFIX {
        return true;
    }

    levenshtein_similarity(a, b) >= similarity_threshold
}
