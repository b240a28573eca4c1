//! Candidate validation.
//!
//! Co-occurrence alone produces many false positives: topical companions
//! ("нефть"/"баррель"), halves of fixed phrases ("холодная"/"война"), names,
//! and inflections of the same word. The validator applies independent
//! word-level and pair-level rules and only keeps pairs that pass all of them.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::normalize;
use crate::corpus::CorpusStatistics;
use crate::synonym::SynonymGroups;
use crate::synonym::cooccurrence::CandidateGroups;
use crate::synonym::morphology::is_morphological_variant;
use crate::synonym::options::MiningOptions;

/// Why a word or pair was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Empty or whitespace-only word.
    Blank,
    /// Listed in the excluded or forbidden words.
    Blocked,
    /// Seen fewer than `min_word_frequency` times.
    Rare,
    /// Outside the configured length bounds.
    Length,
    /// Predominantly capitalized in the corpus.
    ProperNoun,
    /// Both words normalize to the same text.
    Identical,
    /// The words frequently stand side by side.
    Collocation,
    /// The words are forms of the same lemma.
    Morphological,
}

/// Per-reason rejection counters for pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RejectionCounts {
    /// Pairs with a word failing the word-level rules (other than proper nouns).
    pub invalid_word: usize,
    pub proper_noun: usize,
    pub identical: usize,
    pub collocation: usize,
    pub morphological: usize,
}

impl RejectionCounts {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Blank | Rejection::Blocked | Rejection::Rare | Rejection::Length => {
                self.invalid_word += 1
            }
            Rejection::ProperNoun => self.proper_noun += 1,
            Rejection::Identical => self.identical += 1,
            Rejection::Collocation => self.collocation += 1,
            Rejection::Morphological => self.morphological += 1,
        }
    }

    /// Total number of rejected pairs.
    pub fn total(&self) -> usize {
        self.invalid_word
            + self.proper_noun
            + self.identical
            + self.collocation
            + self.morphological
    }
}

/// Aggregate statistics of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStatistics {
    /// Distinct unordered candidate pairs examined.
    pub total_pairs_considered: usize,
    /// Pairs that passed every rule.
    pub pairs_accepted: usize,
    /// Lowest similarity among accepted pairs.
    pub min_similarity: f64,
    /// Mean similarity of accepted pairs.
    pub avg_similarity: f64,
    /// Highest similarity among accepted pairs.
    pub max_similarity: f64,
    /// Rejections broken down by reason.
    pub rejections: RejectionCounts,
}

/// A validated group member with its similarity to the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedSynonym {
    pub word: String,
    pub similarity: f64,
}

/// Result of validating candidate groups.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// Validated groups, a subset of the candidates.
    pub groups: SynonymGroups,
    /// Accepted synonyms per anchor with similarities, best first.
    pub scored: BTreeMap<String, Vec<AcceptedSynonym>>,
    pub statistics: ValidationStatistics,
}

/// Rule-based synonym validator.
pub struct SynonymValidator<'a> {
    options: &'a MiningOptions,
    statistics: &'a CorpusStatistics,
}

impl<'a> SynonymValidator<'a> {
    /// Create a validator over the given corpus statistics.
    pub fn new(options: &'a MiningOptions, statistics: &'a CorpusStatistics) -> Self {
        SynonymValidator {
            options,
            statistics,
        }
    }

    /// Check a single word against the word-level rules.
    pub fn check_word(&self, word: &str) -> Result<(), Rejection> {
        let word = normalize(word);
        if word.is_empty() {
            return Err(Rejection::Blank);
        }
        if self.options.is_blocked(&word) {
            return Err(Rejection::Blocked);
        }

        let counts = self.statistics.counts(&word);
        if counts.occurrences < self.options.min_word_frequency {
            return Err(Rejection::Rare);
        }

        let len = word.chars().count();
        if len < self.options.min_word_length || len > self.options.max_word_length {
            return Err(Rejection::Length);
        }

        if self.options.exclude_proper_nouns
            && counts.capitalization_ratio() >= self.options.proper_noun_capitalization_threshold
            && counts.capitalized >= self.options.min_proper_noun_occurrences
        {
            return Err(Rejection::ProperNoun);
        }

        Ok(())
    }

    /// Whether a word passes the word-level rules.
    pub fn is_valid_word(&self, word: &str) -> bool {
        self.check_word(word).is_ok()
    }

    /// Check a pair against both word-level and pair-level rules.
    pub fn check_pair(&self, word1: &str, word2: &str) -> Result<(), Rejection> {
        self.check_word(word1)?;
        self.check_word(word2)?;

        let (a, b) = (normalize(word1), normalize(word2));
        if a == b {
            return Err(Rejection::Identical);
        }

        if self.options.exclude_compound_terms
            && self.statistics.bigram_count(&a, &b) >= self.options.min_compound_occurrences
        {
            return Err(Rejection::Collocation);
        }

        if is_morphological_variant(&a, &b, self.options.morphological_similarity_threshold) {
            return Err(Rejection::Morphological);
        }

        Ok(())
    }

    /// Whether a pair passes every rule.
    pub fn is_valid_pair(&self, word1: &str, word2: &str) -> bool {
        self.check_pair(word1, word2).is_ok()
    }

    /// Validate candidate groups.
    ///
    /// Every unordered pair is judged once and the verdict applies to both
    /// directions. Anchors left without accepted neighbors are dropped.
    pub fn validate(&self, candidates: &CandidateGroups) -> ValidationOutcome {
        let pairs: Vec<(&str, &str, f64)> = candidates
            .iter()
            .flat_map(|(anchor, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |n| anchor.as_str() < n.word.as_str())
                    .map(move |n| (anchor.as_str(), n.word.as_str(), n.similarity))
            })
            .collect();

        let verdicts: Vec<Result<(), Rejection>> = pairs
            .par_iter()
            .map(|(a, b, _)| self.check_pair(a, b))
            .collect();

        let mut statistics = ValidationStatistics {
            total_pairs_considered: pairs.len(),
            ..Default::default()
        };
        let mut accepted: BTreeSet<(&str, &str)> = BTreeSet::new();
        let mut similarity_sum = 0.0;
        let mut min_similarity = f64::MAX;
        let mut max_similarity: f64 = 0.0;

        for ((a, b, similarity), verdict) in pairs.iter().zip(verdicts) {
            match verdict {
                Ok(()) => {
                    accepted.insert((*a, *b));
                    similarity_sum += similarity;
                    min_similarity = min_similarity.min(*similarity);
                    max_similarity = max_similarity.max(*similarity);
                }
                Err(rejection) => statistics.rejections.record(rejection),
            }
        }

        statistics.pairs_accepted = accepted.len();
        if !accepted.is_empty() {
            statistics.min_similarity = min_similarity;
            statistics.max_similarity = max_similarity;
            statistics.avg_similarity = similarity_sum / accepted.len() as f64;
        }

        let mut outcome = ValidationOutcome {
            statistics,
            ..Default::default()
        };

        for (anchor, neighbors) in candidates {
            let kept: Vec<AcceptedSynonym> = neighbors
                .iter()
                .filter(|n| {
                    let key = if anchor.as_str() < n.word.as_str() {
                        (anchor.as_str(), n.word.as_str())
                    } else {
                        (n.word.as_str(), anchor.as_str())
                    };
                    accepted.contains(&key)
                })
                .map(|n| AcceptedSynonym {
                    word: n.word.clone(),
                    similarity: n.similarity,
                })
                .collect();

            if kept.is_empty() {
                continue;
            }
            outcome.groups.insert(
                anchor.clone(),
                kept.iter().map(|s| s.word.clone()).collect(),
            );
            outcome.scored.insert(anchor.clone(), kept);
        }

        debug!("Rejections: {:?}", outcome.statistics.rejections);
        info!(
            "Validated {} of {} candidate pairs into {} groups",
            outcome.statistics.pairs_accepted,
            outcome.statistics.total_pairs_considered,
            outcome.groups.len()
        );
        outcome
    }
}
