//! Persisted synonym data and symmetric lookup.
//!
//! Groups are stored anchor-keyed, exactly as mining produced them. Lookups
//! must nevertheless work from either side of a pair, so the store derives a
//! reverse index (member → anchors) whenever its data is loaded or replaced.
//!
//! The on-disk artifact is plain JSON and may be hand-edited between runs:
//!
//! ```json
//! {
//!   "synonyms": { "врач": ["доктор"] },
//!   "confidenceScores": { "врач": 0.82 },
//!   "statistics": { "totalPairsConsidered": 120, "pairsAccepted": 14 },
//!   "lastUpdated": "2024-03-01T12:00:00Z"
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::normalize;
use crate::error::Result;
use crate::persistence::{read_json, write_json_atomic};
use crate::synonym::SynonymGroups;
use crate::synonym::validator::RejectionCounts;

/// Statistics of the mining run that produced the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynonymStatistics {
    pub total_pairs_considered: usize,
    pub pairs_accepted: usize,
    pub min_similarity: f64,
    pub avg_similarity: f64,
    pub max_similarity: f64,
    pub total_groups: usize,
    pub total_documents: usize,
    pub rejections: RejectionCounts,
}

/// The persisted synonym artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynonymData {
    /// Anchor word → validated synonyms.
    pub synonyms: SynonymGroups,
    /// Anchor word → confidence in [0, 1].
    pub confidence_scores: BTreeMap<String, f64>,
    pub statistics: SynonymStatistics,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SynonymData {
    /// Normalize words, drop self-mappings and empty groups, clamp confidences.
    ///
    /// Applied to everything entering a store, since the file may have been
    /// edited by hand.
    pub fn sanitized(self) -> Self {
        let mut synonyms = SynonymGroups::new();
        for (anchor, words) in self.synonyms {
            let anchor = normalize(&anchor);
            if anchor.is_empty() {
                continue;
            }
            let words: BTreeSet<String> = words
                .iter()
                .map(|w| normalize(w))
                .filter(|w| !w.is_empty() && *w != anchor)
                .collect();
            if !words.is_empty() {
                synonyms.entry(anchor).or_default().extend(words);
            }
        }

        let confidence_scores = self
            .confidence_scores
            .into_iter()
            .map(|(word, score)| (normalize(&word), score))
            .filter(|(word, score)| synonyms.contains_key(word) && score.is_finite())
            .map(|(word, score)| (word, score.clamp(0.0, 1.0)))
            .collect();

        SynonymData {
            synonyms,
            confidence_scores,
            statistics: self.statistics,
            last_updated: self.last_updated,
        }
    }
}

/// In-memory synonym store with a derived reverse index.
#[derive(Debug, Clone, Default)]
pub struct SynonymStore {
    data: SynonymData,
    /// Member word → anchors whose group contains it.
    reverse: AHashMap<String, BTreeSet<String>>,
}

impl SynonymStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from mined data.
    pub fn from_data(data: SynonymData) -> Self {
        let mut store = SynonymStore::new();
        store.replace(data);
        store
    }

    /// Load a store from disk.
    ///
    /// A missing or malformed file yields an empty store: expansion then
    /// degrades to "no synonyms" instead of failing.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match read_json::<SynonymData, _>(path) {
            Ok(Some(data)) => {
                let store = Self::from_data(data);
                info!(
                    "Loaded {} synonym groups from {}",
                    store.group_count(),
                    path.display()
                );
                store
            }
            Ok(None) => {
                info!("No synonym data at {}, starting empty", path.display());
                SynonymStore::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable synonym data: {e}");
                SynonymStore::new()
            }
        }
    }

    /// Persist the current data as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json_atomic(path, &self.data)
    }

    /// Replace all data wholesale and rebuild the reverse index.
    pub fn replace(&mut self, data: SynonymData) {
        self.data = data.sanitized();
        self.reverse.clear();
        for (anchor, words) in &self.data.synonyms {
            for word in words {
                self.reverse
                    .entry(word.clone())
                    .or_default()
                    .insert(anchor.clone());
            }
        }
    }

    /// The underlying data.
    pub fn data(&self) -> &SynonymData {
        &self.data
    }

    /// Number of anchor groups.
    pub fn group_count(&self) -> usize {
        self.data.synonyms.len()
    }

    /// Whether the store holds no groups.
    pub fn is_empty(&self) -> bool {
        self.data.synonyms.is_empty()
    }

    /// Synonyms of a word, looked up from either side of a group.
    ///
    /// The result is the word's own group plus, for every group the word is
    /// a member of, that group's anchor and other members. The word itself is
    /// never included.
    pub fn synonyms_of(&self, word: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();

        if let Some(words) = self.data.synonyms.get(word) {
            result.extend(words.iter().cloned());
        }
        if let Some(anchors) = self.reverse.get(word) {
            for anchor in anchors {
                result.insert(anchor.clone());
                if let Some(words) = self.data.synonyms.get(anchor) {
                    result.extend(words.iter().cloned());
                }
            }
        }

        result.remove(word);
        result
    }

    /// Confidence attached to a word.
    ///
    /// Anchors use their own score; plain members inherit the best score of
    /// the groups containing them. Unknown words have no confidence.
    pub fn confidence_of(&self, word: &str) -> Option<f64> {
        let own = self.data.confidence_scores.get(word).copied();
        let inherited = self.reverse.get(word).and_then(|anchors| {
            anchors
                .iter()
                .filter_map(|a| self.data.confidence_scores.get(a).copied())
                .reduce(f64::max)
        });

        match (own, inherited) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }
}
