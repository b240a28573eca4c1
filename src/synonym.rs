//! Corpus-driven synonym mining.
//!
//! The pipeline runs bottom-up over a batch of articles:
//!
//! 1. [`cooccurrence`] builds a word → documents inverted index and computes
//!    Jaccard similarity for every pair of words sharing a document.
//! 2. [`validator`] rejects false positives: rare, short, proper-noun words,
//!    collocation halves and morphological variants ([`morphology`]).
//! 3. [`miner`] orchestrates the run and scores each anchor word.
//! 4. [`store`] persists the result and serves symmetric lookups.
//!
//! Groups are star-shaped: a word is related only to its direct neighbors,
//! never to neighbors of neighbors.

pub mod cooccurrence;
pub mod miner;
pub mod morphology;
pub mod options;
pub mod store;
pub mod validator;

use std::collections::{BTreeMap, BTreeSet};

/// Anchor word → set of related words.
pub type SynonymGroups = BTreeMap<String, BTreeSet<String>>;
