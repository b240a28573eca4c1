//! Text analysis module for Glossa.
//!
//! Turns article and query text into case-folded, stop-word-filtered word
//! tokens. Everything downstream (co-occurrence mining, validation, query
//! expansion) consumes tokens produced here, so the normalization rules live
//! in one place.

pub mod stop_words;
pub mod tokenizer;
