//! Query correction for Glossa.
//!
//! A raw query passes through an ordered chain of independent strategies
//! before expansion:
//!
//! - [`keyboard::KeyboardLayoutCorrector`] fixes text typed with the wrong
//!   keyboard layout active ("ghbdtn" → "привет").
//! - [`analytics::AnalyticsCorrector`] replays corrections learned from past
//!   search outcomes and suggests historically successful look-alikes.
//! - [`llm::LlmCorrector`] asks a local language model as a last resort.
//!
//! [`composite::CompositeCorrector`] owns the chain, the result cache and the
//! per-strategy timeout.

pub mod analytics;
pub mod composite;
pub mod dictionary;
pub mod keyboard;
pub mod levenshtein;
pub mod llm;
pub mod strategy;
