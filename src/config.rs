//! Configuration for Glossa.
//!
//! A single JSON document configures mining, expansion, the correction chain,
//! the LLM endpoint and artifact locations. Every section and field is
//! optional; omitted values take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GlossaError, Result};
use crate::expansion::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::spelling::analytics::AnalyticsOptions;
use crate::spelling::composite::{DEFAULT_CACHE_CAPACITY, DEFAULT_STRATEGY_TIMEOUT};
use crate::spelling::llm::LlmConfig;
use crate::synonym::options::MiningOptions;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlossaConfig {
    pub mining: MiningOptions,
    pub expansion: ExpansionConfig,
    pub correction: CorrectionConfig,
    pub llm: LlmConfig,
    pub paths: PathsConfig,
    pub analytics: AnalyticsOptions,
}

/// Query expansion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Minimum group confidence for a token to be expanded.
    pub confidence_threshold: f64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        ExpansionConfig {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Correction chain settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Number of cached correction results.
    pub cache_capacity: usize,
    /// Time limit for each strategy, in milliseconds.
    pub strategy_timeout_ms: u64,
    pub enable_keyboard: bool,
    pub enable_analytics: bool,
    pub enable_llm: bool,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        CorrectionConfig {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            strategy_timeout_ms: DEFAULT_STRATEGY_TIMEOUT.as_millis() as u64,
            enable_keyboard: true,
            enable_analytics: true,
            enable_llm: false,
        }
    }
}

/// Artifact locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Mined synonym groups.
    pub synonyms: PathBuf,
    /// Per-query search analytics.
    pub analytics: PathBuf,
    /// Optional extra common-word list, one `word [frequency]` per line.
    pub dictionary: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            synonyms: PathBuf::from("data/synonyms.json"),
            analytics: PathBuf::from("data/search_analytics.json"),
            dictionary: None,
        }
    }
}

impl GlossaConfig {
    /// Load and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: GlossaConfig = serde_json::from_str(&content).map_err(|e| {
            GlossaError::config(format!("Invalid configuration '{}': {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check that every section is in range.
    pub fn validate(&self) -> Result<()> {
        self.mining.validate()?;
        self.analytics.validate()?;

        if !(0.0..=1.0).contains(&self.expansion.confidence_threshold) {
            return Err(GlossaError::config(format!(
                "expansion.confidence_threshold must be within [0, 1], got {}",
                self.expansion.confidence_threshold
            )));
        }
        if self.correction.strategy_timeout_ms == 0 {
            return Err(GlossaError::config(
                "correction.strategy_timeout_ms must be positive",
            ));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(GlossaError::config("llm.base_url must not be empty"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(GlossaError::config("llm.timeout_secs must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = GlossaConfig::default();
        assert_eq!(config.expansion.confidence_threshold, 0.5);
        assert_eq!(config.correction.cache_capacity, 1000);
        assert_eq!(config.correction.strategy_timeout_ms, 30_000);
        assert!(config.correction.enable_keyboard);
        assert!(!config.correction.enable_llm);
        assert_eq!(config.mining.min_similarity_threshold, 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"mining": {{"min_word_frequency": 5}}, "llm": {{"model": "qwen2.5"}}}}"#
        )
        .unwrap();

        let config = GlossaConfig::load(file.path()).unwrap();
        assert_eq!(config.mining.min_word_frequency, 5);
        assert_eq!(config.mining.min_word_length, 3);
        assert_eq!(config.llm.model, "qwen2.5");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = GlossaConfig::default();
        config.expansion.confidence_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = GlossaConfig::default();
        config.mining.min_similarity_threshold = -1.0;
        assert!(config.validate().is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            GlossaConfig::load(file.path()),
            Err(GlossaError::Config(_))
        ));
    }
}
