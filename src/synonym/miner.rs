//! Synonym mining runs.
//!
//! A run is an explicit synchronous batch pass over the whole corpus. It only
//! touches structures it creates itself, so re-running from scratch is always
//! safe, and its output replaces (never merges with) previously mined data.
//!
//! # Examples
//!
//! ```
//! use glossa::corpus::Article;
//! use glossa::synonym::miner::SynonymMiner;
//! use glossa::synonym::options::MiningOptions;
//!
//! let articles = vec![Article::new("", "врач доктор лечит"); 3];
//! let options = MiningOptions {
//!     exclude_compound_terms: false,
//!     ..Default::default()
//! };
//! let data = SynonymMiner::new(options).unwrap().mine(&articles);
//! assert!(data.synonyms["врач"].contains("доктор"));
//! ```

use chrono::Utc;
use log::info;

use crate::analysis::tokenizer::Tokenizer;
use crate::corpus::{Article, CorpusStatistics};
use crate::error::Result;
use crate::synonym::cooccurrence::CooccurrenceAnalyzer;
use crate::synonym::options::MiningOptions;
use crate::synonym::store::{SynonymData, SynonymStatistics};
use crate::synonym::validator::{SynonymValidator, ValidationOutcome};

/// Runs the co-occurrence → validation pipeline over a corpus.
#[derive(Debug, Clone)]
pub struct SynonymMiner {
    options: MiningOptions,
    tokenizer: Tokenizer,
}

impl SynonymMiner {
    /// Create a miner; fails if the options are out of range.
    pub fn new(options: MiningOptions) -> Result<Self> {
        let tokenizer = options.tokenizer();
        Self::with_tokenizer(options, tokenizer)
    }

    /// Create a miner with a custom tokenizer.
    pub fn with_tokenizer(options: MiningOptions, tokenizer: Tokenizer) -> Result<Self> {
        options.validate()?;
        Ok(SynonymMiner { options, tokenizer })
    }

    /// The options of this miner.
    pub fn options(&self) -> &MiningOptions {
        &self.options
    }

    /// Mine validated synonym groups from a corpus.
    ///
    /// An empty or token-free corpus produces empty data rather than an
    /// error.
    pub fn mine(&self, articles: &[Article]) -> SynonymData {
        info!("Mining synonyms from {} articles", articles.len());

        let statistics = CorpusStatistics::from_articles(articles, &self.tokenizer);
        let mut analyzer = CooccurrenceAnalyzer::new(self.tokenizer.clone());
        analyzer.build_index(articles);

        let similarities = analyzer.compute_similarities(self.options.min_similarity_threshold);
        let candidates = CooccurrenceAnalyzer::candidate_groups(&similarities);
        info!(
            "Found {} candidate pairs across {} anchor words",
            similarities.len(),
            candidates.len()
        );

        let outcome = SynonymValidator::new(&self.options, &statistics).validate(&candidates);
        let data = Self::into_data(outcome, analyzer.document_count());

        info!(
            "Mining finished: {} groups, {} of {} pairs accepted",
            data.statistics.total_groups,
            data.statistics.pairs_accepted,
            data.statistics.total_pairs_considered
        );
        data
    }

    /// Score anchors and assemble the persisted artifact.
    ///
    /// An anchor's confidence is the mean similarity of its accepted synonyms.
    fn into_data(outcome: ValidationOutcome, total_documents: usize) -> SynonymData {
        let confidence_scores = outcome
            .scored
            .iter()
            .map(|(anchor, synonyms)| {
                let mean = synonyms.iter().map(|s| s.similarity).sum::<f64>()
                    / synonyms.len() as f64;
                (anchor.clone(), mean.clamp(0.0, 1.0))
            })
            .collect();

        let validation = outcome.statistics;
        SynonymData {
            statistics: SynonymStatistics {
                total_pairs_considered: validation.total_pairs_considered,
                pairs_accepted: validation.pairs_accepted,
                min_similarity: validation.min_similarity,
                avg_similarity: validation.avg_similarity,
                max_similarity: validation.max_similarity,
                total_groups: outcome.groups.len(),
                total_documents,
                rejections: validation.rejections,
            },
            synonyms: outcome.groups,
            confidence_scores,
            last_updated: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Article> {
        let mut articles = vec![Article::new("Медицина", "врач осмотрел больного, доктор помог"); 3];
        articles.extend(vec![Article::new("", "холодная война началась давно"); 3]);
        articles
    }

    #[test]
    fn test_mine_produces_confident_groups() {
        let data = SynonymMiner::new(MiningOptions::default())
            .unwrap()
            .mine(&corpus());

        assert!(data.synonyms["врач"].contains("доктор"));
        assert!(data.synonyms["доктор"].contains("врач"));
        let confidence = data.confidence_scores["врач"];
        assert!((0.0..=1.0).contains(&confidence));
        assert!(data.last_updated.is_some());
        assert_eq!(data.statistics.total_documents, 6);
        assert_eq!(data.statistics.total_groups, data.synonyms.len());

        // collocation halves are never mined
        assert!(!data.synonyms.get("холодная").is_some_and(|g| g.contains("война")));
    }

    #[test]
    fn test_no_word_maps_to_itself() {
        let data = SynonymMiner::new(MiningOptions::default())
            .unwrap()
            .mine(&corpus());
        for (anchor, words) in &data.synonyms {
            assert!(!words.contains(anchor));
        }
    }

    #[test]
    fn test_empty_corpus_yields_no_groups() {
        let data = SynonymMiner::new(MiningOptions::default())
            .unwrap()
            .mine(&[]);
        assert!(data.synonyms.is_empty());
        assert_eq!(data.statistics.total_pairs_considered, 0);

        let blank = vec![Article::new("", "   "), Article::new("!!", "123")];
        let data = SynonymMiner::new(MiningOptions::default())
            .unwrap()
            .mine(&blank);
        assert!(data.synonyms.is_empty());
    }

    #[test]
    fn test_extra_stop_words_are_never_mined() {
        let options = MiningOptions {
            extra_stop_words: vec!["Доктор".to_string()],
            ..Default::default()
        };
        let data = SynonymMiner::new(options).unwrap().mine(&corpus());
        assert!(!data.synonyms.contains_key("доктор"));
        assert!(data.synonyms.values().all(|g| !g.contains("доктор")));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = MiningOptions {
            morphological_similarity_threshold: -0.1,
            ..Default::default()
        };
        assert!(SynonymMiner::new(options).is_err());
    }

    #[test]
    fn test_scenario_no_transitive_pair() {
        let articles = vec![
            Article::new("", "автомобиль дорога"),
            Article::new("", "машина дорога"),
        ];
        let options = MiningOptions {
            min_similarity_threshold: 0.3,
            min_word_frequency: 1,
            ..Default::default()
        };
        let data = SynonymMiner::new(options).unwrap().mine(&articles);

        assert!(!data.synonyms.get("автомобиль").is_some_and(|g| g.contains("машина")));
        assert!(!data.synonyms.get("машина").is_some_and(|g| g.contains("автомобиль")));
    }
}
