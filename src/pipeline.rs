//! Request-path wiring: correct, expand, search, learn.
//!
//! [`QueryPipeline`] owns the shared pieces a search front end needs on every
//! request. `prepare` turns a raw query into the text handed to the engine;
//! `report_outcome` feeds the engine's answer back into the analytics store
//! so that successful corrections are learned.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::RwLock;

use crate::config::GlossaConfig;
use crate::error::Result;
use crate::expansion::QueryExpander;
use crate::search::{SearchEngine, SearchRequest, SearchResults};
use crate::spelling::analytics::{AnalyticsCorrector, AnalyticsStore};
use crate::spelling::composite::CompositeCorrector;
use crate::spelling::dictionary::CommonWords;
use crate::spelling::keyboard::KeyboardLayoutCorrector;
use crate::spelling::llm::LlmCorrector;
use crate::spelling::strategy::SpellCheckResult;
use crate::synonym::store::SynonymStore;

/// A query ready to be sent to the search engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    /// The query as typed.
    pub original: String,
    /// The query after the correction chain.
    pub corrected: String,
    /// The corrected query with synonyms appended.
    pub expanded: String,
    /// Full correction details.
    pub correction: SpellCheckResult,
}

impl PreparedQuery {
    /// Whether correction changed the query.
    pub fn was_corrected(&self) -> bool {
        self.correction.has_changes && self.corrected != self.original
    }
}

/// Correction, expansion and outcome learning for one process.
pub struct QueryPipeline {
    corrector: Arc<CompositeCorrector>,
    expander: Arc<QueryExpander>,
    analytics: Option<Arc<AnalyticsStore>>,
    confidence_threshold: Option<f64>,
}

impl QueryPipeline {
    /// Assemble a pipeline from prebuilt parts.
    pub fn new(
        corrector: Arc<CompositeCorrector>,
        expander: Arc<QueryExpander>,
        analytics: Option<Arc<AnalyticsStore>>,
    ) -> Self {
        QueryPipeline {
            corrector,
            expander,
            analytics,
            confidence_threshold: None,
        }
    }

    /// Override the expander's default confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    /// Build every component from configuration.
    ///
    /// Loads the synonym and analytics artifacts and the optional dictionary
    /// file (missing or unreadable files mean empty state), registers the enabled strategies and checks the LLM endpoint
    /// once if it is enabled.
    pub async fn from_config(
        config: &GlossaConfig,
        search_engine: Option<Arc<dyn SearchEngine>>,
    ) -> Result<Self> {
        config.validate()?;

        let store = SynonymStore::load(&config.paths.synonyms);
        let mut dictionary = CommonWords::builtin();
        if let Some(path) = &config.paths.dictionary {
            if let Err(e) = dictionary.merge_file(path) {
                warn!(
                    "Ignoring unreadable dictionary {}: {e}, using built-in words",
                    path.display()
                );
            }
        }
        for (anchor, words) in &store.data().synonyms {
            dictionary.add_word(anchor, 1);
            for word in words {
                dictionary.add_word(word, 1);
            }
        }
        debug!("Common-word dictionary holds {} words", dictionary.len());

        let analytics = Arc::new(AnalyticsStore::load(
            &config.paths.analytics,
            config.analytics.clone(),
        ));

        let mut corrector = CompositeCorrector::new(config.correction.cache_capacity)
            .with_strategy_timeout(Duration::from_millis(config.correction.strategy_timeout_ms));
        if config.correction.enable_keyboard {
            corrector.register(Arc::new(KeyboardLayoutCorrector::new(Arc::new(dictionary))));
        }
        if config.correction.enable_analytics {
            corrector.register(Arc::new(AnalyticsCorrector::new(
                analytics.clone(),
                search_engine,
            )));
        }
        if config.correction.enable_llm {
            if let Some(llm) = LlmCorrector::connect(config.llm.clone()).await {
                corrector.register(Arc::new(llm));
            }
        }
        info!(
            "Correction chain: [{}]",
            corrector.strategy_names().join(", ")
        );

        let expander = QueryExpander::new(Arc::new(RwLock::new(store)))
            .with_tokenizer(config.mining.tokenizer())
            .with_default_threshold(config.expansion.confidence_threshold);

        Ok(QueryPipeline::new(
            Arc::new(corrector),
            Arc::new(expander),
            Some(analytics),
        ))
    }

    /// The correction chain.
    pub fn corrector(&self) -> &Arc<CompositeCorrector> {
        &self.corrector
    }

    /// The query expander.
    pub fn expander(&self) -> &Arc<QueryExpander> {
        &self.expander
    }

    /// The analytics store, if outcomes are being learned.
    pub fn analytics(&self) -> Option<&Arc<AnalyticsStore>> {
        self.analytics.as_ref()
    }

    /// Correct and expand a raw query.
    pub async fn prepare(&self, query: &str) -> PreparedQuery {
        let correction = self.corrector.correct(query).await;
        let corrected = correction.corrected_query.clone();
        let expanded = self
            .expander
            .expand_query(&corrected, self.confidence_threshold);

        PreparedQuery {
            original: query.to_string(),
            corrected,
            expanded,
            correction,
        }
    }

    /// Report how a prepared query fared. A search succeeds when it returned
    /// at least one result.
    pub fn report_outcome(&self, prepared: &PreparedQuery, result_count: usize) {
        let Some(analytics) = &self.analytics else {
            return;
        };
        let original = prepared
            .was_corrected()
            .then_some(prepared.original.as_str());
        analytics.record_search(&prepared.corrected, result_count, result_count > 0, original);
    }

    /// Prepare a query, run it and report the outcome.
    ///
    /// `request` supplies paging and filters; its query text is replaced by
    /// the expanded query.
    pub async fn search(
        &self,
        engine: &dyn SearchEngine,
        query: &str,
        request: SearchRequest,
    ) -> Result<(PreparedQuery, SearchResults)> {
        let prepared = self.prepare(query).await;
        let request = SearchRequest {
            query: prepared.expanded.clone(),
            ..request
        };

        let results = match engine.search(&request).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Search for '{}' failed: {e}", prepared.expanded);
                return Err(e);
            }
        };
        self.report_outcome(&prepared, results.total_count);
        Ok((prepared, results))
    }

    /// Persist learned analytics.
    pub fn save(&self) -> Result<()> {
        match &self.analytics {
            Some(analytics) => analytics.save(),
            None => Ok(()),
        }
    }
}
