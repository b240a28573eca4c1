//! Ordered, cached correction chain.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::spelling::strategy::{CorrectionStep, SpellCheckResult, SpellCheckStrategy};

/// Default number of cached results.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Default per-strategy time limit.
pub const DEFAULT_STRATEGY_TIMEOUT: Duration = Duration::from_secs(30);

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Bounded map that evicts the oldest insertion on overflow.
///
/// Each entry remembers the chain revision it was computed under and is
/// only served while that revision is current.
#[derive(Debug)]
struct ResultCache {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, (u64, SpellCheckResult)>,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    fn new(capacity: usize) -> Self {
        ResultCache {
            capacity,
            order: VecDeque::with_capacity(capacity.min(1024)),
            entries: HashMap::with_capacity(capacity.min(1024)),
            hits: 0,
            misses: 0,
        }
    }

    fn get(&mut self, query: &str, revision: u64) -> Option<SpellCheckResult> {
        match self.entries.get(query) {
            Some((cached_revision, result)) if *cached_revision == revision => {
                self.hits += 1;
                Some(result.clone())
            }
            Some(_) => {
                debug!("Cached correction for '{query}' predates learned corrections");
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn insert(&mut self, query: String, revision: u64, result: SpellCheckResult) {
        if self.capacity == 0 {
            return;
        }
        if self
            .entries
            .insert(query.clone(), (revision, result))
            .is_some()
        {
            return;
        }
        self.order.push_back(query);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Runs registered strategies in ascending priority, each on the previous
/// strategy's output.
///
/// A strategy that fails or exceeds its time limit contributes nothing and
/// the chain continues with the last successfully corrected text. The
/// aggregate confidence is the minimum over the applied steps.
pub struct CompositeCorrector {
    strategies: Vec<Arc<dyn SpellCheckStrategy>>,
    cache: Mutex<ResultCache>,
    strategy_timeout: Duration,
}

impl CompositeCorrector {
    /// Create an empty chain with a cache of `cache_capacity` results.
    pub fn new(cache_capacity: usize) -> Self {
        CompositeCorrector {
            strategies: Vec::new(),
            cache: Mutex::new(ResultCache::new(cache_capacity)),
            strategy_timeout: DEFAULT_STRATEGY_TIMEOUT,
        }
    }

    /// Set the per-strategy time limit.
    pub fn with_strategy_timeout(mut self, timeout: Duration) -> Self {
        self.strategy_timeout = timeout;
        self
    }

    /// Add a strategy, keeping the chain ordered by priority.
    ///
    /// Strategies of equal priority run in registration order.
    pub fn register(&mut self, strategy: Arc<dyn SpellCheckStrategy>) {
        debug!(
            "Registered correction strategy '{}' (priority {})",
            strategy.name(),
            strategy.priority()
        );
        self.strategies.push(strategy);
        self.strategies.sort_by_key(|s| s.priority());
    }

    /// Names of the registered strategies, in execution order.
    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    /// Combined revision of the registered strategies.
    fn revision(&self) -> u64 {
        self.strategies
            .iter()
            .fold(0u64, |sum, s| sum.wrapping_add(s.revision()))
    }

    /// Correct a query.
    ///
    /// A cached result is reused until a strategy learns something new.
    pub async fn correct(&self, query: &str) -> SpellCheckResult {
        let revision = self.revision();
        if let Some(cached) = self.cache.lock().get(query, revision) {
            debug!("Correction cache hit for '{query}'");
            return cached;
        }

        let start = Instant::now();
        let mut current = query.to_string();
        let mut steps: Vec<CorrectionStep> = Vec::new();

        for strategy in &self.strategies {
            match tokio::time::timeout(self.strategy_timeout, strategy.check(&current)).await {
                Ok(Ok(result)) if result.has_changes && result.corrected_query != current => {
                    debug!(
                        "{}: '{}' -> '{}'",
                        strategy.name(),
                        current,
                        result.corrected_query
                    );
                    steps.push(CorrectionStep {
                        method: strategy.name().to_string(),
                        before: current.clone(),
                        after: result.corrected_query.clone(),
                        confidence: result.confidence,
                    });
                    current = result.corrected_query;
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    warn!("Correction strategy '{}' failed: {e}", strategy.name());
                }
                Err(_) => {
                    warn!(
                        "Correction strategy '{}' timed out after {:?}",
                        strategy.name(),
                        self.strategy_timeout
                    );
                }
            }
        }

        let confidence = steps
            .iter()
            .map(|step| step.confidence)
            .reduce(f64::min)
            .unwrap_or(1.0);
        let result = SpellCheckResult {
            original_query: query.to_string(),
            corrected_query: current,
            has_changes: !steps.is_empty(),
            confidence,
            elapsed: start.elapsed(),
            steps,
        };

        self.cache
            .lock()
            .insert(query.to_string(), revision, result.clone());
        result
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Drop every cached result.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}
