//! Search-outcome learning and the analytics-learned corrector.
//!
//! After every executed search the caller reports the final query, its result
//! count, whether it succeeded and, if correction changed it, the query as
//! typed. [`AnalyticsStore`] keeps running statistics per normalized query and
//! learns `original → final` replacements from successful corrected searches.
//! [`AnalyticsCorrector`] replays those replacements and, for queries the
//! engine cannot answer, suggests a historically successful look-alike.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use ahash::AHashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::normalize;
use crate::error::{GlossaError, Result};
use crate::persistence::{read_json, write_json_atomic};
use crate::search::SearchEngine;
use crate::spelling::levenshtein::levenshtein_distance_threshold;
use crate::spelling::strategy::{SpellCheckResult, SpellCheckStrategy};

/// Confidence of an exact learned replacement.
pub const LEARNED_CONFIDENCE: f64 = 0.95;

/// Factor applied to a similar query's success rate to get a confidence.
pub const SIMILAR_QUERY_CONFIDENCE_FACTOR: f64 = 0.9;

/// Running statistics of one normalized query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryStats {
    pub query: String,
    pub search_count: u64,
    pub success_count: u64,
    pub total_results: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Queries that were corrected into this one and then succeeded.
    #[serde(default)]
    pub corrected_from: BTreeSet<String>,
}

impl SearchQueryStats {
    fn new(query: String, now: DateTime<Utc>) -> Self {
        SearchQueryStats {
            query,
            search_count: 0,
            success_count: 0,
            total_results: 0,
            first_seen: now,
            last_seen: now,
            corrected_from: BTreeSet::new(),
        }
    }

    /// Fraction of searches that succeeded.
    pub fn success_rate(&self) -> f64 {
        if self.search_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.search_count as f64
        }
    }

    /// Mean number of results per search.
    pub fn average_results(&self) -> f64 {
        if self.search_count == 0 {
            0.0
        } else {
            self.total_results as f64 / self.search_count as f64
        }
    }
}

/// Tuning of the analytics store and similarity lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsOptions {
    /// Persist after this many recorded searches; 0 disables periodic flushes.
    pub flush_interval: usize,
    /// Maximum edit distance for a similar historical query.
    pub max_edit_distance: usize,
    /// Minimum success rate for a similar historical query.
    pub min_success_rate: f64,
    /// Minimum number of searches for a similar historical query.
    pub min_searches: u64,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        AnalyticsOptions {
            flush_interval: 10,
            max_edit_distance: 2,
            min_success_rate: 0.7,
            min_searches: 2,
        }
    }
}

impl AnalyticsOptions {
    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_success_rate) {
            return Err(GlossaError::config(format!(
                "min_success_rate must be within [0, 1], got {}",
                self.min_success_rate
            )));
        }
        Ok(())
    }
}

/// A historical query similar to the one being corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarQuery {
    pub query: String,
    pub distance: usize,
    pub success_rate: f64,
}

/// On-disk layout of `search_analytics.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AnalyticsFile {
    #[serde(default)]
    queries: BTreeMap<String, SearchQueryStats>,
}

#[derive(Debug, Default)]
struct AnalyticsState {
    queries: BTreeMap<String, SearchQueryStats>,
    learned: AHashMap<String, String>,
}

impl AnalyticsState {
    fn from_queries(queries: BTreeMap<String, SearchQueryStats>) -> Self {
        let mut learned: AHashMap<String, String> = AHashMap::new();
        for (target, stats) in &queries {
            for source in &stats.corrected_from {
                let better = match learned.get(source).and_then(|t| queries.get(t)) {
                    Some(current) => stats.success_count > current.success_count,
                    None => true,
                };
                if better {
                    learned.insert(source.clone(), target.clone());
                }
            }
        }
        AnalyticsState { queries, learned }
    }
}

/// Lock-guarded per-query statistics with periodic persistence.
#[derive(Debug)]
pub struct AnalyticsStore {
    path: Option<PathBuf>,
    options: AnalyticsOptions,
    state: RwLock<AnalyticsState>,
    pending: AtomicUsize,
    revision: AtomicU64,
    snapshots: AtomicU64,
    /// Sequence number of the newest snapshot on disk.
    written: Arc<Mutex<u64>>,
}

impl AnalyticsStore {
    /// Create a store that is never persisted.
    pub fn in_memory(options: AnalyticsOptions) -> Self {
        AnalyticsStore {
            path: None,
            options,
            state: RwLock::new(AnalyticsState::default()),
            pending: AtomicUsize::new(0),
            revision: AtomicU64::new(0),
            snapshots: AtomicU64::new(0),
            written: Arc::new(Mutex::new(0)),
        }
    }

    /// Load a store from `path`.
    ///
    /// A missing or unreadable file yields an empty store bound to the same
    /// path.
    pub fn load<P: AsRef<Path>>(path: P, options: AnalyticsOptions) -> Self {
        let path = path.as_ref();
        let queries = match read_json::<AnalyticsFile, _>(path) {
            Ok(Some(file)) => {
                info!(
                    "Loaded analytics for {} queries from {}",
                    file.queries.len(),
                    path.display()
                );
                file.queries
            }
            Ok(None) => {
                info!("No analytics at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable analytics: {e}");
                BTreeMap::new()
            }
        };

        AnalyticsStore {
            path: Some(path.to_path_buf()),
            options,
            state: RwLock::new(AnalyticsState::from_queries(queries)),
            pending: AtomicUsize::new(0),
            revision: AtomicU64::new(0),
            snapshots: AtomicU64::new(0),
            written: Arc::new(Mutex::new(0)),
        }
    }

    /// The options of this store.
    pub fn options(&self) -> &AnalyticsOptions {
        &self.options
    }

    /// Where the store is persisted, if anywhere.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of tracked queries.
    pub fn len(&self) -> usize {
        self.state.read().queries.len()
    }

    /// Whether no query has been tracked.
    pub fn is_empty(&self) -> bool {
        self.state.read().queries.is_empty()
    }

    /// Record the outcome of one executed search.
    ///
    /// On success with an `original_query` that normalizes differently from
    /// `final_query`, the replacement is learned and usable immediately.
    pub fn record_search(
        &self,
        final_query: &str,
        result_count: usize,
        was_successful: bool,
        original_query: Option<&str>,
    ) {
        let query = normalize(final_query);
        if query.is_empty() {
            return;
        }
        let now = Utc::now();

        {
            let mut state = self.state.write();
            let stats = state
                .queries
                .entry(query.clone())
                .or_insert_with(|| SearchQueryStats::new(query.clone(), now));
            stats.search_count += 1;
            stats.total_results += result_count as u64;
            stats.last_seen = now;
            if was_successful {
                stats.success_count += 1;
            }

            let source = original_query
                .map(normalize)
                .filter(|source| was_successful && !source.is_empty() && *source != query);
            if let Some(source) = source {
                stats.corrected_from.insert(source.clone());
                debug!("Learned correction '{source}' -> '{query}'");
                if state.learned.insert(source, query.clone()).as_ref() != Some(&query) {
                    self.revision.fetch_add(1, Ordering::AcqRel);
                }
            }
        }

        if self.options.flush_interval > 0 {
            let pending = self.pending.fetch_add(1, Ordering::AcqRel) + 1;
            if pending >= self.options.flush_interval {
                self.pending.store(0, Ordering::Release);
                self.flush_in_background();
            }
        }
    }

    /// Increases each time a learned correction is added or retargeted.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// The learned replacement for a query, if any.
    pub fn learned_correction(&self, query: &str) -> Option<String> {
        self.state.read().learned.get(&normalize(query)).cloned()
    }

    /// Statistics of a query, if tracked.
    pub fn stats(&self, query: &str) -> Option<SearchQueryStats> {
        self.state.read().queries.get(&normalize(query)).cloned()
    }

    /// The `n` most searched queries.
    pub fn top_queries(&self, n: usize) -> Vec<SearchQueryStats> {
        let state = self.state.read();
        let mut queries: Vec<&SearchQueryStats> = state.queries.values().collect();
        queries.sort_by(|a, b| b.search_count.cmp(&a.search_count).then(a.query.cmp(&b.query)));
        queries.into_iter().take(n).cloned().collect()
    }

    /// Find the best historically successful query within the configured
    /// edit distance of `query`.
    ///
    /// Candidates are ranked by success rate, then distance, then search
    /// count.
    pub fn find_similar_successful(&self, query: &str) -> Option<SimilarQuery> {
        let query = normalize(query);
        if query.is_empty() {
            return None;
        }

        let state = self.state.read();
        let mut best: Option<(&SearchQueryStats, SimilarQuery)> = None;
        for stats in state.queries.values() {
            if stats.query == query
                || stats.search_count < self.options.min_searches
                || stats.success_rate() < self.options.min_success_rate
            {
                continue;
            }
            let Some(distance) =
                levenshtein_distance_threshold(&query, &stats.query, self.options.max_edit_distance)
            else {
                continue;
            };

            let candidate = SimilarQuery {
                query: stats.query.clone(),
                distance,
                success_rate: stats.success_rate(),
            };
            let replace = match &best {
                None => true,
                Some((best_stats, current)) => {
                    candidate.success_rate > current.success_rate
                        || (candidate.success_rate == current.success_rate
                            && (candidate.distance < current.distance
                                || (candidate.distance == current.distance
                                    && stats.search_count > best_stats.search_count)))
                }
            };
            if replace {
                best = Some((stats, candidate));
            }
        }

        best.map(|(_, similar)| similar)
    }

    /// Persist the store synchronously. A store without a path is a no-op.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let (sequence, snapshot) = self.snapshot();
        write_snapshot(&self.written, path, sequence, &snapshot)?;
        debug!("Saved analytics to {}", path.display());
        Ok(())
    }

    fn snapshot(&self) -> (u64, AnalyticsFile) {
        let state = self.state.read();
        let sequence = self.snapshots.fetch_add(1, Ordering::AcqRel) + 1;
        let snapshot = AnalyticsFile {
            queries: state.queries.clone(),
        };
        (sequence, snapshot)
    }

    /// Persist without blocking the caller when a tokio runtime is running.
    fn flush_in_background(&self) {
        let Some(path) = self.path.clone() else {
            return;
        };
        let (sequence, snapshot) = self.snapshot();
        let written = self.written.clone();
        let flush = move || {
            if let Err(e) = write_snapshot(&written, &path, sequence, &snapshot) {
                warn!("Failed to flush analytics to {}: {e}", path.display());
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(flush);
            }
            Err(_) => flush(),
        }
    }
}

/// Write a snapshot unless a newer one already reached the disk.
///
/// Returns whether the file was written.
fn write_snapshot(
    written: &Mutex<u64>,
    path: &Path,
    sequence: u64,
    snapshot: &AnalyticsFile,
) -> Result<bool> {
    let mut last = written.lock();
    if sequence <= *last {
        debug!("Skipping stale analytics snapshot #{sequence} (#{} on disk)", *last);
        return Ok(false);
    }
    write_json_atomic(path, snapshot)?;
    *last = sequence;
    Ok(true)
}

/// Corrector replaying corrections learned from search outcomes.
pub struct AnalyticsCorrector {
    store: Arc<AnalyticsStore>,
    search_engine: Option<Arc<dyn SearchEngine>>,
}

impl AnalyticsCorrector {
    /// Create a corrector. Without a search engine only exact learned
    /// replacements are applied.
    pub fn new(store: Arc<AnalyticsStore>, search_engine: Option<Arc<dyn SearchEngine>>) -> Self {
        AnalyticsCorrector {
            store,
            search_engine,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<AnalyticsStore> {
        &self.store
    }
}

#[async_trait]
impl SpellCheckStrategy for AnalyticsCorrector {
    fn name(&self) -> &str {
        "analytics"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn revision(&self) -> u64 {
        self.store.revision()
    }

    async fn check(&self, query: &str) -> Result<SpellCheckResult> {
        if let Some(learned) = self.store.learned_correction(query) {
            return Ok(SpellCheckResult::changed(
                query,
                learned,
                self.name(),
                LEARNED_CONFIDENCE,
            ));
        }

        let Some(engine) = &self.search_engine else {
            return Ok(SpellCheckResult::unchanged(query));
        };
        if engine.count(query).await? > 0 {
            return Ok(SpellCheckResult::unchanged(query));
        }

        match self.store.find_similar_successful(query) {
            Some(similar) => {
                debug!(
                    "'{query}' has no results, suggesting '{}' (distance {})",
                    similar.query, similar.distance
                );
                Ok(SpellCheckResult::changed(
                    query,
                    similar.query,
                    self.name(),
                    similar.success_rate * SIMILAR_QUERY_CONFIDENCE_FACTOR,
                ))
            }
            None => Ok(SpellCheckResult::unchanged(query)),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::corpus::Article;
    use crate::search::MemorySearchEngine;

    fn no_flush() -> AnalyticsOptions {
        AnalyticsOptions {
            flush_interval: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_record_search_updates_stats() {
        let store = AnalyticsStore::in_memory(no_flush());
        store.record_search("Путин", 5, true, None);
        store.record_search("путин ", 0, false, None);

        let stats = store.stats("путин").unwrap();
        assert_eq!(stats.search_count, 2);
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.success_rate(), 0.5);
        assert_eq!(stats.average_results(), 2.5);
        assert!(store.stats("   ").is_none());
    }

    #[test]
    fn test_learns_only_successful_corrections() {
        let store = AnalyticsStore::in_memory(no_flush());
        store.record_search("путин выступил", 0, false, Some("путен выступил"));
        assert!(store.learned_correction("путен выступил").is_none());

        store.record_search("путин выступил", 3, true, Some("Путен выступил"));
        assert_eq!(
            store.learned_correction("путен выступил").as_deref(),
            Some("путин выступил")
        );

        store.record_search("путин", 3, true, Some("путин"));
        assert!(store.learned_correction("путин").is_none());
    }

    #[test]
    fn test_find_similar_successful() {
        let store = AnalyticsStore::in_memory(no_flush());
        for _ in 0..3 {
            store.record_search("погода москва", 10, true, None);
        }
        store.record_search("погода мосвка", 0, false, None);
        store.record_search("погода минск", 10, true, None);

        let similar = store.find_similar_successful("погода моска").unwrap();
        assert_eq!(similar.query, "погода москва");
        assert_eq!(similar.distance, 1);
        assert_eq!(similar.success_rate, 1.0);

        assert!(store.find_similar_successful("спорт").is_none());
    }

    #[test]
    fn test_revision_tracks_learned_corrections() {
        let store = AnalyticsStore::in_memory(no_flush());
        store.record_search("выборы", 4, true, None);
        assert_eq!(store.revision(), 0);

        store.record_search("выборы", 4, true, Some("выбары"));
        assert_eq!(store.revision(), 1);
        store.record_search("выборы", 4, true, Some("выбары"));
        assert_eq!(store.revision(), 1);

        store.record_search("выборы мэра", 2, true, Some("выбары"));
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_top_queries() {
        let store = AnalyticsStore::in_memory(no_flush());
        store.record_search("выборы", 1, true, None);
        store.record_search("погода", 1, true, None);
        store.record_search("погода", 1, true, None);

        let top = store.top_queries(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].query, "погода");
    }

    #[test]
    fn test_save_and_reload_rebuilds_learned() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search_analytics.json");

        let store = AnalyticsStore::load(&path, no_flush());
        assert!(store.is_empty());
        store.record_search("путин выступил", 3, true, Some("путен выступил"));
        store.save().unwrap();

        let reloaded = AnalyticsStore::load(&path, no_flush());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            reloaded.learned_correction("путен выступил").as_deref(),
            Some("путин выступил")
        );
    }

    #[test]
    fn test_malformed_file_yields_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search_analytics.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = AnalyticsStore::load(&path, no_flush());
        assert!(store.is_empty());
    }

    #[test]
    fn test_periodic_flush_without_runtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search_analytics.json");
        let options = AnalyticsOptions {
            flush_interval: 2,
            ..Default::default()
        };

        let store = AnalyticsStore::load(&path, options);
        store.record_search("выборы", 1, true, None);
        assert!(!path.exists());
        store.record_search("выборы", 1, true, None);
        assert!(path.exists());
    }

    #[test]
    fn test_older_snapshot_never_overwrites_newer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search_analytics.json");
        let store = AnalyticsStore::load(&path, no_flush());

        store.record_search("выборы", 1, true, None);
        let older = store.snapshot();
        store.record_search("погода", 1, true, None);
        let newer = store.snapshot();

        assert!(write_snapshot(&store.written, &path, newer.0, &newer.1).unwrap());
        assert!(!write_snapshot(&store.written, &path, older.0, &older.1).unwrap());

        let reloaded = AnalyticsStore::load(&path, no_flush());
        assert_eq!(reloaded.len(), 2);

        // an explicit save always takes a fresh snapshot
        store.record_search("спорт", 1, true, None);
        store.save().unwrap();
        assert_eq!(AnalyticsStore::load(&path, no_flush()).len(), 3);
    }

    #[tokio::test]
    async fn test_learned_replacement_scenario() {
        let store = Arc::new(AnalyticsStore::in_memory(no_flush()));
        store.record_search("путин выступил", 4, true, Some("путен выступил"));

        let corrector = AnalyticsCorrector::new(store, None);
        let result = corrector.check("путен выступил").await.unwrap();
        assert_eq!(result.query(), "путин выступил");
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.confidence, LEARNED_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_zero_result_query_gets_similar_suggestion() {
        let store = Arc::new(AnalyticsStore::in_memory(no_flush()));
        for _ in 0..4 {
            store.record_search("выборы", 2, true, None);
        }
        let engine: Arc<dyn SearchEngine> = Arc::new(MemorySearchEngine::new(vec![Article::new(
            "Выборы",
            "президент назначил выборы",
        )]));

        let corrector = AnalyticsCorrector::new(store, Some(engine));
        let result = corrector.check("выбры").await.unwrap();
        assert_eq!(result.query(), "выборы");
        assert!((result.confidence - 0.9).abs() < 1e-9);

        let result = corrector.check("президент").await.unwrap();
        assert!(!result.has_changes);
    }
}
