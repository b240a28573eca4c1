//! Correction chain scenarios across strategies, restarts and the pipeline.

use std::net::TcpListener;
use std::sync::Arc;

use glossa::config::GlossaConfig;
use glossa::corpus::Article;
use glossa::error::Result;
use glossa::pipeline::QueryPipeline;
use glossa::search::{MemorySearchEngine, SearchEngine, SearchRequest};
use glossa::spelling::analytics::{AnalyticsCorrector, AnalyticsOptions, AnalyticsStore};
use glossa::spelling::composite::CompositeCorrector;
use glossa::spelling::dictionary::CommonWords;
use glossa::spelling::keyboard::KeyboardLayoutCorrector;
use glossa::synonym::store::{SynonymData, SynonymStore};
use tempfile::TempDir;

fn options() -> AnalyticsOptions {
    AnalyticsOptions {
        flush_interval: 0,
        ..Default::default()
    }
}

fn chain(analytics: Arc<AnalyticsStore>) -> CompositeCorrector {
    let mut corrector = CompositeCorrector::new(100);
    corrector.register(Arc::new(AnalyticsCorrector::new(analytics, None)));
    corrector.register(Arc::new(KeyboardLayoutCorrector::new(Arc::new(
        CommonWords::builtin(),
    ))));
    corrector
}

fn test_config(dir: &TempDir) -> GlossaConfig {
    let mut config = GlossaConfig::default();
    config.paths.synonyms = dir.path().join("synonyms.json");
    config.paths.analytics = dir.path().join("search_analytics.json");
    config.analytics = options();
    config
}

#[tokio::test]
async fn learned_replacement_applies_with_single_step() {
    let analytics = Arc::new(AnalyticsStore::in_memory(options()));
    analytics.record_search("путин выступил", 12, true, Some("путен выступил"));

    let corrector = chain(analytics);
    assert_eq!(corrector.strategy_names(), vec!["keyboard_layout", "analytics"]);

    let result = corrector.correct("путен выступил").await;
    assert_eq!(result.query(), "путин выступил");
    assert!(result.has_changes);
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].method, "analytics");
    assert_eq!(result.steps[0].before, "путен выступил");
}

#[tokio::test]
async fn keyboard_output_feeds_learned_correction() {
    let analytics = Arc::new(AnalyticsStore::in_memory(options()));
    analytics.record_search("новости спорт", 7, true, Some("новости спорта"));

    let corrector = chain(analytics);
    let result = corrector.correct("yjdjcnb спорта").await;
    assert_eq!(result.query(), "новости спорт");
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.steps[0].method, "keyboard_layout");
    assert_eq!(result.steps[1].method, "analytics");
    assert!((result.confidence - 0.9).abs() < 1e-9);
}

#[test]
fn correction_is_deterministic_and_cached() {
    let analytics = Arc::new(AnalyticsStore::in_memory(options()));
    let corrector = chain(analytics);

    let first = tokio_test::block_on(corrector.correct("ghbdtn"));
    let second = tokio_test::block_on(corrector.correct("ghbdtn"));

    assert_eq!(first, second);
    assert_eq!(second.query(), "привет");
    assert_eq!(corrector.cache_stats().hits, 1);
}

#[tokio::test]
async fn learned_correction_applies_to_cached_query() {
    let analytics = Arc::new(AnalyticsStore::in_memory(options()));
    let corrector = chain(analytics.clone());

    let before = corrector.correct("путен выступил").await;
    assert!(!before.has_changes);

    analytics.record_search("путин выступил", 5, true, Some("путен выступил"));
    let after = corrector.correct("путен выступил").await;
    assert_eq!(after.query(), "путин выступил");
    assert_eq!(after.steps.len(), 1);
    assert_eq!(after.steps[0].method, "analytics");

    let again = corrector.correct("путен выступил").await;
    assert_eq!(again, after);
    assert_eq!(corrector.cache_stats().hits, 1);
}

#[tokio::test]
async fn learned_corrections_survive_restart() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let pipeline = QueryPipeline::from_config(&config, None).await?;
    pipeline
        .analytics()
        .unwrap()
        .record_search("путин выступил", 3, true, Some("путен выступил"));
    pipeline.save()?;
    drop(pipeline);

    let pipeline = QueryPipeline::from_config(&config, None).await?;
    let prepared = pipeline.prepare("путен выступил").await;
    assert_eq!(prepared.corrected, "путин выступил");
    assert!(prepared.was_corrected());

    Ok(())
}

#[tokio::test]
async fn pipeline_search_learns_from_zero_result_fallback() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let mut data = SynonymData::default();
    data.synonyms.insert(
        "выборы".to_string(),
        ["голосование".to_string()].into_iter().collect(),
    );
    data.confidence_scores.insert("выборы".to_string(), 0.75);
    SynonymStore::from_data(data).save(&config.paths.synonyms)?;

    let engine: Arc<dyn SearchEngine> = Arc::new(MemorySearchEngine::new(vec![
        Article::new("Выборы", "голосование прошло спокойно"),
        Article::new("Выборы мэра", "кандидаты готовятся к голосованию"),
    ]));
    let pipeline = QueryPipeline::from_config(&config, Some(engine.clone())).await?;
    let analytics = pipeline.analytics().unwrap().clone();

    for _ in 0..3 {
        let (_, results) = pipeline
            .search(engine.as_ref(), "выборы", SearchRequest::new(""))
            .await?;
        assert_eq!(results.total_count, 2);
    }
    assert_eq!(analytics.stats("выборы").unwrap().success_count, 3);

    let (prepared, results) = pipeline
        .search(engine.as_ref(), "выбары", SearchRequest::new(""))
        .await?;
    assert_eq!(prepared.corrected, "выборы");
    assert_eq!(prepared.expanded, "выборы голосование");
    assert!(results.total_count > 0);
    assert_eq!(
        analytics.learned_correction("выбары").as_deref(),
        Some("выборы")
    );

    Ok(())
}

#[tokio::test]
async fn unreachable_llm_is_never_registered() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    config.correction.enable_llm = true;
    config.llm.base_url = format!("http://{addr}");
    config.llm.connect_timeout_secs = 1;

    let pipeline = QueryPipeline::from_config(&config, None).await?;
    let names = pipeline.corrector().strategy_names();
    assert!(!names.contains(&"llm".to_string()));
    assert_eq!(names, vec!["keyboard_layout", "analytics"]);

    let prepared = pipeline.prepare("как дела").await;
    assert_eq!(prepared.corrected, "как дела");

    Ok(())
}
