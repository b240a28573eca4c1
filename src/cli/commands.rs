//! Command implementations for the Glossa CLI.

use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::analysis::tokenizer::normalize;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::GlossaConfig;
use crate::corpus::load_articles;
use crate::error::{GlossaError, Result};
use crate::pipeline::QueryPipeline;
use crate::search::{MemorySearchEngine, SearchEngine, SearchRequest};
use crate::spelling::analytics::AnalyticsStore;
use crate::synonym::cooccurrence::CooccurrenceAnalyzer;
use crate::synonym::miner::SynonymMiner;
use crate::synonym::store::SynonymStore;

/// Execute a CLI command.
pub async fn execute_command(args: GlossaArgs) -> Result<()> {
    let config = GlossaConfig::load_or_default(args.config.as_deref())?;

    match &args.command {
        Command::Mine(mine_args) => mine(mine_args, &config, &args),
        Command::Expand(expand_args) => expand(expand_args, &config, &args).await,
        Command::Correct(correct_args) => correct(correct_args, &config, &args).await,
        Command::Search(search_args) => search(search_args, &config, &args).await,
        Command::Similarity(similarity_args) => similarity(similarity_args, &config, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &config, &args),
    }
}

/// Mine synonyms from a corpus and replace the synonym file.
fn mine(args: &MineArgs, config: &GlossaConfig, cli_args: &GlossaArgs) -> Result<()> {
    let mut options = config.mining.clone();
    if let Some(min_similarity) = args.min_similarity {
        options.min_similarity_threshold = min_similarity;
    }
    if let Some(min_frequency) = args.min_frequency {
        options.min_word_frequency = min_frequency;
    }

    let start_time = Instant::now();
    let articles = load_articles(&args.corpus)?;
    let data = SynonymMiner::new(options)?.mine(&articles);
    let duration = start_time.elapsed();

    let output = if args.dry_run {
        None
    } else {
        let path = args.output.as_ref().unwrap_or(&config.paths.synonyms);
        let store = SynonymStore::from_data(data.clone());
        store.save(path)?;
        info!("Wrote {} synonym groups to {}", store.group_count(), path.display());
        Some(path.display().to_string())
    };

    output_result(
        "Mining finished",
        &MiningReport {
            articles: articles.len(),
            output,
            duration_ms: duration.as_millis() as u64,
            statistics: data.statistics,
            synonyms: args.dry_run.then_some(data.synonyms),
        },
        cli_args,
    )
}

/// Expand a query with the stored synonyms.
async fn expand(args: &ExpandArgs, config: &GlossaConfig, cli_args: &GlossaArgs) -> Result<()> {
    let threshold = args
        .threshold
        .unwrap_or(config.expansion.confidence_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(GlossaError::invalid_argument(format!(
            "threshold must be within [0, 1], got {threshold}"
        )));
    }

    let pipeline = QueryPipeline::from_config(config, None).await?;
    let expanded = pipeline
        .expander()
        .expand_terms(&args.query, Some(threshold));

    output_result(
        "Expanded query",
        &ExpansionReport {
            query: normalize(&args.query),
            expanded: expanded.to_query_string(),
            threshold,
            added_terms: expanded.expansions.into_iter().map(|e| e.term).collect(),
        },
        cli_args,
    )
}

/// Run a query through the correction chain.
async fn correct(args: &CorrectArgs, config: &GlossaConfig, cli_args: &GlossaArgs) -> Result<()> {
    let mut config = config.clone();
    config.correction.enable_llm |= args.llm;

    let engine = match &args.corpus {
        Some(path) => {
            let engine: Arc<dyn SearchEngine> =
                Arc::new(MemorySearchEngine::with_tokenizer(
                    load_articles(path)?,
                    config.mining.tokenizer(),
                ));
            Some(engine)
        }
        None => None,
    };

    let pipeline = QueryPipeline::from_config(&config, engine).await?;
    let result = pipeline.corrector().correct(&args.query).await;

    output_result(
        "Correction result",
        &CorrectionReport {
            original: result.original_query,
            corrected: result.corrected_query,
            has_changes: result.has_changes,
            confidence: result.confidence,
            duration_ms: result.elapsed.as_millis() as u64,
            strategies: pipeline.corrector().strategy_names(),
            steps: result.steps,
        },
        cli_args,
    )
}

/// Correct, expand and run a query, then record the outcome.
async fn search(args: &SearchArgs, config: &GlossaConfig, cli_args: &GlossaArgs) -> Result<()> {
    let engine: Arc<dyn SearchEngine> = Arc::new(MemorySearchEngine::with_tokenizer(
        load_articles(&args.corpus)?,
        config.mining.tokenizer(),
    ));
    let pipeline = QueryPipeline::from_config(config, Some(engine.clone())).await?;

    let mut request = SearchRequest::new("").offset(args.offset).limit(args.limit);
    request.category = args.category.clone();
    request.author = args.author.clone();

    let (prepared, results) = pipeline
        .search(engine.as_ref(), &args.query, request)
        .await?;
    pipeline.save()?;

    output_result(
        "Search results",
        &SearchReport {
            original: prepared.original,
            corrected: prepared.corrected,
            expanded: prepared.expanded,
            total_count: results.total_count,
            hits: results.documents,
            highlights: results.highlights,
        },
        cli_args,
    )
}

/// Compare two words by the documents they appear in.
fn similarity(args: &SimilarityArgs, config: &GlossaConfig, cli_args: &GlossaArgs) -> Result<()> {
    let articles = load_articles(&args.corpus)?;
    let mut analyzer = CooccurrenceAnalyzer::new(config.mining.tokenizer());
    analyzer.build_index(&articles);

    let word1 = normalize(&args.word1);
    let word2 = normalize(&args.word2);

    output_result(
        "Co-occurrence similarity",
        &SimilarityReport {
            documents1: analyzer.document_frequency(&word1),
            documents2: analyzer.document_frequency(&word2),
            jaccard: analyzer.similarity(&word1, &word2),
            context_similarity: analyzer.context_similarity(&word1, &word2),
            word1,
            word2,
        },
        cli_args,
    )
}

/// Show synonym and analytics statistics.
fn show_stats(args: &StatsArgs, config: &GlossaConfig, cli_args: &GlossaArgs) -> Result<()> {
    let store = SynonymStore::load(&config.paths.synonyms);
    let analytics = AnalyticsStore::load(&config.paths.analytics, config.analytics.clone());
    let data = store.data();

    output_result(
        "Statistics",
        &StatsReport {
            synonyms_file: config.paths.synonyms.display().to_string(),
            last_updated: data.last_updated.map(|t| t.to_rfc3339()),
            statistics: data.statistics.clone(),
            analytics_file: config.paths.analytics.display().to_string(),
            tracked_queries: analytics.len(),
            top_queries: analytics.top_queries(args.top),
        },
        cli_args,
    )
}
