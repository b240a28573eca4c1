//! End-to-end mining scenarios: corpus file in, synonym file out, expansion
//! from the reloaded file.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use glossa::corpus::{Article, load_articles};
use glossa::error::Result;
use glossa::expansion::QueryExpander;
use glossa::synonym::miner::SynonymMiner;
use glossa::synonym::options::MiningOptions;
use glossa::synonym::store::SynonymStore;
use parking_lot::RwLock;
use tempfile::TempDir;

fn medical_corpus() -> Vec<Article> {
    let mut articles = vec![
        Article::new(
            "Медицина",
            "врач осмотрел пациента, потом доктор выписал лекарство"
        );
        4
    ];
    articles.extend(vec![
        Article::new("Погода", "завтра ожидается сильный дождь и ветер");
        3
    ]);
    articles
}

fn write_jsonl(dir: &TempDir, articles: &[Article]) -> std::path::PathBuf {
    let path = dir.path().join("corpus.jsonl");
    let mut file = fs::File::create(&path).unwrap();
    for article in articles {
        writeln!(file, "{}", serde_json::to_string(article).unwrap()).unwrap();
    }
    path
}

#[test]
fn mined_file_drives_expansion() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let corpus_path = write_jsonl(&dir, &medical_corpus());
    let synonyms_path = dir.path().join("data").join("synonyms.json");

    let articles = load_articles(&corpus_path)?;
    assert_eq!(articles.len(), 7);

    let data = SynonymMiner::new(MiningOptions::default())?.mine(&articles);
    assert!(data.statistics.pairs_accepted > 0);
    assert!(data.statistics.pairs_accepted <= data.statistics.total_pairs_considered);
    SynonymStore::from_data(data).save(&synonyms_path)?;

    let raw = fs::read_to_string(&synonyms_path)?;
    assert!(raw.contains("\"confidenceScores\""));
    assert!(raw.contains("\"lastUpdated\""));

    let store = SynonymStore::load(&synonyms_path);
    assert!(store.synonyms_of("врач").contains("доктор"));
    // capitalized in every title, treated as a proper noun
    assert!(!store.synonyms_of("врач").contains("медицина"));

    let expander = QueryExpander::new(Arc::new(RwLock::new(store)));
    let expanded = expander.expand_query("Доктор", Some(0.5));
    let terms: Vec<&str> = expanded.split(' ').collect();
    assert_eq!(terms[0], "доктор");
    assert!(terms.contains(&"врач"));

    Ok(())
}

#[test]
fn collocation_halves_are_not_synonyms() -> Result<()> {
    let articles =
        vec![Article::new("", "холодная война началась после долгого конфликта"); 4];

    let data = SynonymMiner::new(MiningOptions::default())?.mine(&articles);
    assert!(!data.synonyms.get("холодная").is_some_and(|g| g.contains("война")));
    assert!(!data.synonyms.get("война").is_some_and(|g| g.contains("холодная")));
    assert!(data.statistics.rejections.collocation > 0);

    let options = MiningOptions {
        exclude_compound_terms: false,
        ..Default::default()
    };
    let data = SynonymMiner::new(options)?.mine(&articles);
    assert!(data.synonyms["холодная"].contains("война"));

    Ok(())
}

#[test]
fn shared_neighbor_does_not_make_synonyms() -> Result<()> {
    let articles = vec![
        Article::new("", "автомобиль дорога"),
        Article::new("", "машина дорога"),
    ];
    let options = MiningOptions {
        min_similarity_threshold: 0.3,
        min_word_frequency: 1,
        ..Default::default()
    };

    let data = SynonymMiner::new(options)?.mine(&articles);
    assert!(data.synonyms["дорога"].contains("автомобиль"));
    assert!(data.synonyms["дорога"].contains("машина"));
    assert!(!data.synonyms["автомобиль"].contains("машина"));
    assert!(!data.synonyms["машина"].contains("автомобиль"));

    Ok(())
}

#[test]
fn tightening_similarity_never_accepts_more() -> Result<()> {
    let mut articles = medical_corpus();
    articles.push(Article::new("", "врач работает в больнице"));
    articles.push(Article::new("", "доктор приехал на вызов"));

    let mut previous = usize::MAX;
    for threshold in [0.1, 0.3, 0.5, 0.7, 0.9] {
        let options = MiningOptions {
            min_similarity_threshold: threshold,
            min_word_frequency: 1,
            ..Default::default()
        };
        let data = SynonymMiner::new(options)?.mine(&articles);
        assert!(data.statistics.pairs_accepted <= previous);
        previous = data.statistics.pairs_accepted;

        for (anchor, words) in &data.synonyms {
            assert!(!words.contains(anchor));
        }
    }

    Ok(())
}

#[test]
fn remining_replaces_previous_groups() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("synonyms.json");

    let first = SynonymMiner::new(MiningOptions::default())?.mine(&medical_corpus());
    SynonymStore::from_data(first).save(&path)?;

    let articles =
        vec![Article::new("", "снегопад парализовал движение, метель продолжается"); 3];
    let options = MiningOptions {
        exclude_compound_terms: false,
        ..Default::default()
    };
    let second = SynonymMiner::new(options)?.mine(&articles);
    SynonymStore::from_data(second).save(&path)?;

    let store = SynonymStore::load(&path);
    assert!(store.synonyms_of("врач").is_empty());
    assert!(store.synonyms_of("снегопад").contains("метель"));

    Ok(())
}

#[test]
fn corrupt_or_missing_synonym_file_means_no_synonyms() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("synonyms.json");
    assert!(SynonymStore::load(&path).is_empty());

    fs::write(&path, "{\"synonyms\": [1, 2").unwrap();
    let store = SynonymStore::load(&path);
    assert!(store.is_empty());

    let expander = QueryExpander::new(Arc::new(RwLock::new(store)));
    assert_eq!(expander.expand_query("врач", None), "врач");
}

#[test]
fn truncated_corpus_mines_zero_groups() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corpus.json");
    fs::write(&path, r#"[{"title": "a", "#).unwrap();

    let articles = load_articles(&path)?;
    assert!(articles.is_empty());

    let data = SynonymMiner::new(MiningOptions::default())?.mine(&articles);
    assert!(data.synonyms.is_empty());
    assert_eq!(data.statistics.pairs_accepted, 0);

    Ok(())
}
