//! Article corpus records and corpus-wide word statistics.
//!
//! Articles come from the crawler as JSON records. Mining consumes them in a
//! single batch: [`CorpusStatistics`] gathers the surface-level facts the
//! validator needs (word frequency, capitalization, adjacent bigrams), while
//! the co-occurrence analyzer builds its own inverted index.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{Tokenizer, Word};
use crate::error::Result;

/// A news article as delivered by the crawler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Optional category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional author name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Article {
    /// Create an article with a title and body.
    pub fn new<T: Into<String>, C: Into<String>>(title: T, content: C) -> Self {
        Article {
            title: title.into(),
            content: content.into(),
            category: None,
            author: None,
        }
    }

    /// Set the category.
    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the author.
    pub fn with_author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Title and body joined for whole-document tokenization.
    pub fn full_text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }
}

/// Load articles from a JSON array file or a JSON-lines file.
///
/// Malformed records are skipped with a warning and an array that cannot be
/// parsed at all yields no articles. Only a missing or unreadable file is an
/// error.
pub fn load_articles<P: AsRef<Path>>(path: P) -> Result<Vec<Article>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let trimmed = content.trim_start();

    let articles = if trimmed.starts_with('[') {
        parse_array(path, trimmed)
    } else {
        parse_lines(path, &content)
    };

    debug!("Loaded {} articles from {}", articles.len(), path.display());
    Ok(articles)
}

fn parse_array(path: &Path, content: &str) -> Vec<Article> {
    let records: Vec<serde_json::Value> = match serde_json::from_str(content) {
        Ok(records) => records,
        Err(e) => {
            warn!("Ignoring unparsable corpus {}: {e}", path.display());
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(article) => Some(article),
            Err(e) => {
                warn!(
                    "Skipping malformed article #{} in {}: {e}",
                    index + 1,
                    path.display()
                );
                None
            }
        })
        .collect()
}

fn parse_lines(path: &Path, content: &str) -> Vec<Article> {
    let mut articles = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Article>(line) {
            Ok(article) => articles.push(article),
            Err(e) => warn!(
                "Skipping malformed article at {}:{}: {e}",
                path.display(),
                line_no + 1
            ),
        }
    }
    articles
}

/// Occurrence counters for a single word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordCounts {
    /// Total occurrences across the corpus.
    pub occurrences: usize,
    /// Occurrences starting with an uppercase letter.
    pub capitalized: usize,
    /// Number of documents containing the word.
    pub documents: usize,
}

impl WordCounts {
    /// Fraction of occurrences that are capitalized.
    pub fn capitalization_ratio(&self) -> f64 {
        if self.occurrences == 0 {
            0.0
        } else {
            self.capitalized as f64 / self.occurrences as f64
        }
    }
}

/// Corpus-wide surface statistics used by the synonym validator.
#[derive(Debug, Clone, Default)]
pub struct CorpusStatistics {
    words: AHashMap<String, WordCounts>,
    /// Adjacent pairs keyed in lexical order, both orders merged.
    bigrams: AHashMap<(String, String), usize>,
    documents: usize,
}

impl CorpusStatistics {
    /// Gather statistics from a batch of articles.
    ///
    /// Title and body are scanned separately so that the last title word and
    /// the first body word never count as adjacent.
    pub fn from_articles(articles: &[Article], tokenizer: &Tokenizer) -> Self {
        let mut stats = CorpusStatistics::default();

        for article in articles {
            let mut seen_in_doc = ahash::AHashSet::new();
            for text in [&article.title, &article.content] {
                let words = tokenizer.words(text);
                stats.observe_words(&words, &mut seen_in_doc);
            }
            if !seen_in_doc.is_empty() {
                stats.documents += 1;
            }
        }

        debug!(
            "Corpus statistics: {} documents, {} distinct words, {} distinct bigrams",
            stats.documents,
            stats.words.len(),
            stats.bigrams.len()
        );
        stats
    }

    fn observe_words(&mut self, words: &[Word], seen_in_doc: &mut ahash::AHashSet<String>) {
        for word in words {
            let counts = self.words.entry(word.normalized.clone()).or_default();
            counts.occurrences += 1;
            if word.is_capitalized() {
                counts.capitalized += 1;
            }
            if seen_in_doc.insert(word.normalized.clone()) {
                counts.documents += 1;
            }
        }

        for pair in words.windows(2) {
            let (a, b) = (&pair[0].normalized, &pair[1].normalized);
            if a != b {
                *self.bigrams.entry(bigram_key(a, b)).or_insert(0) += 1;
            }
        }
    }

    /// Counters for a word (zero if unseen).
    pub fn counts(&self, word: &str) -> WordCounts {
        self.words.get(word).copied().unwrap_or_default()
    }

    /// Total occurrences of a word.
    pub fn frequency(&self, word: &str) -> usize {
        self.counts(word).occurrences
    }

    /// How often two words appear adjacent, in either order.
    pub fn bigram_count(&self, a: &str, b: &str) -> usize {
        self.bigrams.get(&bigram_key(a, b)).copied().unwrap_or(0)
    }

    /// Number of non-empty documents seen.
    pub fn document_count(&self) -> usize {
        self.documents
    }

    /// Number of distinct words seen.
    pub fn vocabulary_size(&self) -> usize {
        self.words.len()
    }

    /// Iterate over all words and their counters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WordCounts)> {
        self.words.iter().map(|(w, c)| (w.as_str(), c))
    }
}

fn bigram_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_word_counts_and_capitalization() {
        let articles = vec![
            Article::new("Путин выступил", "Путин заявил о росте экономики."),
            Article::new("Экономика", "Рост экономики замедлился, сообщил Путин."),
        ];
        let stats = CorpusStatistics::from_articles(&articles, &Tokenizer::new());

        let putin = stats.counts("путин");
        assert_eq!(putin.occurrences, 3);
        assert_eq!(putin.capitalized, 3);
        assert_eq!(putin.documents, 2);
        assert!((putin.capitalization_ratio() - 1.0).abs() < f64::EPSILON);

        let economy = stats.counts("экономики");
        assert_eq!(economy.occurrences, 2);
        assert_eq!(economy.capitalized, 0);
        assert_eq!(stats.document_count(), 2);
    }

    #[test]
    fn test_bigrams_merge_both_orders() {
        let articles = vec![
            Article::new("", "холодная война началась"),
            Article::new("", "война холодная и долгая"),
        ];
        let stats = CorpusStatistics::from_articles(&articles, &Tokenizer::new());

        assert_eq!(stats.bigram_count("холодная", "война"), 2);
        assert_eq!(stats.bigram_count("война", "холодная"), 2);
        assert_eq!(stats.bigram_count("холодная", "началась"), 0);
    }

    #[test]
    fn test_title_and_body_not_adjacent() {
        let articles = vec![Article::new("Новая машина", "Машина поехала")];
        let stats = CorpusStatistics::from_articles(&articles, &Tokenizer::new());
        assert_eq!(stats.bigram_count("машина", "машина"), 0);
        assert_eq!(stats.bigram_count("новая", "машина"), 1);
        assert_eq!(stats.counts("машина").documents, 1);
    }

    #[test]
    fn test_load_articles_json_lines_skips_bad_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"title": "Первая", "content": "текст"}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"title": "Вторая", "content": "текст", "category": "политика"}}"#
        )
        .unwrap();

        let articles = load_articles(file.path()).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].category.as_deref(), Some("политика"));
    }

    #[test]
    fn test_load_articles_json_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "A", "content": "b", "author": "Иванов"}}, {{"title": "C"}}]"#
        )
        .unwrap();

        let articles = load_articles(file.path()).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].author.as_deref(), Some("Иванов"));
        assert_eq!(articles[1].content, "");
    }

    #[test]
    fn test_load_articles_json_array_tolerates_bad_input() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"title": 5}}, {{"title": "Выборы", "content": "итоги"}}]"#).unwrap();
        let articles = load_articles(file.path()).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Выборы");

        let mut truncated = NamedTempFile::new().unwrap();
        write!(truncated, r#"[{{"title": "a", "#).unwrap();
        assert!(load_articles(truncated.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_articles_missing_file() {
        assert!(load_articles("/nonexistent/articles.json").is_err());
    }
}
