//! Document co-occurrence analysis.
//!
//! Builds an inverted index (word → documents containing it) and scores every
//! pair of words that share at least one document with the Jaccard similarity
//! of their document sets. Only co-occurring pairs are ever visited: for each
//! word the analyzer walks its documents and counts the other words found
//! there, so the cost is bounded by the sum of squared document lengths rather
//! than the square of the vocabulary.
//!
//! # Examples
//!
//! ```
//! use glossa::analysis::tokenizer::Tokenizer;
//! use glossa::corpus::Article;
//! use glossa::synonym::cooccurrence::CooccurrenceAnalyzer;
//!
//! let articles = vec![
//!     Article::new("", "автомобиль дорога"),
//!     Article::new("", "машина дорога"),
//! ];
//! let mut analyzer = CooccurrenceAnalyzer::new(Tokenizer::new());
//! analyzer.build_index(&articles);
//!
//! assert_eq!(analyzer.similarity("автомобиль", "машина"), 0.0);
//! assert_eq!(analyzer.similarity("автомобиль", "дорога"), 0.5);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use ahash::AHashMap;
use log::debug;
use rayon::prelude::*;

use crate::analysis::tokenizer::Tokenizer;
use crate::corpus::Article;

/// Similarity between two words that share at least one document.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSimilarity {
    /// Lexicographically smaller word.
    pub word1: String,
    /// Lexicographically larger word.
    pub word2: String,
    /// Jaccard similarity of the two document sets.
    pub similarity: f64,
}

/// A candidate synonym of some anchor word.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// The neighboring word.
    pub word: String,
    /// Jaccard similarity to the anchor.
    pub similarity: f64,
}

/// Anchor word → direct neighbors, best similarity first.
pub type CandidateGroups = BTreeMap<String, Vec<Neighbor>>;

/// Corpus-wide co-occurrence analyzer.
#[derive(Debug, Clone)]
pub struct CooccurrenceAnalyzer {
    tokenizer: Tokenizer,
    vocabulary: Vec<String>,
    word_ids: AHashMap<String, u32>,
    /// Word id → sorted document indices.
    postings: Vec<Vec<u32>>,
    /// Document index → sorted word ids.
    documents: Vec<Vec<u32>>,
}

impl CooccurrenceAnalyzer {
    /// Create an analyzer that tokenizes documents with the given tokenizer.
    pub fn new(tokenizer: Tokenizer) -> Self {
        CooccurrenceAnalyzer {
            tokenizer,
            vocabulary: Vec::new(),
            word_ids: AHashMap::new(),
            postings: Vec::new(),
            documents: Vec::new(),
        }
    }

    /// Build the inverted index from scratch.
    ///
    /// Title and body are tokenized together; each word counts once per
    /// document. Any previously built index is discarded.
    pub fn build_index(&mut self, articles: &[Article]) {
        self.vocabulary.clear();
        self.word_ids.clear();
        self.postings.clear();
        self.documents.clear();

        for (doc_index, article) in articles.iter().enumerate() {
            let doc_index = doc_index as u32;
            let mut word_ids: Vec<u32> = self
                .tokenizer
                .tokenize(&article.full_text())
                .into_iter()
                .map(|word| self.intern(word))
                .collect();
            word_ids.sort_unstable();

            for &word_id in &word_ids {
                self.postings[word_id as usize].push(doc_index);
            }
            self.documents.push(word_ids);
        }

        debug!(
            "Built co-occurrence index: {} documents, {} words",
            self.documents.len(),
            self.vocabulary.len()
        );
    }

    fn intern(&mut self, word: String) -> u32 {
        if let Some(&id) = self.word_ids.get(&word) {
            return id;
        }
        let id = self.vocabulary.len() as u32;
        self.word_ids.insert(word.clone(), id);
        self.vocabulary.push(word);
        self.postings.push(Vec::new());
        id
    }

    /// Number of indexed documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of distinct indexed words.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents containing a word.
    pub fn document_frequency(&self, word: &str) -> usize {
        self.postings_of(word).map_or(0, <[u32]>::len)
    }

    fn postings_of(&self, word: &str) -> Option<&[u32]> {
        self.word_ids
            .get(word)
            .map(|&id| self.postings[id as usize].as_slice())
    }

    /// Jaccard similarity of the document sets of two words.
    ///
    /// Symmetric; 0.0 when either word is unknown or they never co-occur.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        match (self.postings_of(a), self.postings_of(b)) {
            (Some(pa), Some(pb)) => {
                let shared = intersection_size(pa, pb);
                jaccard(shared, pa.len(), pb.len())
            }
            _ => 0.0,
        }
    }

    /// Fraction of the rarer word's documents that also contain the other word.
    ///
    /// Diagnostic measure, independent of the main mining pass.
    pub fn context_similarity(&self, a: &str, b: &str) -> f64 {
        match (self.postings_of(a), self.postings_of(b)) {
            (Some(pa), Some(pb)) => {
                let smaller = pa.len().min(pb.len());
                if smaller == 0 {
                    0.0
                } else {
                    intersection_size(pa, pb) as f64 / smaller as f64
                }
            }
            _ => 0.0,
        }
    }

    /// Score every co-occurring pair and keep those at or above `min_similarity`.
    ///
    /// The result is sorted by descending similarity, then by words, so runs
    /// over the same corpus are reproducible.
    pub fn compute_similarities(&self, min_similarity: f64) -> Vec<WordSimilarity> {
        let mut similarities: Vec<WordSimilarity> = (0..self.vocabulary.len() as u32)
            .into_par_iter()
            .flat_map_iter(|word_id| self.similarities_for(word_id, min_similarity))
            .collect();

        similarities.sort_by(compare_similarities);

        debug!(
            "Computed {} word pairs with similarity >= {min_similarity}",
            similarities.len()
        );
        similarities
    }

    /// Pairs (word_id, other) with other > word_id, so each pair is visited once.
    fn similarities_for(&self, word_id: u32, min_similarity: f64) -> Vec<WordSimilarity> {
        let postings = &self.postings[word_id as usize];
        let mut shared: AHashMap<u32, usize> = AHashMap::new();

        for &doc in postings {
            for &other in &self.documents[doc as usize] {
                if other > word_id {
                    *shared.entry(other).or_insert(0) += 1;
                }
            }
        }

        let word = &self.vocabulary[word_id as usize];
        shared
            .into_iter()
            .filter_map(|(other, count)| {
                let similarity = jaccard(count, postings.len(), self.postings[other as usize].len());
                (similarity >= min_similarity).then(|| {
                    let other_word = &self.vocabulary[other as usize];
                    let (word1, word2) = if word <= other_word {
                        (word.clone(), other_word.clone())
                    } else {
                        (other_word.clone(), word.clone())
                    };
                    WordSimilarity {
                        word1,
                        word2,
                        similarity,
                    }
                })
            })
            .collect()
    }

    /// Expose pairs per anchor: each word maps to its direct neighbors.
    ///
    /// Both directions of every pair are emitted. The grouping is star-shaped
    /// and never transitively closed: A~B and B~C do not make A~C.
    pub fn candidate_groups(similarities: &[WordSimilarity]) -> CandidateGroups {
        let mut groups = CandidateGroups::new();

        for pair in similarities {
            if pair.word1 == pair.word2 {
                continue;
            }
            groups.entry(pair.word1.clone()).or_default().push(Neighbor {
                word: pair.word2.clone(),
                similarity: pair.similarity,
            });
            groups.entry(pair.word2.clone()).or_default().push(Neighbor {
                word: pair.word1.clone(),
                similarity: pair.similarity,
            });
        }

        for neighbors in groups.values_mut() {
            neighbors.sort_by(|a, b| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.word.cmp(&b.word))
            });
        }

        groups
    }
}

fn compare_similarities(a: &WordSimilarity, b: &WordSimilarity) -> Ordering {
    b.similarity
        .partial_cmp(&a.similarity)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.word1.cmp(&b.word1))
        .then_with(|| a.word2.cmp(&b.word2))
}

fn jaccard(shared: usize, len_a: usize, len_b: usize) -> f64 {
    let union = len_a + len_b - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

/// Size of the intersection of two sorted slices.
fn intersection_size(a: &[u32], b: &[u32]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer_for(texts: &[&str]) -> CooccurrenceAnalyzer {
        let articles: Vec<Article> = texts.iter().map(|t| Article::new("", *t)).collect();
        let mut analyzer = CooccurrenceAnalyzer::new(Tokenizer::new());
        analyzer.build_index(&articles);
        analyzer
    }

    #[test]
    fn test_no_transitive_inference() {
        let analyzer = analyzer_for(&["автомобиль дорога", "машина дорога"]);

        assert_eq!(analyzer.similarity("автомобиль", "машина"), 0.0);
        let similarities = analyzer.compute_similarities(0.3);
        assert!(
            !similarities
                .iter()
                .any(|p| p.word1 == "автомобиль" && p.word2 == "машина")
        );

        let groups = CooccurrenceAnalyzer::candidate_groups(&similarities);
        let car = groups.get("автомобиль").unwrap();
        assert_eq!(car.len(), 1);
        assert_eq!(car[0].word, "дорога");
        assert!(!groups["машина"].iter().any(|n| n.word == "автомобиль"));
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let analyzer = analyzer_for(&[
            "рынок нефть цена",
            "нефть цена баррель",
            "рынок акции цена",
            "баррель нефть",
        ]);

        let words = ["рынок", "нефть", "цена", "баррель", "акции", "неизвестно"];
        for a in words {
            for b in words {
                assert_eq!(analyzer.similarity(a, b), analyzer.similarity(b, a));
            }
        }

        // нефть: {0,1,3}, цена: {0,1,2} → 2 / 4
        assert!((analyzer.similarity("нефть", "цена") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_compute_similarities_threshold_and_order() {
        let analyzer = analyzer_for(&["рынок нефть цена", "нефть цена баррель", "рынок акции"]);

        let all = analyzer.compute_similarities(0.0);
        let strict = analyzer.compute_similarities(0.6);
        assert!(strict.len() < all.len());
        assert!(strict.iter().all(|p| p.similarity >= 0.6));
        assert!(all.windows(2).all(|w| w[0].similarity >= w[1].similarity));
        assert!(all.iter().all(|p| p.word1 < p.word2));

        // нефть and цена share both their documents
        assert_eq!(strict[0].word1, "нефть");
        assert_eq!(strict[0].word2, "цена");
        assert!((strict[0].similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_each_word_counted_once_per_document() {
        let analyzer = analyzer_for(&["цена цена цена нефть", "нефть"]);
        assert_eq!(analyzer.document_frequency("цена"), 1);
        assert_eq!(analyzer.document_frequency("нефть"), 2);
        assert!((analyzer.similarity("цена", "нефть") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_context_similarity() {
        let analyzer = analyzer_for(&["нефть цена", "нефть рынок", "нефть акции"]);
        assert!((analyzer.context_similarity("цена", "нефть") - 1.0).abs() < 1e-9);
        assert!((analyzer.similarity("цена", "нефть") - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(analyzer.context_similarity("цена", "неизвестно"), 0.0);
    }

    #[test]
    fn test_empty_corpus() {
        let analyzer = analyzer_for(&[]);
        assert_eq!(analyzer.document_count(), 0);
        assert!(analyzer.compute_similarities(0.0).is_empty());
    }

    #[test]
    fn test_rebuild_discards_previous_index() {
        let mut analyzer = analyzer_for(&["нефть цена"]);
        analyzer.build_index(&[Article::new("", "рынок акции")]);
        assert_eq!(analyzer.document_frequency("нефть"), 0);
        assert_eq!(analyzer.vocabulary_size(), 2);
    }
}
