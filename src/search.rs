//! Search engine boundary.
//!
//! The full-text engine that executes queries lives outside this crate. The
//! correction chain only needs to ask it how many documents a query matches,
//! and the query pipeline hands it the expanded query. [`MemorySearchEngine`]
//! is a small term-matching engine over loaded articles used by the command
//! line tool and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::Tokenizer;
use crate::corpus::Article;
use crate::error::Result;

/// Default page size.
pub const DEFAULT_LIMIT: usize = 10;

/// A search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The query text, already corrected and expanded.
    pub query: String,
    /// Number of hits to skip.
    pub offset: usize,
    /// Maximum number of hits to return.
    pub limit: usize,
    /// Restrict hits to one category.
    pub category: Option<String>,
    /// Restrict hits to one author.
    pub author: Option<String>,
}

impl SearchRequest {
    /// Create a request for the first page of results.
    pub fn new<S: Into<String>>(query: S) -> Self {
        SearchRequest {
            query: query.into(),
            offset: 0,
            limit: DEFAULT_LIMIT,
            category: None,
            author: None,
        }
    }

    /// Set the number of hits to skip.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the maximum number of hits to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Filter by category.
    pub fn category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by author.
    pub fn author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// A single matching document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Engine-specific document id.
    pub id: String,
    /// Document title.
    pub title: String,
    /// Relevance score.
    pub score: f32,
}

/// Search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// The requested page of hits.
    pub documents: Vec<SearchHit>,
    /// Total number of matching documents.
    pub total_count: usize,
    /// Highlighted fragments keyed by document id.
    pub highlights: BTreeMap<String, Vec<String>>,
}

/// An external full-text search engine.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Execute a search request.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults>;

    /// Total number of indexed documents.
    async fn count_all_documents(&self) -> Result<usize>;

    /// Number of documents matching a query.
    async fn count(&self, query: &str) -> Result<usize> {
        let request = SearchRequest::new(query).limit(0);
        Ok(self.search(&request).await?.total_count)
    }
}

/// In-memory engine that scores articles by the number of query terms they
/// contain.
#[derive(Debug, Clone, Default)]
pub struct MemorySearchEngine {
    articles: Vec<Article>,
    terms: Vec<std::collections::BTreeSet<String>>,
    tokenizer: Tokenizer,
}

impl MemorySearchEngine {
    /// Index a batch of articles with the default tokenizer.
    pub fn new(articles: Vec<Article>) -> Self {
        Self::with_tokenizer(articles, Tokenizer::new())
    }

    /// Index a batch of articles with a custom tokenizer, also used for
    /// queries.
    pub fn with_tokenizer(articles: Vec<Article>, tokenizer: Tokenizer) -> Self {
        let terms = articles
            .iter()
            .map(|article| tokenizer.tokenize(&article.full_text()))
            .collect();
        MemorySearchEngine {
            articles,
            terms,
            tokenizer,
        }
    }

    fn matches_filters(article: &Article, request: &SearchRequest) -> bool {
        let category_ok = match &request.category {
            Some(category) => article.category.as_deref() == Some(category.as_str()),
            None => true,
        };
        let author_ok = match &request.author {
            Some(author) => article.author.as_deref() == Some(author.as_str()),
            None => true,
        };
        category_ok && author_ok
    }
}

#[async_trait]
impl SearchEngine for MemorySearchEngine {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let query_terms = self.tokenizer.tokenize(&request.query);
        if query_terms.is_empty() {
            return Ok(SearchResults::default());
        }

        let mut scored: Vec<(usize, usize)> = self
            .articles
            .iter()
            .zip(&self.terms)
            .enumerate()
            .filter(|(_, (article, _))| Self::matches_filters(article, request))
            .filter_map(|(id, (_, terms))| {
                let matched = query_terms.intersection(terms).count();
                (matched > 0).then_some((id, matched))
            })
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut highlights = BTreeMap::new();
        let documents = scored
            .iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|&(id, matched)| {
                let matching: Vec<String> = query_terms
                    .intersection(&self.terms[id])
                    .cloned()
                    .collect();
                highlights.insert(id.to_string(), matching);
                SearchHit {
                    id: id.to_string(),
                    title: self.articles[id].title.clone(),
                    score: matched as f32 / query_terms.len() as f32,
                }
            })
            .collect();

        Ok(SearchResults {
            documents,
            total_count: scored.len(),
            highlights,
        })
    }

    async fn count_all_documents(&self) -> Result<usize> {
        Ok(self.articles.len())
    }
}
