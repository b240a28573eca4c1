//! Stop word lists.
//!
//! The corpus is Russian-language news with occasional English fragments, so
//! the default list merges the most frequent Russian function words with the
//! classic English list. Words shorter than the minimum token length never
//! reach the stop filter, but they are listed anyway so that the set stays
//! usable with a relaxed tokenizer.
//!
//! # Examples
//!
//! ```
//! use glossa::analysis::stop_words::StopWords;
//!
//! let stop_words = StopWords::new();
//! assert!(stop_words.contains("которые"));
//! assert!(stop_words.contains("the"));
//! assert!(!stop_words.contains("машина"));
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

/// Default Russian stop words.
const DEFAULT_RUSSIAN_STOP_WORDS: &[&str] = &[
    "и", "в", "во", "не", "что", "он", "на", "я", "с", "со", "как", "а", "то", "все", "она",
    "так", "его", "но", "да", "ты", "к", "у", "же", "вы", "за", "бы", "по", "только", "ее",
    "её", "мне", "было", "вот", "от", "меня", "еще", "ещё", "нет", "о", "из", "ему", "теперь",
    "когда", "даже", "ну", "вдруг", "ли", "если", "уже", "или", "ни", "быть", "был", "него",
    "до", "вас", "нибудь", "опять", "уж", "вам", "ведь", "там", "потом", "себя", "ничего",
    "ей", "может", "они", "тут", "где", "есть", "надо", "ней", "для", "мы", "тебя", "их",
    "чем", "была", "сам", "чтоб", "без", "будто", "чего", "раз", "тоже", "себе", "под",
    "будет", "ж", "тогда", "кто", "этот", "того", "потому", "этого", "какой", "совсем",
    "ним", "здесь", "этом", "один", "почти", "мой", "тем", "чтобы", "нее", "сейчас", "были",
    "куда", "зачем", "всех", "никогда", "можно", "при", "наконец", "два", "об", "другой",
    "хоть", "после", "над", "больше", "тот", "через", "эти", "нас", "про", "всего", "них",
    "какая", "много", "разве", "три", "эту", "моя", "впрочем", "хорошо", "свою", "этой",
    "перед", "иногда", "лучше", "чуть", "том", "нельзя", "такой", "им", "более", "всегда",
    "конечно", "всю", "между", "это", "также", "которые", "который", "которая", "которого",
    "которой", "которых", "этих", "этим", "году", "года", "время", "свои", "своих",
    "своей", "своего", "заявил", "сообщает", "сообщил", "отметил",
];

/// Default English stop words.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with", "from", "have", "has", "had", "were", "been",
    "which", "would", "about",
];

/// Default stop words (Russian and English) as a HashSet.
pub static DEFAULT_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_RUSSIAN_STOP_WORDS
        .iter()
        .chain(DEFAULT_ENGLISH_STOP_WORDS.iter())
        .map(|&s| s.to_string())
        .collect()
});

/// An immutable, cheaply clonable set of stop words.
#[derive(Clone, Debug)]
pub struct StopWords {
    words: Arc<HashSet<String>>,
}

impl StopWords {
    /// Create a stop word set with the default Russian and English lists.
    pub fn new() -> Self {
        Self::with_words(DEFAULT_STOP_WORDS_SET.clone())
    }

    /// Create an empty stop word set.
    pub fn empty() -> Self {
        Self::with_words(HashSet::new())
    }

    /// Create a stop word set from the given words (lowercased).
    pub fn with_words(words: HashSet<String>) -> Self {
        StopWords {
            words: Arc::new(words.into_iter().map(|w| w.to_lowercase()).collect()),
        }
    }

    /// Return a copy of this set extended with additional words.
    pub fn extended<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = (*self.words).clone();
        words.extend(extra.into_iter().map(|w| w.as_ref().to_lowercase()));
        StopWords {
            words: Arc::new(words),
        }
    }

    /// Check whether a (lowercase) word is a stop word.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of stop words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new()
    }
}
