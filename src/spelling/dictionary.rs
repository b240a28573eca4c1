//! Common-word dictionary used to accept or reject candidate corrections.
//!
//! The keyboard-layout corrector only trusts a transliterated word when it is
//! a recognized word. Recognition comes from a small built-in core vocabulary
//! plus the corpus vocabulary gathered during mining, optionally extended with
//! a frequency file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use log::debug;

use crate::analysis::tokenizer::normalize;
use crate::corpus::CorpusStatistics;
use crate::error::Result;

/// Core Russian vocabulary that should always be recognized.
const BUILTIN_RUSSIAN_WORDS: &[&str] = &[
    "привет", "новости", "россия", "москва", "путин", "президент", "правительство", "выборы",
    "экономика", "рубль", "доллар", "нефть", "цена", "цены", "курс", "война", "мир", "спорт",
    "футбол", "хоккей", "погода", "политика", "закон", "суд", "полиция", "авария", "пожар",
    "машина", "автомобиль", "дорога", "город", "страна", "украина", "сша", "китай", "европа",
    "компания", "банк", "рынок", "акции", "бизнес", "работа", "зарплата", "пенсия", "налог",
    "школа", "университет", "врач", "больница", "здоровье", "вирус", "вакцина", "наука",
    "космос", "технологии", "интернет", "телефон", "культура", "кино", "музыка", "театр",
    "выступил", "заявил", "сегодня", "вчера", "завтра", "год", "день", "время", "человек",
    "люди", "дом", "вода", "газ", "армия", "министр", "депутат", "дума", "санкции", "кризис",
    "инфляция", "бюджет", "регион", "область", "край", "республика", "глава", "мэр",
];

/// Core English vocabulary that should always be recognized.
const BUILTIN_ENGLISH_WORDS: &[&str] = &[
    "news", "world", "business", "sport", "sports", "weather", "politics", "economy", "market",
    "price", "oil", "bank", "company", "president", "election", "government", "war", "peace",
    "city", "country", "today", "technology", "science", "health", "music", "movie", "game",
    "football", "hockey", "hello", "search", "apple", "google", "microsoft", "bitcoin",
];

/// Frequency assigned to built-in words.
const BUILTIN_FREQUENCY: u32 = 100;

/// A dictionary of known words and their frequencies.
#[derive(Debug, Clone, Default)]
pub struct CommonWords {
    words: AHashMap<String, u32>,
}

impl CommonWords {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dictionary holding the built-in Russian and English words.
    pub fn builtin() -> Self {
        let mut dictionary = CommonWords::new();
        for word in BUILTIN_RUSSIAN_WORDS.iter().chain(BUILTIN_ENGLISH_WORDS) {
            dictionary.add_word(word, BUILTIN_FREQUENCY);
        }
        dictionary
    }

    /// Add a word, keeping the higher frequency if it is already present.
    pub fn add_word(&mut self, word: &str, frequency: u32) {
        let word = normalize(word);
        if word.is_empty() {
            return;
        }
        let entry = self.words.entry(word).or_insert(0);
        *entry = (*entry).max(frequency);
    }

    /// Add every corpus word seen at least `min_frequency` times.
    pub fn extend_from_statistics(&mut self, statistics: &CorpusStatistics, min_frequency: usize) {
        let before = self.words.len();
        for (word, counts) in statistics.iter() {
            if counts.occurrences >= min_frequency {
                let frequency = u32::try_from(counts.occurrences).unwrap_or(u32::MAX);
                self.add_word(word, frequency);
            }
        }
        debug!(
            "Added {} corpus words to the common-word dictionary",
            self.words.len() - before
        );
    }

    /// Load words from a file with one `word` or `word frequency` per line.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut dictionary = CommonWords::new();
        dictionary.merge_file(path)?;
        Ok(dictionary)
    }

    /// Merge words from a `word [frequency]` file into this dictionary.
    pub fn merge_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);

        for line in reader.lines() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            if !word.chars().all(char::is_alphabetic) {
                continue;
            }
            let frequency = parts
                .next()
                .and_then(|f| f.parse::<u32>().ok())
                .unwrap_or(1);
            self.add_word(word, frequency);
        }

        Ok(())
    }

    /// Whether a word is known (case-insensitive).
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(&normalize(word))
    }

    /// Frequency of a word, zero if unknown.
    pub fn frequency(&self, word: &str) -> u32 {
        self.words.get(&normalize(word)).copied().unwrap_or(0)
    }

    /// Number of known words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
