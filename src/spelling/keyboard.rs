//! Keyboard-layout mistake correction.
//!
//! Users regularly type a Russian query with the English layout active (or
//! vice versa), producing strings like "ghbdtn" for "привет". Each word is
//! mapped through the physical key positions of the QWERTY and ЙЦУКЕН layouts
//! and the conversion is kept only if it lands on a recognized word, so
//! legitimate words in either alphabet pass through untouched.

use std::sync::{Arc, LazyLock};

use ahash::AHashMap;
use async_trait::async_trait;
use log::debug;

use crate::error::Result;
use crate::spelling::dictionary::CommonWords;
use crate::spelling::strategy::{SpellCheckResult, SpellCheckStrategy};

/// Confidence of a layout conversion that produced a known word.
pub const KEYBOARD_CONFIDENCE: f64 = 0.9;

/// Physical key pairs: (QWERTY, ЙЦУКЕН), lowercase.
const KEY_PAIRS: &[(char, char)] = &[
    ('`', 'ё'),
    ('q', 'й'),
    ('w', 'ц'),
    ('e', 'у'),
    ('r', 'к'),
    ('t', 'е'),
    ('y', 'н'),
    ('u', 'г'),
    ('i', 'ш'),
    ('o', 'щ'),
    ('p', 'з'),
    ('[', 'х'),
    (']', 'ъ'),
    ('a', 'ф'),
    ('s', 'ы'),
    ('d', 'в'),
    ('f', 'а'),
    ('g', 'п'),
    ('h', 'р'),
    ('j', 'о'),
    ('k', 'л'),
    ('l', 'д'),
    (';', 'ж'),
    ('\'', 'э'),
    ('z', 'я'),
    ('x', 'ч'),
    ('c', 'с'),
    ('v', 'м'),
    ('b', 'и'),
    ('n', 'т'),
    ('m', 'ь'),
    (',', 'б'),
    ('.', 'ю'),
];

static LATIN_TO_CYRILLIC: LazyLock<AHashMap<char, char>> =
    LazyLock::new(|| KEY_PAIRS.iter().copied().collect());

static CYRILLIC_TO_LATIN: LazyLock<AHashMap<char, char>> =
    LazyLock::new(|| KEY_PAIRS.iter().map(|&(l, c)| (c, l)).collect());

/// Direction of a layout conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutDirection {
    /// Typed on QWERTY, meant ЙЦУКЕН.
    LatinToCyrillic,
    /// Typed on ЙЦУКЕН, meant QWERTY.
    CyrillicToLatin,
}

impl LayoutDirection {
    /// Guess the direction from the dominant alphabet of a word.
    pub fn detect(word: &str) -> Option<Self> {
        let latin = word.chars().filter(char::is_ascii_alphabetic).count();
        let cyrillic = word.chars().filter(|c| is_cyrillic(*c)).count();

        match latin.cmp(&cyrillic) {
            std::cmp::Ordering::Greater => Some(LayoutDirection::LatinToCyrillic),
            std::cmp::Ordering::Less => Some(LayoutDirection::CyrillicToLatin),
            std::cmp::Ordering::Equal => None,
        }
    }
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// Re-type a word on the other layout, preserving letter case.
///
/// Characters without a counterpart key are kept as is.
pub fn convert_layout(word: &str, direction: LayoutDirection) -> String {
    let table = match direction {
        LayoutDirection::LatinToCyrillic => &*LATIN_TO_CYRILLIC,
        LayoutDirection::CyrillicToLatin => &*CYRILLIC_TO_LATIN,
    };

    word.chars()
        .map(|c| {
            let lower = c.to_lowercase().next().unwrap_or(c);
            match table.get(&lower) {
                Some(&mapped) if c.is_uppercase() => mapped.to_uppercase().next().unwrap_or(mapped),
                Some(&mapped) => mapped,
                None => c,
            }
        })
        .collect()
}

/// Word-by-word keyboard layout corrector.
pub struct KeyboardLayoutCorrector {
    dictionary: Arc<CommonWords>,
}

impl KeyboardLayoutCorrector {
    /// Create a corrector that accepts conversions found in `dictionary`.
    pub fn new(dictionary: Arc<CommonWords>) -> Self {
        KeyboardLayoutCorrector { dictionary }
    }

    /// Correct a single word, or return `None` to keep it.
    pub fn correct_word(&self, word: &str) -> Option<String> {
        if self.dictionary.contains(word) {
            return None;
        }

        let direction = LayoutDirection::detect(word)?;
        let converted = convert_layout(word, direction);
        if converted != word && self.dictionary.contains(&converted) {
            Some(converted)
        } else {
            None
        }
    }

    /// Correct a whitespace-separated token. Punctuation keys also type
    /// Cyrillic letters, so the whole token is tried first and only then the
    /// token without its surrounding punctuation.
    fn correct_token(&self, token: &str) -> Option<String> {
        if let Some(corrected) = self.correct_word(token) {
            return Some(corrected);
        }

        let is_edge = |c: char| !c.is_alphanumeric();
        let start = token.len() - token.trim_start_matches(is_edge).len();
        let core = token.trim_matches(is_edge);
        if core.is_empty() || core.len() == token.len() {
            return None;
        }
        let end = start + core.len();
        let corrected = self.correct_word(core)?;
        Some(format!("{}{corrected}{}", &token[..start], &token[end..]))
    }

    /// Correct every word of a query independently.
    pub fn correct_text(&self, query: &str) -> Option<String> {
        let mut changed = false;
        let words: Vec<String> = query
            .split_whitespace()
            .map(|word| match self.correct_token(word) {
                Some(corrected) => {
                    changed = true;
                    corrected
                }
                None => word.to_string(),
            })
            .collect();

        changed.then(|| words.join(" "))
    }
}

#[async_trait]
impl SpellCheckStrategy for KeyboardLayoutCorrector {
    fn name(&self) -> &str {
        "keyboard_layout"
    }

    fn priority(&self) -> u32 {
        10
    }

    async fn check(&self, query: &str) -> Result<SpellCheckResult> {
        match self.correct_text(query) {
            Some(corrected) => {
                debug!("Keyboard layout correction: '{query}' -> '{corrected}'");
                Ok(SpellCheckResult::changed(
                    query,
                    corrected,
                    self.name(),
                    KEYBOARD_CONFIDENCE,
                ))
            }
            None => Ok(SpellCheckResult::unchanged(query)),
        }
    }
}
