//! Stopword and usual-word filtering
//!
//! Stopwords decide whether a token "has meaning" (n-gram boundaries, lemma
//! group validity). Usual words have meaning inside a phrase but are too
//! common to be a key-entity on their own.

use crate::types::{SemtagConfig, Token};
use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

/// Default usual words: common nouns that only make sense inside a phrase
pub const DEFAULT_USUAL_WORDS: &[&str] = &[
    "an", "année", "cas", "chose", "fait", "fois", "heure", "jour", "mois", "moment", "part",
    "semaine", "day", "month", "thing", "time", "way", "week", "year",
];

/// A case-insensitive word list
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    /// Set of words (lowercase)
    stopwords: FxHashSet<String>,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::new("fr")
    }
}

impl StopwordFilter {
    /// Create a filter loaded with the built-in list for the given language
    ///
    /// Unknown languages fall back to French.
    pub fn new(language: &str) -> Self {
        Self {
            stopwords: Self::load_stopwords(language),
        }
    }

    /// Create an empty filter (no filtering)
    pub fn empty() -> Self {
        Self {
            stopwords: FxHashSet::default(),
        }
    }

    /// Create a filter from a custom list
    pub fn from_list<S: AsRef<str>>(words: &[S]) -> Self {
        Self {
            stopwords: words.iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// Add additional words to the filter
    pub fn add_stopwords<S: AsRef<str>>(&mut self, words: &[S]) {
        for word in words {
            self.stopwords.insert(word.as_ref().to_lowercase());
        }
    }

    /// Check if a word is in the list; elided forms (`l'`, `qu'`) match
    /// with or without their apostrophe
    pub fn is_stopword(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        if self.stopwords.contains(&lower) {
            return true;
        }
        match lower.strip_suffix('\'') {
            Some(bare) if !bare.is_empty() => self.stopwords.contains(bare),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    fn load_stopwords(language: &str) -> FxHashSet<String> {
        let lang = match language.to_lowercase().as_str() {
            "en" | "english" => LANGUAGE::English,
            "de" | "german" => LANGUAGE::German,
            "es" | "spanish" => LANGUAGE::Spanish,
            "it" | "italian" => LANGUAGE::Italian,
            "pt" | "portuguese" => LANGUAGE::Portuguese,
            "nl" | "dutch" => LANGUAGE::Dutch,
            _ => LANGUAGE::French,
        };

        get(lang).iter().map(|s| s.to_string()).collect()
    }
}

/// Stopword and usual-word lists applied to tokens before tagging
#[derive(Debug, Clone)]
pub struct WordFilters {
    stopwords: StopwordFilter,
    usual_words: StopwordFilter,
}

impl Default for WordFilters {
    fn default() -> Self {
        Self::from_config(&SemtagConfig::default())
    }
}

impl WordFilters {
    pub fn new(stopwords: StopwordFilter, usual_words: StopwordFilter) -> Self {
        Self {
            stopwords,
            usual_words,
        }
    }

    /// Built-in stopwords for the configured language, extended with the
    /// configured extras, plus the configured usual words
    pub fn from_config(config: &SemtagConfig) -> Self {
        let mut stopwords = StopwordFilter::new(&config.language);
        stopwords.add_stopwords(&config.stopwords);
        Self {
            stopwords,
            usual_words: StopwordFilter::from_list(&config.usual_words),
        }
    }

    /// Set the stopword / usual flags of every token
    pub fn annotate(&self, tokens: &mut [Token]) {
        for token in tokens.iter_mut() {
            token.is_stopword = self.stopwords.is_stopword(&token.text);
            token.is_usual = self.usual_words.is_stopword(&token.text);
        }
    }

    pub fn stopwords(&self) -> &StopwordFilter {
        &self.stopwords
    }

    pub fn usual_words(&self) -> &StopwordFilter {
        &self.usual_words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_french_stopwords() {
        let filter = StopwordFilter::new("fr");

        assert!(filter.is_stopword("de"));
        assert!(filter.is_stopword("La")); // case insensitive
        assert!(filter.is_stopword("et"));
        assert!(!filter.is_stopword("ministère"));
        assert!(!filter.is_stopword("culture"));
    }

    #[test]
    fn test_english_stopwords() {
        let filter = StopwordFilter::new("en");

        assert!(filter.is_stopword("the"));
        assert!(filter.is_stopword("of"));
        assert!(!filter.is_stopword("ministry"));
    }

    #[test]
    fn test_custom_list() {
        let mut filter = StopwordFilter::from_list(&["custom", "Words"]);

        assert!(filter.is_stopword("custom"));
        assert!(filter.is_stopword("words"));
        assert!(!filter.is_stopword("de"));

        filter.add_stopwords(&["extra"]);
        assert!(filter.is_stopword("EXTRA"));
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_elided_forms() {
        let filter = StopwordFilter::from_list(&["l", "qu"]);
        assert!(filter.is_stopword("l'"));
        assert!(filter.is_stopword("Qu'"));
        assert!(!filter.is_stopword("'"));
    }

    #[test]
    fn test_empty_filter() {
        let filter = StopwordFilter::empty();
        assert!(!filter.is_stopword("de"));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_annotate_tokens() {
        let filters = WordFilters::new(
            StopwordFilter::from_list(&["de", "la"]),
            StopwordFilter::from_list(&["année"]),
        );
        let mut tokens = vec![
            Token::new("ministère", 0, 0, 0),
            Token::new("de", 0, 1, 1),
            Token::new("la", 0, 2, 2),
            Token::new("Culture", 0, 3, 3),
            Token::new("année", 0, 4, 4),
        ];

        filters.annotate(&mut tokens);

        assert!(!tokens[0].is_stopword);
        assert!(tokens[1].is_stopword);
        assert!(tokens[2].is_stopword);
        assert!(!tokens[3].is_stopword);
        assert!(tokens[4].is_usual);
        assert!(!tokens[0].is_usual);
    }

    #[test]
    fn test_from_config_extends_builtin_list() {
        let cfg = SemtagConfig::default().with_stopwords(&["projet"]);
        let filters = WordFilters::from_config(&cfg);

        assert!(filters.stopwords().is_stopword("projet"));
        assert!(filters.stopwords().is_stopword("de"));
        assert!(filters.usual_words().is_stopword("année"));
    }
}
