//! Lexicon-backed tagger and lemmatizer
//!
//! Lightweight default collaborators: a word → tag table with orthographic
//! fallbacks, and a word → lemma table with a lowercase fallback. Fitted
//! statistical taggers plug in through the same traits.

use crate::pipeline::traits::{Lemmatizer, PosTagger};
use crate::types::{Category, Token};
use rustc_hash::FxHashMap;

/// Tag given to unknown title-case words that do not start a sentence
pub const PROPER_NOUN_TAG: &str = "SBP";
/// Tag given to unknown words
pub const COMMON_NOUN_TAG: &str = "SBC";
/// Tag given to numbers
pub const NUMBER_TAG: &str = "NUM";
/// Tag given to unknown stopwords
pub const FUNCTION_WORD_TAG: &str = "MOT";

/// Tagger backed by a word → tag lexicon
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger {
    /// Exact surface form → tag
    entries: FxHashMap<String, String>,
}

impl LexiconTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tagger from `(word, tag)` pairs
    pub fn from_entries<I, W, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<String>,
        T: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(w, t)| (w.into(), t.into()))
                .collect(),
        }
    }

    /// Add or replace a lexicon entry
    pub fn insert(&mut self, word: impl Into<String>, tag: impl Into<String>) {
        self.entries.insert(word.into(), tag.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tag for one token: exact entry, then lowercase entry, then fallbacks
    fn tag_for(&self, token: &Token) -> String {
        if let Some(tag) = self.entries.get(&token.text) {
            return tag.clone();
        }
        if let Some(tag) = self.entries.get(&token.text.to_lowercase()) {
            return tag.clone();
        }

        if token.text.chars().all(|c| c.is_numeric()) {
            NUMBER_TAG.to_string()
        } else if token.is_stopword {
            FUNCTION_WORD_TAG.to_string()
        } else if token.is_title() && token.position > 0 {
            PROPER_NOUN_TAG.to_string()
        } else {
            COMMON_NOUN_TAG.to_string()
        }
    }
}

impl PosTagger for LexiconTagger {
    fn tag_all(&self, tokens: &mut [Token]) {
        for token in tokens.iter_mut() {
            token.tag = self.tag_for(token);
        }
    }
}

/// Lemmatizer backed by a word → lemma lexicon
#[derive(Debug, Clone, Default)]
pub struct LexiconLemmatizer {
    /// Lowercase surface form → lemma
    entries: FxHashMap<String, String>,
}

impl LexiconLemmatizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lemmatizer from `(word, lemma)` pairs
    pub fn from_entries<I, W, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (W, L)>,
        W: Into<String>,
        L: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(w, l)| (w.into().to_lowercase(), l.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, word: impl Into<String>, lemma: impl Into<String>) {
        self.entries.insert(word.into().to_lowercase(), lemma.into());
    }
}

impl Lemmatizer for LexiconLemmatizer {
    /// Known words take their lexicon lemma; proper nouns keep their surface
    /// form; everything else is lowercased.
    fn lemmatize(&self, token: &mut Token) {
        let lower = token.text.to_lowercase();
        token.lemma = match self.entries.get(&lower) {
            Some(lemma) => lemma.clone(),
            None if token.category() == Category::ProperNoun => token.text.clone(),
            None => lower,
        };
    }
}
