//! Core types for rapid_keyentities
//!
//! This module defines the token model consumed by every stage, the coarse
//! grammatical category used by the POS confidence, and the extraction /
//! training configuration.

use crate::errors::{Result, SemtagError};
use crate::nlp::stopwords::DEFAULT_USUAL_WORDS;
use crate::nlp::tokenizer::is_title_case;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Category
// ============================================================================

/// Lemmas that turn a verb into an auxiliary
const AUXILIARY_LEMMAS: &[&str] = &["avoir", "être", "have", "be"];

/// Tag prefixes of the editorial tagset reserved for conjugated, participle
/// and infinitive forms of "avoir" (A…) and "être" (E…).
const AUXILIARY_TAG_PREFIXES: &[&str] = &["ACJ", "APAR", "AINF", "ECJ", "EPAR", "EINF"];

/// Coarse grammatical category of a lemma group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ProperNoun,
    Adjective,
    CommonNoun,
    Verb,
    Adverb,
    Auxiliary,
    Other,
}

impl Category {
    /// Resolve the category of a tagged word.
    ///
    /// Accepts the editorial tagset (`SBP`, `SBC`, `ADJ`, `ADV`, `VCJ`,
    /// `VPAR`, `ECJ`, ...) as well as universal tags (`PROPN`, `NOUN`,
    /// `VERB`, `AUX`, ...). Any `:subtag` qualifier is ignored.
    pub fn from_tag(tag: &str, lemma: &str) -> Self {
        let coarse = coarse_tag(tag).to_uppercase();
        let category = match coarse.as_str() {
            "SBP" | "PROPN" => Category::ProperNoun,
            "SBC" | "NOUN" => Category::CommonNoun,
            "ADJ" => Category::Adjective,
            "ADV" => Category::Adverb,
            "AUX" => Category::Auxiliary,
            t if AUXILIARY_TAG_PREFIXES.iter().any(|p| t.starts_with(p)) => Category::Auxiliary,
            t if t.starts_with('V') => Category::Verb,
            _ => Category::Other,
        };

        if category == Category::Verb && AUXILIARY_LEMMAS.contains(&lemma.to_lowercase().as_str())
        {
            Category::Auxiliary
        } else {
            category
        }
    }

    /// Weight used by the POS confidence
    pub fn pos_weight(&self) -> f64 {
        match self {
            Category::ProperNoun => 2.5,
            Category::Adjective => 1.7,
            Category::CommonNoun => 1.5,
            Category::Verb => 1.2,
            Category::Adverb => 1.0,
            Category::Auxiliary => 0.3,
            Category::Other => 0.1,
        }
    }
}

/// Strip the sub-qualifier (anything after `:`) from a tag
pub fn coarse_tag(tag: &str) -> &str {
    tag.split(':').next().unwrap_or(tag)
}

// ============================================================================
// Token
// ============================================================================

/// A word occurrence in the input text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The surface form (original text)
    pub text: String,
    /// Lemma assigned by the lemmatizer (defaults to the surface form)
    pub lemma: String,
    /// Tag assigned by the tagger, `CATEGORY[:subtag]`
    pub tag: String,
    /// Sentence index this token belongs to
    pub sentence_idx: usize,
    /// Position of the token inside its sentence
    pub position: usize,
    /// Token index within the document
    pub token_idx: usize,
    /// Whether this token is a stopword
    pub is_stopword: bool,
    /// Whether this token is too common to stand alone as a key-entity
    pub is_usual: bool,
}

impl Token {
    /// Create an untagged token; lemma defaults to the surface form
    pub fn new(
        text: impl Into<String>,
        sentence_idx: usize,
        position: usize,
        token_idx: usize,
    ) -> Self {
        let text = text.into();
        Self {
            lemma: text.clone(),
            text,
            tag: String::new(),
            sentence_idx,
            position,
            token_idx,
            is_stopword: false,
            is_usual: false,
        }
    }

    /// Create an already tagged and lemmatized token
    pub fn tagged(
        text: impl Into<String>,
        lemma: impl Into<String>,
        tag: impl Into<String>,
        sentence_idx: usize,
        position: usize,
        token_idx: usize,
    ) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            tag: tag.into(),
            sentence_idx,
            position,
            token_idx,
            is_stopword: false,
            is_usual: false,
        }
    }

    /// Builder method: mark as stopword
    pub fn with_stopword(mut self, is_stopword: bool) -> Self {
        self.is_stopword = is_stopword;
        self
    }

    /// Builder method: mark as usual word
    pub fn with_usual(mut self, is_usual: bool) -> Self {
        self.is_usual = is_usual;
        self
    }

    /// Tag without its sub-qualifier
    pub fn coarse_tag(&self) -> &str {
        coarse_tag(&self.tag)
    }

    /// Coarse grammatical category
    pub fn category(&self) -> Category {
        Category::from_tag(&self.tag, &self.lemma)
    }

    /// Whether the word carries meaning (not a stopword, not punctuation)
    pub fn has_meaning(&self) -> bool {
        !self.is_stopword && self.text.chars().any(char::is_alphanumeric)
    }

    /// Whether the word carries enough meaning to be a key-entity on its own
    pub fn has_meaning_alone(&self) -> bool {
        self.has_meaning() && !self.is_usual
    }

    pub fn is_title(&self) -> bool {
        is_title_case(&self.text)
    }

    pub fn is_verb(&self) -> bool {
        self.category() == Category::Verb
    }

    pub fn is_auxiliary(&self) -> bool {
        self.category() == Category::Auxiliary
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for extraction and training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemtagConfig {
    /// Language code for stopwords (e.g., "fr", "en")
    pub language: String,
    /// Additional stopwords (extends the built-in list)
    pub stopwords: Vec<String>,
    /// Words with meaning inside a phrase but not on their own
    pub usual_words: Vec<String>,
    /// Shortest n-gram candidate, in tokens
    pub min_ngram_length: usize,
    /// Longest n-gram candidate, in tokens
    pub max_ngram_length: usize,
    /// Minimum occurrences of a non-title n-gram
    pub min_ngram_count: usize,
    /// Normalized score a descriptor must exceed to be returned
    pub min_descriptor_score: f64,
    /// Number of key-entities offered to a trainer for review
    pub trainer_top_n: usize,
    /// Directory receiving exported triggers
    pub export_dir: PathBuf,
    /// File name (without extension) of exported triggers
    pub trigger_file_stem: String,
}

impl Default for SemtagConfig {
    fn default() -> Self {
        Self {
            language: "fr".to_string(),
            stopwords: Vec::new(),
            usual_words: DEFAULT_USUAL_WORDS.iter().map(|w| w.to_string()).collect(),
            min_ngram_length: 2,
            max_ngram_length: 15,
            min_ngram_count: 2,
            min_descriptor_score: 1.0,
            trainer_top_n: 20,
            export_dir: PathBuf::from("corpus"),
            trigger_file_stem: "triggers".to_string(),
        }
    }
}

impl SemtagConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON config; missing fields take their default value
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SemtagConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SemtagError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_ngram_length < 2 {
            return Err(SemtagError::invalid_config("min_ngram_length must be >= 2"));
        }

        if self.max_ngram_length < self.min_ngram_length {
            return Err(SemtagError::invalid_config(
                "max_ngram_length must be >= min_ngram_length",
            ));
        }

        if self.min_ngram_count == 0 {
            return Err(SemtagError::invalid_config("min_ngram_count must be > 0"));
        }

        if !self.min_descriptor_score.is_finite() {
            return Err(SemtagError::invalid_config(format!(
                "min_descriptor_score must be finite, got {}",
                self.min_descriptor_score
            )));
        }

        if self.trigger_file_stem.trim().is_empty() {
            return Err(SemtagError::invalid_config(
                "trigger_file_stem must not be empty",
            ));
        }

        Ok(())
    }

    /// Builder method: set language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Builder method: set additional stopwords
    pub fn with_stopwords(mut self, words: &[&str]) -> Self {
        self.stopwords = words.iter().map(|w| w.to_string()).collect();
        self
    }

    /// Builder method: set usual words
    pub fn with_usual_words(mut self, words: &[&str]) -> Self {
        self.usual_words = words.iter().map(|w| w.to_string()).collect();
        self
    }

    /// Builder method: set n-gram length bounds
    pub fn with_ngram_lengths(mut self, min: usize, max: usize) -> Self {
        self.min_ngram_length = min;
        self.max_ngram_length = max;
        self
    }

    /// Builder method: set minimum n-gram count
    pub fn with_min_ngram_count(mut self, count: usize) -> Self {
        self.min_ngram_count = count;
        self
    }

    /// Builder method: set descriptor score threshold
    pub fn with_min_descriptor_score(mut self, score: f64) -> Self {
        self.min_descriptor_score = score;
        self
    }

    /// Builder method: set export directory
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Path of the trigger export file for the given extension
    pub fn trigger_file(&self, extension: &str) -> PathBuf {
        self.export_dir
            .join(format!("{}.{}", self.trigger_file_stem, extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_editorial_tags() {
        assert_eq!(Category::from_tag("SBP:sg", "Paris"), Category::ProperNoun);
        assert_eq!(Category::from_tag("SBC:pl", "loi"), Category::CommonNoun);
        assert_eq!(Category::from_tag("ADJ:fem", "culturel"), Category::Adjective);
        assert_eq!(Category::from_tag("ADV", "très"), Category::Adverb);
        assert_eq!(Category::from_tag("VCJ:sg", "voter"), Category::Verb);
        assert_eq!(Category::from_tag("ECJ:sg", "être"), Category::Auxiliary);
        assert_eq!(Category::from_tag("APAR", "avoir"), Category::Auxiliary);
        assert_eq!(Category::from_tag("PREP", "de"), Category::Other);
        assert_eq!(Category::from_tag("", "x"), Category::Other);
    }

    #[test]
    fn test_category_from_universal_tags() {
        assert_eq!(Category::from_tag("PROPN", "Paris"), Category::ProperNoun);
        assert_eq!(Category::from_tag("NOUN", "law"), Category::CommonNoun);
        assert_eq!(Category::from_tag("VERB", "vote"), Category::Verb);
        assert_eq!(Category::from_tag("VERB", "have"), Category::Auxiliary);
        assert_eq!(Category::from_tag("AUX", "be"), Category::Auxiliary);
    }

    #[test]
    fn test_pos_weights() {
        assert!((Category::ProperNoun.pos_weight() - 2.5).abs() < 1e-10);
        assert!((Category::Adjective.pos_weight() - 1.7).abs() < 1e-10);
        assert!((Category::CommonNoun.pos_weight() - 1.5).abs() < 1e-10);
        assert!((Category::Verb.pos_weight() - 1.2).abs() < 1e-10);
        assert!((Category::Adverb.pos_weight() - 1.0).abs() < 1e-10);
        assert!((Category::Auxiliary.pos_weight() - 0.3).abs() < 1e-10);
        assert!((Category::Other.pos_weight() - 0.1).abs() < 1e-10);
    }

    #[test]
    fn test_coarse_tag() {
        assert_eq!(coarse_tag("SBC:sg"), "SBC");
        assert_eq!(coarse_tag("ADV"), "ADV");
        assert_eq!(coarse_tag(""), "");
    }

    #[test]
    fn test_token_predicates() {
        let token = Token::tagged("Culture", "culture", "SBC:sg", 0, 3, 3);
        assert!(token.has_meaning());
        assert!(token.has_meaning_alone());
        assert!(token.is_title());
        assert!(!token.is_verb());

        let stop = Token::tagged("de", "de", "PREP", 0, 1, 1).with_stopword(true);
        assert!(!stop.has_meaning());

        let punct = Token::tagged(",", ",", "PCT", 0, 2, 2);
        assert!(!punct.has_meaning());

        let usual = Token::tagged("année", "année", "SBC:sg", 0, 0, 0).with_usual(true);
        assert!(usual.has_meaning());
        assert!(!usual.has_meaning_alone());

        let aux = Token::tagged("est", "être", "ECJ:sg", 0, 4, 4);
        assert!(aux.is_auxiliary());
        assert!(!aux.is_verb());
    }

    #[test]
    fn test_config_validation() {
        assert!(SemtagConfig::default().validate().is_ok());

        let bad = SemtagConfig::default().with_ngram_lengths(1, 15);
        assert!(bad.validate().is_err());

        let bad = SemtagConfig::default().with_ngram_lengths(4, 3);
        assert!(bad.validate().is_err());

        let bad = SemtagConfig::default().with_min_ngram_count(0);
        assert!(bad.validate().is_err());

        let bad = SemtagConfig::default().with_min_descriptor_score(f64::NAN);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let cfg = SemtagConfig::from_json_str(r#"{ "language": "en", "max_ngram_length": 6 }"#)
            .unwrap();
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.max_ngram_length, 6);
        assert_eq!(cfg.min_ngram_length, 2);
        assert_eq!(cfg.trigger_file_stem, "triggers");
    }

    #[test]
    fn test_config_from_json_rejects_invalid() {
        let result = SemtagConfig::from_json_str(r#"{ "min_ngram_length": 0 }"#);
        assert!(matches!(result, Err(SemtagError::InvalidConfig(_))));
    }

    #[test]
    fn test_trigger_file_path() {
        let cfg = SemtagConfig::default().with_export_dir("/tmp/corpus");
        assert_eq!(
            cfg.trigger_file("trg"),
            PathBuf::from("/tmp/corpus/triggers.trg")
        );
    }
}
