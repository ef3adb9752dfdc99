//! Natural Language Processing components
//!
//! This module provides tokenization, stopword filtering and the default
//! lexicon-backed tagger and lemmatizer.

pub mod stopwords;
pub mod tagger;
pub mod tokenizer;
