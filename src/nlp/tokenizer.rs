//! Text normalization and tokenization
//!
//! Splits normalized text into sentences (UAX #29 sentence boundaries) and
//! words (UAX #29 word boundaries), detaching French elisions such as
//! `l'` or `qu'` from the word they precede.

use crate::types::Token;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Apostrophe variants folded onto `'`
const APOSTROPHES: &[char] = &['\u{2019}', '\u{2018}', '\u{02BC}', '\u{00B4}', '\u{0060}'];

/// Elided prefixes detached from the following word
const ELISIONS: &[&str] = &[
    "c", "d", "j", "l", "m", "n", "s", "t", "qu", "jusqu", "lorsqu", "puisqu", "quoiqu",
];

/// NFC-normalize text and fold apostrophe variants
pub fn normalize_text(text: &str) -> String {
    text.nfc()
        .map(|c| if APOSTROPHES.contains(&c) { '\'' } else { c })
        .collect()
}

/// Normalize a short label (descriptor, trigger text): [`normalize_text`],
/// then collapse and trim whitespace
pub fn normalize_label(label: &str) -> String {
    normalize_text(label)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Registry key of a descriptor or trigger text: [`normalize_label`], then
/// the word split of [`Tokenizer`] joined with single spaces
///
/// `"droit d'auteur"` and `"droit d' auteur"` share the key
/// `"droit d' auteur"`, which is the text of the matching key-entity.
pub fn normalize_key(text: &str) -> String {
    let normalized = normalize_label(text);
    let mut pieces: Vec<&str> = Vec::new();

    for chunk in normalized.split(' ') {
        if is_detached_elision(chunk) {
            pieces.push(chunk);
            continue;
        }
        for word in chunk.unicode_words() {
            pieces.extend(split_elision(word));
        }
    }

    pieces.join(" ")
}

/// Title-case test: every run of cased characters starts with an uppercase
/// letter followed by lowercase ones, and at least one cased character exists
///
/// `"Culture"`, `"Jean-Pierre"` are titles; `"UMP"`, `"culture"`, `"2009"`
/// are not.
pub fn is_title_case(word: &str) -> bool {
    let mut has_cased = false;
    let mut previous_cased = false;

    for c in word.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            has_cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            has_cased = true;
        } else {
            previous_cased = false;
        }
    }

    has_cased
}

/// Sentence and word tokenizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer
    }

    /// Tokenize already normalized text into a flat token list
    ///
    /// Sentences without any word are skipped, so sentence indices are dense.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut sentence_idx = 0;

        for sentence in text.unicode_sentences() {
            let mut position = 0;
            for word in sentence.unicode_words() {
                for piece in split_elision(word) {
                    tokens.push(Token::new(piece, sentence_idx, position, tokens.len()));
                    position += 1;
                }
            }
            if position > 0 {
                sentence_idx += 1;
            }
        }

        tokens
    }
}

/// Split `l'État` into `l'` and `État`; other words are returned unchanged
fn split_elision(word: &str) -> Vec<&str> {
    if let Some(idx) = word.find('\'') {
        let (prefix, rest) = word.split_at(idx + 1);
        let bare = &prefix[..idx];
        if rest.chars().next().is_some_and(char::is_alphabetic)
            && ELISIONS.contains(&bare.to_lowercase().as_str())
        {
            return vec![prefix, rest];
        }
    }
    vec![word]
}

/// `d'` standing alone, as left by a previous split
fn is_detached_elision(chunk: &str) -> bool {
    chunk
        .strip_suffix('\'')
        .is_some_and(|bare| ELISIONS.contains(&bare.to_lowercase().as_str()))
}
