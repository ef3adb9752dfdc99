//! N-gram candidate generation
//!
//! Enumerates every contiguous token run of a sentence whose first and last
//! tokens carry meaning, keyed by lemma groups so inflected repeats merge.
//! Interior stopwords are allowed ("ministère de la Culture").

use super::lemma_group::{LemmaGroupId, LemmaGroupRegistry};
use crate::types::{SemtagConfig, Token};
use rustc_hash::FxHashMap;
use std::ops::Range;

/// Configuration for n-gram generation
#[derive(Debug, Clone)]
pub struct NgramConfig {
    /// Minimum number of tokens in an n-gram
    pub min_length: usize,
    /// Maximum number of tokens in an n-gram
    pub max_length: usize,
    /// Minimum occurrences for a non-title n-gram to be kept
    pub min_count: usize,
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            min_length: 2,
            max_length: 15,
            min_count: 2,
        }
    }
}

impl From<&SemtagConfig> for NgramConfig {
    fn from(config: &SemtagConfig) -> Self {
        Self {
            min_length: config.min_ngram_length,
            max_length: config.max_ngram_length,
            min_count: config.min_ngram_count,
        }
    }
}

/// A lemma-group sequence and the number of times it occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramCandidate {
    pub groups: Vec<LemmaGroupId>,
    pub count: usize,
}

/// N-gram candidate generator
#[derive(Debug, Clone, Default)]
pub struct NgramGenerator {
    config: NgramConfig,
}

impl NgramGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NgramConfig) -> Self {
        Self { config }
    }

    /// Set minimum n-gram length, at least 1
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.config.min_length = min_length.max(1);
        self
    }

    /// Set maximum n-gram length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.config.max_length = max_length;
        self
    }

    /// Set minimum count
    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.config.min_count = min_count;
        self
    }

    /// Generate the kept candidates, most frequent first (ties keep first
    /// appearance order)
    ///
    /// A candidate is kept when it occurred at least `min_count` times, or
    /// when every member group is a title.
    pub fn generate(&self, tokens: &[Token], groups: &LemmaGroupRegistry) -> Vec<NgramCandidate> {
        let mut index: FxHashMap<Vec<LemmaGroupId>, usize> = FxHashMap::default();
        let mut candidates: Vec<NgramCandidate> = Vec::new();
        // An empty n-gram has no boundary to test
        let min_length = self.config.min_length.max(1);

        for span in sentence_spans(tokens) {
            let sentence = &tokens[span.clone()];

            for begin in 0..sentence.len() {
                let end_max = std::cmp::min(sentence.len(), begin + self.config.max_length);

                for end in (begin + min_length)..=end_max {
                    // Stopwords are only rejected at the boundaries
                    if !sentence[begin].has_meaning() || !sentence[end - 1].has_meaning() {
                        continue;
                    }

                    let key: Vec<LemmaGroupId> = (span.start + begin..span.start + end)
                        .map(|idx| groups.group_of(idx))
                        .collect();

                    match index.get(&key) {
                        Some(&i) => candidates[i].count += 1,
                        None => {
                            index.insert(key.clone(), candidates.len());
                            candidates.push(NgramCandidate {
                                groups: key,
                                count: 1,
                            });
                        }
                    }
                }
            }
        }

        candidates.retain(|c| {
            c.count >= self.config.min_count
                || c.groups.iter().all(|&g| groups.get(g).is_title(tokens))
        });
        candidates.sort_by(|a, b| b.count.cmp(&a.count));
        candidates
    }
}

/// Lemma groups interesting on their own, most frequent first
pub fn frequent_groups(
    tokens: &[Token],
    groups: &LemmaGroupRegistry,
    lexical_diversity: f64,
) -> Vec<LemmaGroupId> {
    let mut frequent: Vec<LemmaGroupId> = groups
        .iter()
        .filter(|g| g.has_interest_alone(tokens, lexical_diversity))
        .map(|g| g.id())
        .collect();
    frequent.sort_by(|a, b| groups.get(*b).count().cmp(&groups.get(*a).count()));
    frequent
}

/// Token index ranges of each sentence, in order
pub fn sentence_spans(tokens: &[Token]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;

    for i in 1..=tokens.len() {
        if i == tokens.len() || tokens[i].sentence_idx != tokens[start].sentence_idx {
            spans.push(start..i);
            start = i;
        }
    }

    spans
}
