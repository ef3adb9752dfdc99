//! Pipeline artifacts.
//!
//! Typed results leaving the pipeline: the descriptors a document resolves
//! to, with their normalized scores.

use crate::thesaurus::DescriptorId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A descriptor proposed for a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDescriptor {
    pub descriptor: DescriptorId,
    pub text: String,
    /// Share of the document's total trigger score, in percent
    pub score: f64,
}

/// Outcome of descriptor resolution for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorResolution {
    /// Every descriptor reached through a trigger, normalized, best first
    pub scores: Vec<ScoredDescriptor>,
    /// Sum of the trigger scores of all key-entities
    pub total_score: f64,
    /// Threshold a descriptor must exceed to be returned
    pub min_score: f64,
}

impl DescriptorResolution {
    /// Resolution that proposes nothing
    pub fn empty(total_score: f64, min_score: f64) -> Self {
        Self {
            scores: Vec::new(),
            total_score,
            min_score,
        }
    }

    /// Normalize raw per-descriptor scores against `total_score`
    ///
    /// A zero or non-finite total yields an empty resolution.
    pub fn from_raw_scores(
        raw: Vec<(DescriptorId, String, f64)>,
        total_score: f64,
        min_score: f64,
    ) -> Self {
        if total_score == 0.0 || !total_score.is_finite() {
            return Self::empty(total_score, min_score);
        }

        let mut scores: Vec<ScoredDescriptor> = raw
            .into_iter()
            .map(|(descriptor, text, score)| ScoredDescriptor {
                descriptor,
                text,
                score: score / total_score * 100.0,
            })
            .collect();
        scores.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });

        Self {
            scores,
            total_score,
            min_score,
        }
    }

    /// Descriptors scoring strictly above the threshold, best first
    pub fn descriptors(&self) -> Vec<ScoredDescriptor> {
        self.scores
            .iter()
            .filter(|d| d.score > self.min_score)
            .cloned()
            .collect()
    }

    /// Normalized score of a descriptor, if reached
    pub fn score_of(&self, text: &str) -> Option<f64> {
        self.scores.iter().find(|d| d.text == text).map(|d| d.score)
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
