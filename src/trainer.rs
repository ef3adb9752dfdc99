//! Association trainer
//!
//! Learns trigger → descriptor weights from documents labelled by humans.
//! Each training pass compares the descriptors the machine proposes with the
//! human labels and adjusts the edges of the triggers found in the text:
//!
//! - true positive: triggers already pointing at the descriptor gain
//!   `2 + score`
//! - false positive: triggers already pointing at the descriptor lose
//!   `1 + score`
//! - false negative: every trigger of the text gains `score` towards the
//!   missed descriptor
//!
//! where `score` is the trigger score of the key-entity behind the trigger.

use crate::errors::Result;
use crate::nlp::tagger::{LexiconLemmatizer, LexiconTagger};
use crate::nlp::tokenizer::normalize_label;
use crate::pipeline::observer::NoopObserver;
use crate::pipeline::runner::Extractor;
use crate::pipeline::traits::{Lemmatizer, PosTagger};
use crate::thesaurus::{DescriptorId, Thesaurus, TriggerId};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Extension of an export whose vocabulary has been validated
pub const VALIDATED_EXTENSION: &str = "trg";
/// Extension of an export pending review
pub const PENDING_EXTENSION: &str = "pdg";

/// What one training pass did
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Parsed human labels
    pub labels: Vec<String>,
    pub true_positives: Vec<String>,
    pub false_positives: Vec<String>,
    pub false_negatives: Vec<String>,
    /// Labels that were not catalogued before this pass
    pub vocabulary_gaps: Vec<String>,
    /// Number of triggers found in the text
    pub triggers: usize,
    /// Best key-entities of the text by trigger score, for review
    pub keyentities: Vec<String>,
}

/// Split a comma-separated label list into normalized, distinct labels
pub fn parse_labels(labels: &str) -> Vec<String> {
    let mut seen = FxHashSet::default();
    labels
        .split(',')
        .map(normalize_label)
        .filter(|label| !label.is_empty() && seen.insert(label.clone()))
        .collect()
}

/// Trains the trigger graph of a thesaurus
#[derive(Debug)]
pub struct SemanticalTrainer<T = LexiconTagger, L = LexiconLemmatizer> {
    extractor: Extractor<T, L>,
    thesaurus: Thesaurus,
}

impl<T, L> SemanticalTrainer<T, L>
where
    T: PosTagger,
    L: Lemmatizer,
{
    pub fn new(extractor: Extractor<T, L>, thesaurus: Thesaurus) -> Self {
        Self {
            extractor,
            thesaurus,
        }
    }

    pub fn extractor(&self) -> &Extractor<T, L> {
        &self.extractor
    }

    pub fn thesaurus(&self) -> &Thesaurus {
        &self.thesaurus
    }

    pub fn into_thesaurus(self) -> Thesaurus {
        self.thesaurus
    }

    /// Forget every trigger, then seed one trigger per catalogued
    /// descriptor, named after it and pointing at it with weight 1
    pub fn begin(&mut self) {
        self.thesaurus.clear_triggers();

        let descriptors: Vec<(DescriptorId, String)> = self
            .thesaurus
            .descriptors()
            .map(|d| (d.id(), d.text().to_string()))
            .collect();
        for (descriptor, text) in descriptors {
            let (trigger, _) = self.thesaurus.get_or_create_trigger(&text);
            self.thesaurus.connect(trigger, descriptor, 1.0);
        }

        tracing::info!(triggers = self.thesaurus.num_triggers(), "training started");
    }

    /// Run one training pass over `text` labelled with the comma-separated
    /// `labels`
    pub fn train(&mut self, text: &str, labels: &str) -> Result<TrainingReport> {
        let mut report = TrainingReport {
            labels: parse_labels(labels),
            ..TrainingReport::default()
        };

        let mut human: BTreeSet<DescriptorId> = BTreeSet::new();
        for label in &report.labels {
            let (descriptor, created) = self.thesaurus.get_or_create_descriptor(label);
            if created {
                tracing::warn!(descriptor = %label, "label not in thesaurus, cataloguing it");
                report.vocabulary_gaps.push(label.clone());
            }
            human.insert(descriptor);
        }

        let document = self.extractor.analyze(text)?;

        // Triggers of this pass with the score of their key-entity
        let mut current: Vec<(TriggerId, f64)> = Vec::new();
        let mut seen: FxHashSet<TriggerId> = FxHashSet::default();
        for keyentity in document.keyentities() {
            let (trigger, _) = self.thesaurus.get_or_create_trigger(keyentity.text());
            if seen.insert(trigger) {
                current.push((trigger, keyentity.trigger_score()));
            }
        }
        report.triggers = current.len();
        report.keyentities = document
            .keyentities_for_trainer(self.extractor.config().trainer_top_n)
            .into_iter()
            .map(|ke| ke.text().to_string())
            .collect();

        let machine: BTreeSet<DescriptorId> = self
            .extractor
            .resolve(&document, &self.thesaurus, &mut NoopObserver)
            .descriptors()
            .into_iter()
            .map(|d| d.descriptor)
            .collect();

        for &descriptor in human.intersection(&machine) {
            report.true_positives.push(self.descriptor_text(descriptor));
            self.update_connected(&current, descriptor, |score| 2.0 + score);
        }
        for &descriptor in machine.difference(&human) {
            report.false_positives.push(self.descriptor_text(descriptor));
            self.update_connected(&current, descriptor, |score| -(1.0 + score));
        }
        for &descriptor in human.difference(&machine) {
            report.false_negatives.push(self.descriptor_text(descriptor));
            for &(trigger, score) in &current {
                self.thesaurus.connect(trigger, descriptor, score);
            }
        }

        tracing::debug!(
            true_positives = report.true_positives.len(),
            false_positives = report.false_positives.len(),
            false_negatives = report.false_negatives.len(),
            triggers = report.triggers,
            "training pass"
        );
        Ok(report)
    }

    /// Clean and write the trigger graph, returning the written file
    ///
    /// The file goes to the configured export directory, with the
    /// [`VALIDATED_EXTENSION`] when `force` is set and the
    /// [`PENDING_EXTENSION`] otherwise.
    pub fn export(&mut self, force: bool) -> Result<PathBuf> {
        let extension = if force {
            VALIDATED_EXTENSION
        } else {
            PENDING_EXTENSION
        };
        let path = self.extractor.config().trigger_file(extension);
        self.thesaurus.write_triggers(&path)?;
        Ok(path)
    }

    /// Apply `delta(score)` on the edges towards `descriptor` of the
    /// current triggers already connected to it
    fn update_connected(
        &mut self,
        current: &[(TriggerId, f64)],
        descriptor: DescriptorId,
        delta: impl Fn(f64) -> f64,
    ) {
        for &(trigger, score) in current {
            if self.thesaurus.trigger(trigger).is_connected(descriptor) {
                self.thesaurus.connect(trigger, descriptor, delta(score));
            }
        }
    }

    fn descriptor_text(&self, descriptor: DescriptorId) -> String {
        self.thesaurus.descriptor(descriptor).text().to_string()
    }
}
