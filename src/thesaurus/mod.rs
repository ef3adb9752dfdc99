//! Thesaurus: the controlled vocabulary and the trigger graph
//!
//! Descriptors are the labels a document can receive. Triggers are key
//! phrases learnt from labelled documents; each holds weighted edges towards
//! descriptors. Both live in get-or-create registries keyed by their
//! tokenized text (see [`normalize_key`]), so a descriptor, the trigger
//! seeded from it and a key-entity mentioning it all share one key.

pub mod store;
pub mod trigger;

pub use store::TriggerRecord;
pub use trigger::{Trigger, TriggerId};

use crate::nlp::tokenizer::{normalize_key, normalize_label};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Handle of a descriptor inside its thesaurus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DescriptorId(pub u32);

impl DescriptorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A controlled-vocabulary label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    id: DescriptorId,
    text: String,
}

impl Descriptor {
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Descriptor and trigger registries
#[derive(Debug, Clone, Default)]
pub struct Thesaurus {
    descriptor_index: FxHashMap<String, DescriptorId>,
    descriptors: Vec<Descriptor>,
    trigger_index: FxHashMap<String, TriggerId>,
    triggers: Vec<Trigger>,
}

impl Thesaurus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a thesaurus holding the given descriptors and no trigger
    pub fn from_descriptors<I, S>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut thesaurus = Self::new();
        for text in descriptors {
            thesaurus.get_or_create_descriptor(text.as_ref());
        }
        thesaurus
    }

    // ------------------------------------------------------------------
    // Descriptors
    // ------------------------------------------------------------------

    /// The descriptor keeps its label as written; lookups go through the key
    pub fn get_or_create_descriptor(&mut self, text: &str) -> (DescriptorId, bool) {
        let key = normalize_key(text);
        if let Some(&id) = self.descriptor_index.get(&key) {
            return (id, false);
        }

        let id = DescriptorId(self.descriptors.len() as u32);
        self.descriptor_index.insert(key, id);
        self.descriptors.push(Descriptor {
            id,
            text: normalize_label(text),
        });
        (id, true)
    }

    pub fn descriptor_by_text(&self, text: &str) -> Option<DescriptorId> {
        self.descriptor_index.get(&normalize_key(text)).copied()
    }

    pub fn descriptor(&self, id: DescriptorId) -> &Descriptor {
        &self.descriptors[id.index()]
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.iter()
    }

    pub fn num_descriptors(&self) -> usize {
        self.descriptors.len()
    }

    // ------------------------------------------------------------------
    // Triggers
    // ------------------------------------------------------------------

    pub fn get_or_create_trigger(&mut self, text: &str) -> (TriggerId, bool) {
        let key = normalize_key(text);
        if let Some(&id) = self.trigger_index.get(&key) {
            return (id, false);
        }

        let id = TriggerId(self.triggers.len() as u32);
        self.trigger_index.insert(key.clone(), id);
        self.triggers.push(Trigger::new(id, key));
        (id, true)
    }

    pub fn trigger_by_text(&self, text: &str) -> Option<TriggerId> {
        self.trigger_index.get(&normalize_key(text)).copied()
    }

    pub fn trigger(&self, id: TriggerId) -> &Trigger {
        &self.triggers[id.index()]
    }

    pub fn trigger_mut(&mut self, id: TriggerId) -> &mut Trigger {
        &mut self.triggers[id.index()]
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter()
    }

    pub fn num_triggers(&self) -> usize {
        self.triggers.len()
    }

    /// Add `delta` to the edge from `trigger` to `descriptor`
    pub fn connect(&mut self, trigger: TriggerId, descriptor: DescriptorId, delta: f64) {
        self.triggers[trigger.index()].connect(descriptor, delta);
    }

    /// Forget every trigger; descriptors are kept
    pub fn clear_triggers(&mut self) {
        self.trigger_index.clear();
        self.triggers.clear();
    }

    /// Drop non-positive edges of every trigger, returning how many went
    pub fn clean_connections(&mut self) -> usize {
        self.triggers
            .iter_mut()
            .map(Trigger::clean_connections)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_registry() {
        let mut thesaurus = Thesaurus::from_descriptors(["Culture", "Internet"]);
        assert_eq!(thesaurus.num_descriptors(), 2);

        let (id, created) = thesaurus.get_or_create_descriptor("  Culture ");
        assert!(!created);
        assert_eq!(thesaurus.descriptor(id).text(), "Culture");

        let (_, created) = thesaurus.get_or_create_descriptor("Musique");
        assert!(created);
        assert_eq!(thesaurus.num_descriptors(), 3);
    }

    #[test]
    fn test_trigger_lookup_is_read_only() {
        let thesaurus = Thesaurus::from_descriptors(["Culture"]);
        assert!(thesaurus.trigger_by_text("droit d'auteur").is_none());
        assert_eq!(thesaurus.num_triggers(), 0);
    }

    #[test]
    fn test_trigger_keys_normalized() {
        let mut thesaurus = Thesaurus::new();
        let (a, _) = thesaurus.get_or_create_trigger("droit d’auteur");
        let (b, created) = thesaurus.get_or_create_trigger("droit  d'auteur");
        let (c, _) = thesaurus.get_or_create_trigger("droit d' auteur");

        assert!(!created);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(thesaurus.num_triggers(), 1);
        assert_eq!(thesaurus.trigger(a).text(), "droit d' auteur");
        assert_eq!(thesaurus.trigger_by_text("droit d'auteur"), Some(a));
    }

    #[test]
    fn test_descriptor_with_elision_keeps_label() {
        let thesaurus = Thesaurus::from_descriptors(["droit d'auteur"]);
        let id = thesaurus.descriptor_by_text("droit d' auteur").unwrap();

        assert_eq!(thesaurus.descriptor(id).text(), "droit d'auteur");
        assert_eq!(thesaurus.descriptor_by_text("droit d’auteur"), Some(id));
    }

    #[test]
    fn test_connect_and_clean() {
        let mut thesaurus = Thesaurus::from_descriptors(["Culture", "Internet"]);
        let culture = thesaurus.descriptor_by_text("Culture").unwrap();
        let internet = thesaurus.descriptor_by_text("Internet").unwrap();
        let (trigger, _) = thesaurus.get_or_create_trigger("téléchargement");

        thesaurus.connect(trigger, culture, -1.0);
        thesaurus.connect(trigger, internet, 3.0);
        assert_eq!(thesaurus.clean_connections(), 1);
        assert_eq!(thesaurus.trigger(trigger).len(), 1);
    }

    #[test]
    fn test_clear_triggers_keeps_descriptors() {
        let mut thesaurus = Thesaurus::from_descriptors(["Culture"]);
        thesaurus.get_or_create_trigger("culture");
        thesaurus.clear_triggers();

        assert_eq!(thesaurus.num_triggers(), 0);
        assert!(thesaurus.trigger_by_text("culture").is_none());
        assert_eq!(thesaurus.num_descriptors(), 1);
    }
}
