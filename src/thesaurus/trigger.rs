//! Triggers: key phrases pointing at descriptors through weighted edges

use super::DescriptorId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Handle of a trigger inside its thesaurus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A key phrase and its descriptor → weight edges
#[derive(Debug, Clone)]
pub struct Trigger {
    id: TriggerId,
    text: String,
    connections: FxHashMap<DescriptorId, f64>,
}

impl Trigger {
    pub fn new(id: TriggerId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            connections: FxHashMap::default(),
        }
    }

    pub fn id(&self) -> TriggerId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Add `delta` to the edge towards `descriptor`, creating it at 0 first.
    /// Weights are not clamped; negative weights survive until cleaning.
    pub fn connect(&mut self, descriptor: DescriptorId, delta: f64) {
        *self.connections.entry(descriptor).or_insert(0.0) += delta;
    }

    pub fn is_connected(&self, descriptor: DescriptorId) -> bool {
        self.connections.contains_key(&descriptor)
    }

    pub fn weight(&self, descriptor: DescriptorId) -> Option<f64> {
        self.connections.get(&descriptor).copied()
    }

    /// Largest edge weight, 0 without edges
    pub fn max_score(&self) -> f64 {
        self.connections
            .values()
            .copied()
            .fold(None, |max: Option<f64>, w| Some(max.map_or(w, |m| m.max(w))))
            .unwrap_or(0.0)
    }

    /// Drop every edge whose weight is not positive
    pub fn clean_connections(&mut self) -> usize {
        let before = self.connections.len();
        self.connections.retain(|_, weight| *weight > 0.0);
        before - self.connections.len()
    }

    /// Edges, heaviest first (ties by descriptor handle)
    pub fn connections(&self) -> Vec<(DescriptorId, f64)> {
        let mut edges: Vec<(DescriptorId, f64)> =
            self.connections.iter().map(|(&d, &w)| (d, w)).collect();
        edges.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        edges
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_accumulates() {
        let mut trigger = Trigger::new(TriggerId(0), "droit d'auteur");
        let d = DescriptorId(3);

        assert!(!trigger.is_connected(d));
        trigger.connect(d, 1.5);
        trigger.connect(d, 2.0);

        assert!(trigger.is_connected(d));
        assert!((trigger.weight(d).unwrap() - 3.5).abs() < 1e-10);
    }

    #[test]
    fn test_connect_does_not_clamp() {
        let mut trigger = Trigger::new(TriggerId(0), "musique");
        trigger.connect(DescriptorId(0), 1.0);
        trigger.connect(DescriptorId(0), -4.0);
        assert!((trigger.weight(DescriptorId(0)).unwrap() + 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_max_score() {
        let mut trigger = Trigger::new(TriggerId(0), "musique");
        assert!((trigger.max_score()).abs() < 1e-10);

        trigger.connect(DescriptorId(0), -2.0);
        assert!((trigger.max_score() + 2.0).abs() < 1e-10);

        trigger.connect(DescriptorId(1), 4.0);
        trigger.connect(DescriptorId(2), 1.0);
        assert!((trigger.max_score() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_clean_connections() {
        let mut trigger = Trigger::new(TriggerId(0), "musique");
        trigger.connect(DescriptorId(0), 2.0);
        trigger.connect(DescriptorId(1), 0.0);
        trigger.connect(DescriptorId(2), -1.0);

        assert_eq!(trigger.clean_connections(), 2);
        assert_eq!(trigger.len(), 1);
        assert!(trigger.is_connected(DescriptorId(0)));
    }

    #[test]
    fn test_connections_heaviest_first() {
        let mut trigger = Trigger::new(TriggerId(0), "musique");
        trigger.connect(DescriptorId(2), 1.0);
        trigger.connect(DescriptorId(0), 5.0);
        trigger.connect(DescriptorId(1), 1.0);

        let order: Vec<_> = trigger.connections().into_iter().map(|(d, _)| d).collect();
        assert_eq!(order, vec![DescriptorId(0), DescriptorId(1), DescriptorId(2)]);
    }
}
