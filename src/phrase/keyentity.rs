//! Key-entities and their confidence metrics
//!
//! A key-entity is a candidate key phrase: an ordered sequence of lemma
//! groups identified by the surface forms of their main occurrences. All
//! confidences are computed once, when the entity is created, against the
//! statistics of its document.

use super::lemma_group::{LemmaGroupId, LemmaGroupRegistry};
use crate::errors::{Result, SemtagError};
use crate::types::Token;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Handle of a key-entity inside its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyEntityId(pub u32);

impl KeyEntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Document data the confidence metrics are computed against
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub tokens: &'a [Token],
    pub groups: &'a LemmaGroupRegistry,
    /// Total number of words of the document
    pub words_count: usize,
}

/// Cached confidence values of a key-entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidences {
    pub frequency: f64,
    pub nrelative_frequency: f64,
    pub title: f64,
    pub pos: f64,
    pub heuristic_mutual_information: f64,
    pub statistical_mutual_information: f64,
}

impl Confidences {
    /// Compute every confidence of `members` occurring `count` times
    pub fn compute(members: &[LemmaGroupId], count: usize, ctx: &ScoringContext<'_>) -> Self {
        Self {
            frequency: frequency(count, ctx.words_count),
            nrelative_frequency: nrelative_frequency(members.len(), count, ctx.words_count),
            title: title_confidence(members, ctx),
            pos: pos_confidence(members, ctx),
            heuristic_mutual_information: heuristic_mutual_information(members, ctx),
            statistical_mutual_information: statistical_mutual_information(members, count, ctx),
        }
    }
}

/// Occurrences over total words, scaled so that a word making up a tenth of
/// the document scores 1
fn frequency(count: usize, words_count: usize) -> f64 {
    if words_count == 0 {
        return 0.0;
    }
    count as f64 / words_count as f64 / 0.1
}

/// Occurrences over the number of n-grams of the same length the document
/// could hold
fn nrelative_frequency(len: usize, count: usize, words_count: usize) -> f64 {
    let possible = words_count as f64 - len as f64 + 1.0;
    if possible <= 0.0 {
        return 0.0;
    }
    count as f64 / possible
}

fn title_confidence(members: &[LemmaGroupId], ctx: &ScoringContext<'_>) -> f64 {
    let meaningful: Vec<LemmaGroupId> = members
        .iter()
        .copied()
        .filter(|&g| ctx.groups.get(g).is_valid(ctx.tokens))
        .collect();
    if meaningful.is_empty() {
        return 1.0;
    }

    let step = 3.0 / meaningful.len() as f64 + 0.1;
    let titles = meaningful
        .iter()
        .filter(|&&g| ctx.groups.get(g).is_title(ctx.tokens))
        .count();
    1.0 + titles as f64 * step
}

fn pos_confidence(members: &[LemmaGroupId], ctx: &ScoringContext<'_>) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let total: f64 = members
        .iter()
        .map(|&g| ctx.groups.get(g).category(ctx.tokens).pos_weight())
        .sum();
    total / members.len() as f64
}

/// Heuristic cohesion: how rarely the meaningful members occur outside of
/// this entity's context
fn heuristic_mutual_information(members: &[LemmaGroupId], ctx: &ScoringContext<'_>) -> f64 {
    let len = members.len();
    if len == 1 {
        return 1.0;
    }

    let alone_counts: Vec<usize> = members
        .iter()
        .enumerate()
        .filter(|&(_, &g)| ctx.groups.get(g).is_valid(ctx.tokens))
        .map(|(position, &group)| {
            // (other member, offset relative to this member)
            let neighbours: Vec<(LemmaGroupId, isize)> = members
                .iter()
                .enumerate()
                .filter(|&(_, &other)| other != group)
                .map(|(p, &other)| (other, p as isize - position as isize))
                .collect();

            ctx.groups
                .get(group)
                .occurrences()
                .iter()
                .filter(|&&idx| !is_in_context(idx, &neighbours, ctx))
                .count()
        })
        .collect();

    if alone_counts.is_empty() {
        return 0.1;
    }
    if alone_counts.iter().all(|&n| n == 0) {
        return 3.0 * len as f64;
    }
    if alone_counts.contains(&0) {
        return 2.0;
    }

    alone_counts
        .iter()
        .map(|&alone| 2.0 * len as f64 / (len + alone) as f64)
        .product()
}

/// Whether any neighbour sits at its expected offset from `token_idx`, in
/// the same sentence
fn is_in_context(
    token_idx: usize,
    neighbours: &[(LemmaGroupId, isize)],
    ctx: &ScoringContext<'_>,
) -> bool {
    let sentence = ctx.tokens[token_idx].sentence_idx;
    neighbours.iter().any(|&(group, offset)| {
        let target = token_idx as isize + offset;
        target >= 0
            && (target as usize) < ctx.tokens.len()
            && ctx.tokens[target as usize].sentence_idx == sentence
            && ctx.groups.group_of(target as usize) == group
    })
}

/// Pointwise mutual information of the member sequence
fn statistical_mutual_information(
    members: &[LemmaGroupId],
    count: usize,
    ctx: &ScoringContext<'_>,
) -> f64 {
    let len = members.len();
    if len == 1 {
        return 1.0;
    }

    let words = ctx.words_count as f64;
    let possible = words - len as f64 + 1.0;
    if words <= 0.0 || possible <= 0.0 {
        return 1.0;
    }

    let members_probability: f64 = members
        .iter()
        .map(|&g| ctx.groups.get(g).count() as f64 / words)
        .product();
    let argument = count as f64 / possible / members_probability;

    if argument.is_finite() && argument > 0.0 {
        argument.ln()
    } else {
        1.0
    }
}

/// A scored candidate key phrase
#[derive(Debug, Clone)]
pub struct KeyEntity {
    id: KeyEntityId,
    groups: Vec<LemmaGroupId>,
    text: String,
    count: usize,
    confidences: Confidences,
}

impl KeyEntity {
    pub fn new(
        id: KeyEntityId,
        groups: Vec<LemmaGroupId>,
        count: usize,
        ctx: &ScoringContext<'_>,
    ) -> Self {
        let text = groups
            .iter()
            .map(|&g| ctx.groups.get(g).text(ctx.tokens))
            .collect::<Vec<_>>()
            .join(" ");
        let confidences = Confidences::compute(&groups, count, ctx);

        tracing::trace!(
            keyentity = %text,
            count,
            statistical_mi = confidences.statistical_mutual_information,
            heuristic_mi = confidences.heuristic_mutual_information,
            "scored key-entity"
        );

        Self {
            id,
            groups,
            text,
            count,
            confidences,
        }
    }

    pub fn id(&self) -> KeyEntityId {
        self.id
    }

    /// Member lemma groups, in order
    pub fn groups(&self) -> &[LemmaGroupId] {
        &self.groups
    }

    /// Main occurrences joined by spaces
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn confidences(&self) -> &Confidences {
        &self.confidences
    }

    /// Mean of both mutual informations, weighted by the POS confidence
    pub fn collocation_confidence(&self) -> f64 {
        let c = &self.confidences;
        (c.heuristic_mutual_information + c.statistical_mutual_information) / 2.0 * c.pos
    }

    pub fn keyconcept_confidence(&self) -> f64 {
        self.confidences.nrelative_frequency
    }

    pub fn confidence(&self) -> f64 {
        self.collocation_confidence() * self.keyconcept_confidence()
    }

    pub fn frequency_relative_pmi(&self) -> f64 {
        self.confidences.statistical_mutual_information * self.confidences.nrelative_frequency
    }

    /// Score contributed to descriptor resolution
    pub fn trigger_score(&self) -> f64 {
        self.frequency_relative_pmi() * self.confidences.pos
    }

    /// Whether `other`'s groups occur contiguously inside this entity
    pub fn contains(&self, other: &KeyEntity) -> bool {
        if other.is_empty() || other.len() > self.len() {
            return false;
        }
        self.groups
            .windows(other.len())
            .any(|window| window == other.groups.as_slice())
    }

    /// Strictly shorter entity contained in the longer one, either way
    pub fn is_duplicate(&self, other: &KeyEntity) -> bool {
        match self.len().cmp(&other.len()) {
            Ordering::Greater => self.contains(other),
            Ordering::Less => other.contains(self),
            Ordering::Equal => false,
        }
    }

    /// Rank this entity against one it contains or is contained in
    ///
    /// Statistical MI decides first, then heuristic MI, title confidence,
    /// overall confidence and finally length. `Ordering::Greater` means this
    /// entity wins; `Ordering::Equal` means neither does.
    ///
    /// # Errors
    ///
    /// [`SemtagError::InvalidComparison`] when neither entity contains the
    /// other.
    pub fn rank_against(&self, other: &KeyEntity) -> Result<Ordering> {
        if !self.contains(other) && !other.contains(self) {
            return Err(SemtagError::InvalidComparison {
                left: self.text.clone(),
                right: other.text.clone(),
            });
        }

        let keys = [
            (
                self.confidences.statistical_mutual_information,
                other.confidences.statistical_mutual_information,
            ),
            (
                self.confidences.heuristic_mutual_information,
                other.confidences.heuristic_mutual_information,
            ),
            (self.confidences.title, other.confidences.title),
            (self.confidence(), other.confidence()),
            (self.len() as f64, other.len() as f64),
        ];

        for (mine, theirs) in keys {
            if mine != theirs {
                return Ok(mine.partial_cmp(&theirs).unwrap_or(Ordering::Equal));
            }
        }
        Ok(Ordering::Equal)
    }

    /// Whether this entity strictly outranks `other`
    pub fn outranks(&self, other: &KeyEntity) -> Result<bool> {
        Ok(self.rank_against(other)? == Ordering::Greater)
    }

    /// Same overall confidence and same length
    pub fn is_equal(&self, other: &KeyEntity) -> bool {
        self.confidence() == other.confidence() && self.len() == other.len()
    }
}

/// Get-or-create registry of the key-entities of one document, keyed by the
/// member main-occurrence surface forms
#[derive(Debug, Default)]
pub struct KeyEntityRegistry {
    key_to_id: FxHashMap<Vec<String>, KeyEntityId>,
    entities: Vec<KeyEntity>,
}

impl KeyEntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entity keyed by `groups`' surface forms, creating and
    /// scoring it when it doesn't exist yet
    pub fn get_or_create(
        &mut self,
        groups: Vec<LemmaGroupId>,
        count: usize,
        ctx: &ScoringContext<'_>,
    ) -> (KeyEntityId, bool) {
        let key: Vec<String> = groups
            .iter()
            .map(|&g| ctx.groups.get(g).text(ctx.tokens).to_string())
            .collect();
        if let Some(&id) = self.key_to_id.get(&key) {
            return (id, false);
        }

        let id = KeyEntityId(self.entities.len() as u32);
        self.key_to_id.insert(key, id);
        self.entities.push(KeyEntity::new(id, groups, count, ctx));
        (id, true)
    }

    pub fn get(&self, id: KeyEntityId) -> &KeyEntity {
        &self.entities[id.index()]
    }

    /// Look an entity up by its space-joined text
    pub fn find(&self, text: &str) -> Option<KeyEntityId> {
        let key: Vec<String> = text.split(' ').map(str::to_string).collect();
        self.key_to_id.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyEntity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
