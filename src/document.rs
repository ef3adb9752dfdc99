//! Documents
//!
//! A [`Document`] owns everything extracted from one text: its tokens, the
//! lemma groups and key-entities registries, and the deduplicated
//! key-entities. It is built once by [`Document::build`] and is read-only
//! afterwards.

use crate::errors::Result;
use crate::pipeline::artifacts::DescriptorResolution;
use crate::pipeline::observer::{
    trace_stage, PipelineObserver, StageClock, StageReportBuilder, STAGE_CANDIDATES, STAGE_DEDUP,
    STAGE_GROUP, STAGE_KEYENTITIES,
};
use crate::phrase::dedup::deduplicate;
use crate::phrase::keyentity::{KeyEntity, KeyEntityId, KeyEntityRegistry, ScoringContext};
use crate::phrase::lemma_group::{LemmaGroupId, LemmaGroupRegistry};
use crate::phrase::ngrams::{frequent_groups, NgramConfig, NgramGenerator};
use crate::thesaurus::{DescriptorId, Thesaurus};
use crate::types::{SemtagConfig, Token};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Word statistics, computed once per document
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DocumentStats {
    pub words_count: usize,
    pub meaning_words_count: usize,
    pub distinct_words_count: usize,
    /// Words per distinct surface form, 0 for an empty document
    pub lexical_diversity: f64,
}

impl DocumentStats {
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let words_count = tokens.len();
        let meaning_words_count = tokens.iter().filter(|t| t.has_meaning()).count();
        let distinct_words_count = tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<FxHashSet<_>>()
            .len();
        let lexical_diversity = if distinct_words_count == 0 {
            0.0
        } else {
            words_count as f64 / distinct_words_count as f64
        };

        Self {
            words_count,
            meaning_words_count,
            distinct_words_count,
            lexical_diversity,
        }
    }
}

/// One extracted text
#[derive(Debug)]
pub struct Document {
    tokens: Vec<Token>,
    stats: DocumentStats,
    groups: LemmaGroupRegistry,
    keyentities: KeyEntityRegistry,
    /// Working set before deduplication, in candidate order
    candidates: Vec<KeyEntityId>,
    /// Deduplicated key-entities, in candidate order
    survivors: Vec<KeyEntityId>,
}

impl Document {
    /// Build a document from tagged and lemmatized tokens
    ///
    /// Runs the grouping, candidate, key-entity and deduplication stages,
    /// notifying `observer` at each boundary.
    pub fn build(
        tokens: Vec<Token>,
        config: &SemtagConfig,
        observer: &mut impl PipelineObserver,
    ) -> Result<Self> {
        let stats = DocumentStats::from_tokens(&tokens);

        // Stage: group by (lemma, coarse tag)
        let groups = {
            trace_stage!(STAGE_GROUP);
            observer.on_stage_start(STAGE_GROUP);
            let clock = StageClock::start();
            let groups = LemmaGroupRegistry::from_tokens(&tokens);
            let report = StageReportBuilder::new(clock.elapsed())
                .items(groups.len())
                .build();
            observer.on_stage_end(STAGE_GROUP, &report);
            groups
        };

        // Stage: n-grams and single-word candidates
        let (ngrams, singles) = {
            trace_stage!(STAGE_CANDIDATES);
            observer.on_stage_start(STAGE_CANDIDATES);
            let clock = StageClock::start();
            let ngrams =
                NgramGenerator::with_config(NgramConfig::from(config)).generate(&tokens, &groups);
            let singles = frequent_groups(&tokens, &groups, stats.lexical_diversity);
            let report = StageReportBuilder::new(clock.elapsed())
                .items(ngrams.len() + singles.len())
                .build();
            observer.on_stage_end(STAGE_CANDIDATES, &report);
            (ngrams, singles)
        };

        // Stage: key-entities
        let (keyentities, candidates) = {
            trace_stage!(STAGE_KEYENTITIES);
            observer.on_stage_start(STAGE_KEYENTITIES);
            let clock = StageClock::start();

            let ctx = ScoringContext {
                tokens: &tokens,
                groups: &groups,
                words_count: stats.words_count,
            };
            let mut keyentities = KeyEntityRegistry::new();
            let mut candidates = Vec::with_capacity(ngrams.len() + singles.len());
            let mut seen: FxHashSet<KeyEntityId> = FxHashSet::default();

            for ngram in ngrams {
                let (id, _) = keyentities.get_or_create(ngram.groups, ngram.count, &ctx);
                if seen.insert(id) {
                    candidates.push(id);
                }
            }
            for group in singles {
                let count = groups.get(group).count();
                let (id, _) = keyentities.get_or_create(vec![group], count, &ctx);
                if seen.insert(id) {
                    candidates.push(id);
                }
            }

            let report = StageReportBuilder::new(clock.elapsed())
                .items(candidates.len())
                .build();
            observer.on_stage_end(STAGE_KEYENTITIES, &report);
            (keyentities, candidates)
        };

        // Stage: deduplication
        let survivors = {
            trace_stage!(STAGE_DEDUP);
            observer.on_stage_start(STAGE_DEDUP);
            let clock = StageClock::start();
            let survivors = deduplicate(&keyentities, &candidates)?;
            let report = StageReportBuilder::new(clock.elapsed())
                .items(survivors.len())
                .dropped(candidates.len() - survivors.len())
                .build();
            observer.on_stage_end(STAGE_DEDUP, &report);
            survivors
        };

        tracing::debug!(
            words = stats.words_count,
            groups = groups.len(),
            candidates = candidates.len(),
            keyentities = survivors.len(),
            "document built"
        );

        Ok(Self {
            tokens,
            stats,
            groups,
            keyentities,
            candidates,
            survivors,
        })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn stats(&self) -> &DocumentStats {
        &self.stats
    }

    pub fn words_count(&self) -> usize {
        self.stats.words_count
    }

    pub fn distinct_words_count(&self) -> usize {
        self.stats.distinct_words_count
    }

    pub fn lexical_diversity(&self) -> f64 {
        self.stats.lexical_diversity
    }

    pub fn groups(&self) -> &LemmaGroupRegistry {
        &self.groups
    }

    /// Every key-entity created, deduplicated or not
    pub fn keyentity_registry(&self) -> &KeyEntityRegistry {
        &self.keyentities
    }

    /// Candidates before deduplication
    pub fn candidates(&self) -> impl Iterator<Item = &KeyEntity> {
        self.candidates.iter().map(|&id| self.keyentities.get(id))
    }

    /// Deduplicated key-entities
    pub fn keyentities(&self) -> impl Iterator<Item = &KeyEntity> {
        self.survivors.iter().map(|&id| self.keyentities.get(id))
    }

    /// Deduplicated key-entity by text
    pub fn keyentity(&self, text: &str) -> Option<&KeyEntity> {
        self.keyentities
            .find(text)
            .filter(|id| self.survivors.contains(id))
            .map(|id| self.keyentities.get(id))
    }

    /// The `top_n` key-entities with the highest trigger score
    pub fn keyentities_for_trainer(&self, top_n: usize) -> Vec<&KeyEntity> {
        ranked(self.keyentities(), top_n, KeyEntity::trigger_score)
    }

    /// Score the descriptors reachable from this document's key-entities
    ///
    /// Every key-entity adds its trigger score to the total. Those matching
    /// a known trigger also push that score, scaled by each edge weight over
    /// the trigger's heaviest edge, onto the descriptors the trigger points
    /// to. Non-positive edges are ignored. The thesaurus is not modified.
    pub fn resolve_descriptors(&self, thesaurus: &Thesaurus, min_score: f64) -> DescriptorResolution {
        let mut raw: FxHashMap<DescriptorId, f64> = FxHashMap::default();
        let mut order: Vec<DescriptorId> = Vec::new();
        let mut total_score = 0.0;

        for keyentity in self.keyentities() {
            let score = keyentity.trigger_score();
            total_score += score;

            let Some(trigger_id) = thesaurus.trigger_by_text(keyentity.text()) else {
                continue;
            };
            let trigger = thesaurus.trigger(trigger_id);
            let max_score = trigger.max_score();
            if max_score <= 0.0 {
                continue;
            }

            for (descriptor, weight) in trigger.connections() {
                if weight <= 0.0 {
                    continue;
                }
                let entry = raw.entry(descriptor).or_insert_with(|| {
                    order.push(descriptor);
                    0.0
                });
                *entry += weight / max_score * score;
            }
        }

        let scored = order
            .into_iter()
            .map(|d| (d, thesaurus.descriptor(d).text().to_string(), raw[&d]))
            .collect();
        DescriptorResolution::from_raw_scores(scored, total_score, min_score)
    }

    /// Diagnostic summary of the document
    pub fn report(&self, top_n: usize) -> DocumentReport {
        let frequent_groups = frequent_groups(&self.tokens, &self.groups, self.stats.lexical_diversity)
            .into_iter()
            .take(top_n)
            .map(|g| {
                let group = self.groups.get(g);
                (group.text(&self.tokens).to_string(), group.count())
            })
            .collect();

        let ranking = |metric: &'static str, score: fn(&KeyEntity) -> f64| Ranking {
            metric,
            entries: ranked(self.keyentities(), top_n, score)
                .into_iter()
                .map(|ke| (ke.text().to_string(), score(ke)))
                .collect(),
        };

        DocumentReport {
            stats: self.stats,
            frequent_groups,
            rankings: vec![
                ranking("confidence", KeyEntity::confidence),
                ranking("keyconcept_confidence", KeyEntity::keyconcept_confidence),
                ranking("statistical_mutual_information", |ke| {
                    ke.confidences().statistical_mutual_information
                }),
                ranking("pos", |ke| ke.confidences().pos),
                ranking("frequency_relative_pmi", KeyEntity::frequency_relative_pmi),
                ranking("trigger_score", KeyEntity::trigger_score),
            ],
        }
    }

    /// Lemma group of a token
    pub fn group_of(&self, token_idx: usize) -> LemmaGroupId {
        self.groups.group_of(token_idx)
    }
}

/// Best `top_n` entities by `score`, ties kept in iteration order
fn ranked<'a>(
    entities: impl Iterator<Item = &'a KeyEntity>,
    top_n: usize,
    score: impl Fn(&KeyEntity) -> f64,
) -> Vec<&'a KeyEntity> {
    let mut entities: Vec<&KeyEntity> = entities.collect();
    entities.sort_by(|a, b| score(*b).total_cmp(&score(*a)));
    entities.truncate(top_n);
    entities
}

/// Key-entities ranked by one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub metric: &'static str,
    pub entries: Vec<(String, f64)>,
}

/// Serializable diagnostic view of a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub stats: DocumentStats,
    /// Lemma groups interesting alone, with their counts
    pub frequent_groups: Vec<(String, usize)>,
    pub rankings: Vec<Ranking>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::observer::{NoopObserver, StageTimingObserver};

    fn word(text: &str, tag: &str, sent: usize, pos: usize, idx: usize) -> Token {
        Token::tagged(text, text.to_lowercase(), tag, sent, pos, idx)
    }

    fn stop(text: &str, sent: usize, pos: usize, idx: usize) -> Token {
        Token::tagged(text, text, "MOT", sent, pos, idx).with_stopword(true)
    }

    /// s0: droit de auteur protège œuvre
    /// s1: droit de auteur concerne œuvre
    /// s2: Internet
    fn make_tokens() -> Vec<Token> {
        vec![
            word("droit", "SBC", 0, 0, 0),
            stop("de", 0, 1, 1),
            word("auteur", "SBC", 0, 2, 2),
            word("protège", "VCJ", 0, 3, 3),
            word("œuvre", "SBC", 0, 4, 4),
            word("droit", "SBC", 1, 0, 5),
            stop("de", 1, 1, 6),
            word("auteur", "SBC", 1, 2, 7),
            word("concerne", "VCJ", 1, 3, 8),
            word("œuvre", "SBC", 1, 4, 9),
            word("Internet", "SBP", 2, 0, 10),
        ]
    }

    fn build() -> Document {
        Document::build(make_tokens(), &SemtagConfig::default(), &mut NoopObserver).unwrap()
    }

    #[test]
    fn test_stats() {
        let doc = build();
        assert_eq!(doc.words_count(), 11);
        assert_eq!(doc.stats().meaning_words_count, 9);
        assert_eq!(doc.distinct_words_count(), 7);
        assert!((doc.lexical_diversity() - 11.0 / 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::build(Vec::new(), &SemtagConfig::default(), &mut NoopObserver).unwrap();
        assert_eq!(doc.words_count(), 0);
        assert!((doc.lexical_diversity()).abs() < 1e-10);
        assert_eq!(doc.keyentities().count(), 0);

        let resolution = doc.resolve_descriptors(&Thesaurus::new(), 1.0);
        assert!(resolution.is_empty());
    }

    #[test]
    fn test_phrase_survives_dedup() {
        let doc = build();
        let texts: Vec<_> = doc.keyentities().map(|ke| ke.text()).collect();

        assert!(texts.contains(&"droit de auteur"));
        assert!(texts.contains(&"Internet"));
        // always inside the phrase, so absorbed by it
        assert!(!texts.contains(&"auteur"));
    }

    #[test]
    fn test_candidates_unique() {
        let doc = build();
        let mut texts: Vec<_> = doc.candidates().map(|ke| ke.text()).collect();
        let before = texts.len();
        texts.sort_unstable();
        texts.dedup();
        assert_eq!(texts.len(), before);
        assert!(doc.candidates().count() >= doc.keyentities().count());
    }

    #[test]
    fn test_observer_sees_document_stages() {
        let mut obs = StageTimingObserver::new();
        Document::build(make_tokens(), &SemtagConfig::default(), &mut obs).unwrap();

        let names: Vec<&str> = obs.reports().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![STAGE_GROUP, STAGE_CANDIDATES, STAGE_KEYENTITIES, STAGE_DEDUP]
        );
        assert!(obs.report(STAGE_DEDUP).unwrap().dropped().is_some());
    }

    #[test]
    fn test_resolve_descriptors_normalizes() {
        let doc = build();
        let mut thesaurus = Thesaurus::from_descriptors(["Culture", "Internet"]);
        let culture = thesaurus.descriptor_by_text("Culture").unwrap();
        let internet = thesaurus.descriptor_by_text("Internet").unwrap();

        let (t, _) = thesaurus.get_or_create_trigger("droit de auteur");
        thesaurus.connect(t, culture, 4.0);
        thesaurus.connect(t, internet, 2.0);

        let resolution = doc.resolve_descriptors(&thesaurus, 1.0);
        let phrase = doc.keyentity("droit de auteur").unwrap();
        let total: f64 = doc.keyentities().map(|ke| ke.trigger_score()).sum();

        assert!((resolution.total_score - total).abs() < 1e-10);
        let expected_culture = phrase.trigger_score() / total * 100.0;
        let expected_internet = 0.5 * phrase.trigger_score() / total * 100.0;
        assert!((resolution.score_of("Culture").unwrap() - expected_culture).abs() < 1e-10);
        assert!((resolution.score_of("Internet").unwrap() - expected_internet).abs() < 1e-10);
        assert_eq!(resolution.scores[0].text, "Culture");
    }

    #[test]
    fn test_resolve_ignores_negative_edges() {
        let doc = build();
        let mut thesaurus = Thesaurus::from_descriptors(["Culture", "Internet"]);
        let culture = thesaurus.descriptor_by_text("Culture").unwrap();
        let internet = thesaurus.descriptor_by_text("Internet").unwrap();

        let (t, _) = thesaurus.get_or_create_trigger("Internet");
        thesaurus.connect(t, internet, 1.0);
        thesaurus.connect(t, culture, -3.0);

        let resolution = doc.resolve_descriptors(&thesaurus, 1.0);
        assert!(resolution.score_of("Internet").is_some());
        assert!(resolution.score_of("Culture").is_none());
    }

    #[test]
    fn test_resolve_does_not_touch_thesaurus() {
        let doc = build();
        let thesaurus = Thesaurus::from_descriptors(["Culture"]);
        let resolution = doc.resolve_descriptors(&thesaurus, 1.0);

        assert!(resolution.is_empty());
        assert_eq!(thesaurus.num_triggers(), 0);
    }

    #[test]
    fn test_keyentities_for_trainer() {
        let doc = build();
        let top = doc.keyentities_for_trainer(2);
        assert!(top.len() <= 2);
        if top.len() == 2 {
            assert!(top[0].trigger_score() >= top[1].trigger_score());
        }
        assert_eq!(doc.keyentities_for_trainer(100).len(), doc.keyentities().count());
    }

    #[test]
    fn test_report() {
        let doc = build();
        let report = doc.report(5);

        assert_eq!(report.stats.words_count, 11);
        assert_eq!(report.rankings.len(), 6);
        for ranking in &report.rankings {
            assert!(ranking.entries.len() <= 5);
            for pair in ranking.entries.windows(2) {
                assert!(pair[0].1 >= pair[1].1);
            }
        }

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("trigger_score"));
    }
}
