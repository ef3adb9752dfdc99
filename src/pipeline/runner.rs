//! Pipeline runner: orchestrates stage execution and artifact flow.
//!
//! The [`Extractor`] holds a statically-composed tagger and lemmatizer.
//! Calling [`Extractor::analyze`] turns a text into a [`Document`];
//! [`Extractor::extract`] goes one step further and resolves the document
//! against a [`Thesaurus`]. An optional [`PipelineObserver`] is notified at
//! each stage boundary.
//!
//! # Static dispatch
//!
//! `Extractor` is generic over its collaborators, so each tagger /
//! lemmatizer combination is monomorphized. Use [`ExtractorBuilder`] to swap
//! either one without spelling out the generics manually.

use crate::document::Document;
use crate::errors::Result;
use crate::nlp::stopwords::WordFilters;
use crate::nlp::tagger::{LexiconLemmatizer, LexiconTagger};
use crate::nlp::tokenizer::{normalize_text, Tokenizer};
use crate::pipeline::artifacts::{DescriptorResolution, ScoredDescriptor};
use crate::pipeline::observer::{
    trace_stage, NoopObserver, PipelineObserver, StageClock, StageReport, StageReportBuilder,
    STAGE_DESCRIPTORS, STAGE_LEMMATIZE, STAGE_TAG, STAGE_TOKENIZE,
};
use crate::pipeline::traits::{Lemmatizer, PosTagger};
use crate::thesaurus::Thesaurus;
use crate::types::SemtagConfig;

// ============================================================================
// Extractor: statically-composed pipeline
// ============================================================================

/// Text → key-entities → descriptors pipeline
///
/// | Param | Trait | Default impl |
/// |-------|-------|--------------|
/// | `T`   | [`PosTagger`] | [`LexiconTagger`] |
/// | `L`   | [`Lemmatizer`] | [`LexiconLemmatizer`] |
#[derive(Debug, Clone)]
pub struct Extractor<T = LexiconTagger, L = LexiconLemmatizer> {
    tagger: T,
    lemmatizer: L,
    filters: WordFilters,
    tokenizer: Tokenizer,
    config: SemtagConfig,
}

impl Extractor {
    /// Extractor with the lexicon collaborators (empty lexicons)
    pub fn with_config(config: SemtagConfig) -> Result<Self> {
        ExtractorBuilder::new().config(config).build()
    }
}

impl<T, L> Extractor<T, L>
where
    T: PosTagger,
    L: Lemmatizer,
{
    /// Validate `config` and compose an extractor
    pub fn new(tagger: T, lemmatizer: L, config: SemtagConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tagger,
            lemmatizer,
            filters: WordFilters::from_config(&config),
            tokenizer: Tokenizer::new(),
            config,
        })
    }

    pub fn config(&self) -> &SemtagConfig {
        &self.config
    }

    pub fn filters(&self) -> &WordFilters {
        &self.filters
    }

    /// Replace the word filters derived from the config
    pub fn with_filters(mut self, filters: WordFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Build the document of `text`
    pub fn analyze(&self, text: &str) -> Result<Document> {
        self.analyze_with_observer(text, &mut NoopObserver)
    }

    /// Build the document of `text`, reporting each stage to `observer`
    ///
    /// Stages run in order:
    /// 1. Tokenize (normalize, split, stopword / usual-word flags)
    /// 2. Tag
    /// 3. Lemmatize
    /// 4. Group, candidates, key-entities, dedup (see [`Document::build`])
    pub fn analyze_with_observer(
        &self,
        text: &str,
        observer: &mut impl PipelineObserver,
    ) -> Result<Document> {
        // Stage 1: Tokenize
        let mut tokens = {
            trace_stage!(STAGE_TOKENIZE);
            observer.on_stage_start(STAGE_TOKENIZE);
            let clock = StageClock::start();
            let mut tokens = self.tokenizer.tokenize(&normalize_text(text));
            self.filters.annotate(&mut tokens);
            let report = StageReportBuilder::new(clock.elapsed())
                .items(tokens.len())
                .build();
            observer.on_stage_end(STAGE_TOKENIZE, &report);
            tokens
        };

        // Stage 2: Tag
        {
            trace_stage!(STAGE_TAG);
            observer.on_stage_start(STAGE_TAG);
            let clock = StageClock::start();
            self.tagger.tag_all(&mut tokens);
            observer.on_stage_end(STAGE_TAG, &StageReport::new(clock.elapsed()));
        }

        // Stage 3: Lemmatize
        {
            trace_stage!(STAGE_LEMMATIZE);
            observer.on_stage_start(STAGE_LEMMATIZE);
            let clock = StageClock::start();
            for token in tokens.iter_mut() {
                self.lemmatizer.lemmatize(token);
            }
            observer.on_stage_end(STAGE_LEMMATIZE, &StageReport::new(clock.elapsed()));
        }
        observer.on_tokens(&tokens);

        let document = Document::build(tokens, &self.config, observer)?;
        observer.on_document(&document);
        Ok(document)
    }

    /// Descriptors of `text` scoring above the configured threshold, best
    /// first
    pub fn extract(&self, text: &str, thesaurus: &Thesaurus) -> Result<Vec<ScoredDescriptor>> {
        Ok(self
            .extract_with_observer(text, thesaurus, &mut NoopObserver)?
            .descriptors())
    }

    /// Full descriptor resolution of `text`, reporting each stage to
    /// `observer`
    pub fn extract_with_observer(
        &self,
        text: &str,
        thesaurus: &Thesaurus,
        observer: &mut impl PipelineObserver,
    ) -> Result<DescriptorResolution> {
        let document = self.analyze_with_observer(text, observer)?;
        Ok(self.resolve(&document, thesaurus, observer))
    }

    /// Resolve an already built document
    pub fn resolve(
        &self,
        document: &Document,
        thesaurus: &Thesaurus,
        observer: &mut impl PipelineObserver,
    ) -> DescriptorResolution {
        trace_stage!(STAGE_DESCRIPTORS);
        observer.on_stage_start(STAGE_DESCRIPTORS);
        let clock = StageClock::start();
        let resolution = document.resolve_descriptors(thesaurus, self.config.min_descriptor_score);
        let report = StageReportBuilder::new(clock.elapsed())
            .items(resolution.scores.len())
            .build();
        observer.on_stage_end(STAGE_DESCRIPTORS, &report);
        observer.on_resolution(&resolution);
        resolution
    }
}

// ============================================================================
// ExtractorBuilder: fluent construction with custom collaborators
// ============================================================================

/// Fluent builder for an [`Extractor`] with custom collaborators
///
/// ```
/// # use rapid_keyentities::pipeline::runner::ExtractorBuilder;
/// # use rapid_keyentities::nlp::tagger::LexiconTagger;
/// let extractor = ExtractorBuilder::new()
///     .tagger(LexiconTagger::from_entries([("loi", "SBC")]))
///     .build()
///     .unwrap();
/// ```
pub struct ExtractorBuilder<T = LexiconTagger, L = LexiconLemmatizer> {
    tagger: T,
    lemmatizer: L,
    filters: Option<WordFilters>,
    config: SemtagConfig,
}

impl ExtractorBuilder {
    /// Start from the lexicon collaborators and the default config
    pub fn new() -> Self {
        ExtractorBuilder {
            tagger: LexiconTagger::new(),
            lemmatizer: LexiconLemmatizer::new(),
            filters: None,
            config: SemtagConfig::default(),
        }
    }
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, L> ExtractorBuilder<T, L> {
    /// Override the tagger.
    pub fn tagger<U: PosTagger>(self, tagger: U) -> ExtractorBuilder<U, L> {
        ExtractorBuilder {
            tagger,
            lemmatizer: self.lemmatizer,
            filters: self.filters,
            config: self.config,
        }
    }

    /// Override the lemmatizer.
    pub fn lemmatizer<M: Lemmatizer>(self, lemmatizer: M) -> ExtractorBuilder<T, M> {
        ExtractorBuilder {
            tagger: self.tagger,
            lemmatizer,
            filters: self.filters,
            config: self.config,
        }
    }

    /// Override the word filters derived from the config.
    pub fn filters(mut self, filters: WordFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn config(mut self, config: SemtagConfig) -> Self {
        self.config = config;
        self
    }
}

impl<T: PosTagger, L: Lemmatizer> ExtractorBuilder<T, L> {
    /// Consume the builder and produce an [`Extractor`].
    pub fn build(self) -> Result<Extractor<T, L>> {
        let extractor = Extractor::new(self.tagger, self.lemmatizer, self.config)?;
        Ok(match self.filters {
            Some(filters) => extractor.with_filters(filters),
            None => extractor,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SemtagError;
    use crate::nlp::stopwords::StopwordFilter;
    use crate::pipeline::observer::{StageTimingObserver, ALL_STAGES};
    use crate::types::Token;

    const TEXT: &str = "Le droit d'auteur protège les œuvres. \
                        Le droit d'auteur concerne Internet. \
                        Internet change le droit d'auteur.";

    fn extractor() -> Extractor {
        let filters = WordFilters::new(
            StopwordFilter::from_list(&["le", "les", "de", "d", "la"]),
            StopwordFilter::empty(),
        );
        ExtractorBuilder::new()
            .lemmatizer(LexiconLemmatizer::from_entries([("œuvres", "œuvre")]))
            .filters(filters)
            .build()
            .unwrap()
    }

    fn thesaurus() -> Thesaurus {
        let mut thesaurus = Thesaurus::from_descriptors(["Propriété intellectuelle", "Internet"]);
        let property = thesaurus
            .descriptor_by_text("Propriété intellectuelle")
            .unwrap();
        let internet = thesaurus.descriptor_by_text("Internet").unwrap();

        let (t, _) = thesaurus.get_or_create_trigger("droit d' auteur");
        thesaurus.connect(t, property, 10.0);
        let (t, _) = thesaurus.get_or_create_trigger("Internet");
        thesaurus.connect(t, internet, 4.0);
        thesaurus
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = ExtractorBuilder::new()
            .config(SemtagConfig::default().with_ngram_lengths(5, 2))
            .build();
        assert!(matches!(result, Err(SemtagError::InvalidConfig(_))));
    }

    #[test]
    fn test_analyze_finds_phrase() {
        let doc = extractor().analyze(TEXT).unwrap();
        let texts: Vec<_> = doc.keyentities().map(|ke| ke.text()).collect();

        assert!(texts.contains(&"droit d' auteur"), "got {texts:?}");
        assert!(texts.contains(&"Internet"), "got {texts:?}");
    }

    #[test]
    fn test_extract_returns_descriptors_best_first() {
        let descriptors = extractor().extract(TEXT, &thesaurus()).unwrap();
        let texts: Vec<_> = descriptors.iter().map(|d| d.text.as_str()).collect();

        assert!(texts.contains(&"Propriété intellectuelle"));
        assert!(texts.contains(&"Internet"));
        for pair in descriptors.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for d in &descriptors {
            assert!(d.score > 1.0);
        }
    }

    #[test]
    fn test_scores_normalized_against_total() {
        let extractor = extractor();
        let doc = extractor.analyze(TEXT).unwrap();
        let resolution = extractor.resolve(&doc, &thesaurus(), &mut NoopObserver);

        let sum: f64 = resolution.scores.iter().map(|d| d.score).sum();
        assert!(sum > 0.0);
        assert!(sum <= 100.0 + 1e-9);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let extractor = extractor();
        let thesaurus = thesaurus();

        let keyentity_texts = |doc: &Document| -> Vec<String> {
            doc.keyentities().map(|ke| ke.text().to_string()).collect()
        };
        let first = extractor.analyze(TEXT).unwrap();
        let second = extractor.analyze(TEXT).unwrap();
        assert!(!keyentity_texts(&first).is_empty());
        assert_eq!(keyentity_texts(&first), keyentity_texts(&second));

        let first = extractor.extract(TEXT, &thesaurus).unwrap();
        let second = extractor.extract(TEXT, &thesaurus).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_without_triggers_is_empty() {
        let thesaurus = Thesaurus::from_descriptors(["Internet"]);
        let descriptors = extractor().extract(TEXT, &thesaurus).unwrap();
        assert!(descriptors.is_empty());
        assert_eq!(thesaurus.num_triggers(), 0);
    }

    #[test]
    fn test_extract_empty_text() {
        let descriptors = extractor().extract("", &thesaurus()).unwrap();
        assert!(descriptors.is_empty());
    }

    #[test]
    fn test_extract_with_timing_observer() {
        let mut obs = StageTimingObserver::new();
        extractor()
            .extract_with_observer(TEXT, &thesaurus(), &mut obs)
            .unwrap();

        let stage_names: Vec<&str> = obs.reports().iter().map(|(name, _)| *name).collect();
        assert_eq!(stage_names, ALL_STAGES.to_vec());
        assert!(obs.report(STAGE_TOKENIZE).unwrap().items().unwrap() > 0);
    }

    /// Custom observer that records artifact callbacks.
    #[derive(Default)]
    struct ArtifactObserver {
        saw_tokens: bool,
        saw_document: bool,
        saw_resolution: bool,
        tagged: bool,
    }

    impl PipelineObserver for ArtifactObserver {
        fn on_tokens(&mut self, tokens: &[Token]) {
            self.saw_tokens = true;
            self.tagged = tokens.iter().all(|t| !t.tag.is_empty());
        }
        fn on_document(&mut self, _document: &Document) {
            self.saw_document = true;
        }
        fn on_resolution(&mut self, _resolution: &DescriptorResolution) {
            self.saw_resolution = true;
        }
    }

    #[test]
    fn test_calls_all_artifact_observers() {
        let mut obs = ArtifactObserver::default();
        extractor()
            .extract_with_observer(TEXT, &thesaurus(), &mut obs)
            .unwrap();

        assert!(obs.saw_tokens, "on_tokens not called");
        assert!(obs.tagged, "tokens reached observer untagged");
        assert!(obs.saw_document, "on_document not called");
        assert!(obs.saw_resolution, "on_resolution not called");
    }
}
