//! Pipeline observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. Use cases include timing stages, capturing intermediate
//! artifacts for debugging, and emitting structured telemetry.

use crate::document::Document;
use crate::pipeline::artifacts::DescriptorResolution;
use crate::types::Token;
use std::time::{Duration, Instant};

pub const STAGE_TOKENIZE: &str = "tokenize";
pub const STAGE_TAG: &str = "tag";
pub const STAGE_LEMMATIZE: &str = "lemmatize";
pub const STAGE_GROUP: &str = "group";
pub const STAGE_CANDIDATES: &str = "candidates";
pub const STAGE_KEYENTITIES: &str = "keyentities";
pub const STAGE_DEDUP: &str = "dedup";
pub const STAGE_DESCRIPTORS: &str = "descriptors";

/// Every stage, in execution order
pub const ALL_STAGES: [&str; 8] = [
    STAGE_TOKENIZE,
    STAGE_TAG,
    STAGE_LEMMATIZE,
    STAGE_GROUP,
    STAGE_CANDIDATES,
    STAGE_KEYENTITIES,
    STAGE_DEDUP,
    STAGE_DESCRIPTORS,
];

/// Enter a tracing span for a pipeline stage, held until the end of the
/// enclosing block.
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("pipeline_stage", stage = $name).entered();
    };
}

pub(crate) use trace_stage;

/// Wall-clock timer for one stage
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    start: Instant,
}

impl StageClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// What a stage reports when it ends
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    elapsed: Duration,
    /// Items produced by the stage (tokens, groups, candidates, ...)
    items: Option<usize>,
    /// Items the stage discarded
    dropped: Option<usize>,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Self::default()
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn items(&self) -> Option<usize> {
        self.items
    }

    pub fn dropped(&self) -> Option<usize> {
        self.dropped
    }
}

/// Fluent construction of a [`StageReport`] carrying stage metrics
#[derive(Debug, Clone)]
pub struct StageReportBuilder {
    report: StageReport,
}

impl StageReportBuilder {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            report: StageReport::new(elapsed),
        }
    }

    pub fn items(mut self, items: usize) -> Self {
        self.report.items = Some(items);
        self
    }

    pub fn dropped(mut self, dropped: usize) -> Self {
        self.report.dropped = Some(dropped);
        self
    }

    pub fn build(self) -> StageReport {
        self.report
    }
}

/// Receives callbacks while a document goes through the pipeline
///
/// Every method has an empty default, so implementors only override what
/// they need.
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    /// Tokens after tagging and lemmatization
    fn on_tokens(&mut self, _tokens: &[Token]) {}

    /// Fully built document, key-entities deduplicated
    fn on_document(&mut self, _document: &Document) {}

    fn on_resolution(&mut self, _resolution: &DescriptorResolution) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Observer collecting the report of every stage, in order
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    /// Report of a stage, if it ran
    pub fn report(&self, stage: &str) -> Option<&StageReport> {
        self.reports
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, report)| report)
    }

    /// Sum of all stage durations
    pub fn total(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed()).sum()
    }
}

impl PipelineObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        tracing::debug!(stage, elapsed_us = report.elapsed().as_micros() as u64, "stage done");
        self.reports.push((stage, report.clone()));
    }
}
