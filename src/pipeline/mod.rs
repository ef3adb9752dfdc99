//! Extraction pipeline
//!
//! Collaborator traits, stage observers, output artifacts and the
//! [`Extractor`](runner::Extractor) that runs a text through every stage.

pub mod artifacts;
pub mod observer;
pub mod runner;
pub mod traits;
