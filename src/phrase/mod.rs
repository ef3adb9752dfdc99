//! Phrase extraction components
//!
//! This module provides lemma grouping, n-gram candidate generation,
//! key-entity scoring and the deduplication pass.

pub mod dedup;
pub mod keyentity;
pub mod lemma_group;
pub mod ngrams;
