//! # rapid_keyentities
//!
//! Key-entity extraction and trainable descriptor association.
//!
//! A text is split into tagged, lemmatized tokens; tokens sharing a lemma
//! and a coarse tag form lemma groups; contiguous runs of groups become
//! candidate key-entities, each scored by frequency, title, part-of-speech
//! and mutual-information confidences. Overlapping candidates are
//! deduplicated, and the survivors are mapped onto a controlled vocabulary
//! through a weighted trigger → descriptor graph that
//! [`SemanticalTrainer`] learns from human labels.
//!
//! ```
//! use rapid_keyentities::{Extractor, SemtagConfig, Thesaurus};
//!
//! let extractor = Extractor::with_config(SemtagConfig::default()).unwrap();
//! let thesaurus = Thesaurus::from_descriptors(["Culture"]);
//! let descriptors = extractor
//!     .extract("Le ministère de la Culture publie un rapport.", &thesaurus)
//!     .unwrap();
//! assert!(descriptors.is_empty());
//! ```

pub mod document;
pub mod errors;
pub mod nlp;
pub mod phrase;
pub mod pipeline;
pub mod thesaurus;
pub mod trainer;
pub mod types;

pub use document::{Document, DocumentReport};
pub use errors::{Result, SemtagError};
pub use phrase::keyentity::{Confidences, KeyEntity, KeyEntityId};
pub use phrase::lemma_group::{LemmaGroup, LemmaGroupId};
pub use pipeline::artifacts::{DescriptorResolution, ScoredDescriptor};
pub use pipeline::runner::{Extractor, ExtractorBuilder};
pub use thesaurus::{Descriptor, DescriptorId, Thesaurus, Trigger, TriggerId};
pub use trainer::{SemanticalTrainer, TrainingReport};
pub use types::{Category, SemtagConfig, Token};
