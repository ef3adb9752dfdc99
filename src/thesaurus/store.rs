//! Flat-file persistence of the thesaurus
//!
//! Descriptor catalogs are plain text, one descriptor per line (`#` starts a
//! comment). Triggers are stored one JSON object per line:
//!
//! ```text
//! {"trigger":"droit d' auteur","descriptors":[["Culture",12.5],["Internet",3.0]]}
//! ```

use super::{Thesaurus, TriggerId};
use crate::errors::{Result, SemtagError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One persisted trigger with its edges, heaviest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub trigger: String,
    pub descriptors: Vec<(String, f64)>,
}

impl TriggerRecord {
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl Thesaurus {
    /// Record of a trigger, `None` when it has no edge
    pub fn trigger_record(&self, id: TriggerId) -> Option<TriggerRecord> {
        let trigger = self.trigger(id);
        if trigger.is_empty() {
            return None;
        }

        Some(TriggerRecord {
            trigger: trigger.text().to_string(),
            descriptors: trigger
                .connections()
                .into_iter()
                .map(|(d, w)| (self.descriptor(d).text().to_string(), w))
                .collect(),
        })
    }

    /// Add the descriptors listed in a catalog file, returning how many were
    /// new
    pub fn load_descriptors(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SemtagError::io(path, e))?;

        let mut created = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if self.get_or_create_descriptor(line).1 {
                created += 1;
            }
        }

        tracing::info!(path = %path.display(), created, "loaded descriptors");
        Ok(created)
    }

    /// Merge the triggers of an export file into this thesaurus, returning
    /// how many trigger lines were read
    ///
    /// Descriptors missing from the catalog are added. Weights are added to
    /// existing edges.
    pub fn load_triggers(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SemtagError::io(path, e))?;

        let mut loaded = 0;
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let record = TriggerRecord::from_line(line).map_err(|e| {
                SemtagError::MalformedTrigger {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                    reason: e.to_string(),
                }
            })?;
            if record.trigger.trim().is_empty() {
                return Err(SemtagError::MalformedTrigger {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                    reason: "empty trigger text".to_string(),
                });
            }

            let (trigger, _) = self.get_or_create_trigger(&record.trigger);
            for (descriptor, weight) in &record.descriptors {
                let (descriptor, created) = self.get_or_create_descriptor(descriptor);
                if created {
                    tracing::warn!(
                        descriptor = %self.descriptor(descriptor).text(),
                        "trigger file references an unknown descriptor"
                    );
                }
                self.connect(trigger, descriptor, *weight);
            }
            loaded += 1;
        }

        tracing::info!(path = %path.display(), loaded, "loaded triggers");
        Ok(loaded)
    }

    /// Clean every trigger and write the non-empty ones to `path`, creating
    /// its parent directory; returns the number of lines written
    pub fn write_triggers(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let dropped = self.clean_connections();
        tracing::debug!(dropped, "cleaned trigger connections");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SemtagError::io(parent, e))?;
        }

        let file = fs::File::create(path).map_err(|e| SemtagError::io(path, e))?;
        let mut writer = BufWriter::new(file);

        let mut written = 0;
        for trigger in self.triggers() {
            if let Some(record) = self.trigger_record(trigger.id()) {
                writeln!(writer, "{}", record.to_line()?).map_err(|e| SemtagError::io(path, e))?;
                written += 1;
            }
        }
        writer.flush().map_err(|e| SemtagError::io(path, e))?;

        tracing::info!(path = %path.display(), written, "exported triggers");
        Ok(written)
    }
}
