//! Error types for rapid_keyentities

use std::path::PathBuf;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, SemtagError>;

/// Errors raised by extraction, training and persistence
#[derive(Debug, thiserror::Error)]
pub enum SemtagError {
    /// Two key-entities were ranked against each other although neither
    /// contains the other.
    #[error("key-entities '{left}' and '{right}' are not in a containment relation")]
    InvalidComparison { left: String, right: String },

    /// Configuration rejected by [`crate::types::SemtagConfig::validate`].
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A persisted trigger line could not be parsed.
    #[error("malformed trigger at {path}:{line}: {reason}")]
    MalformedTrigger {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl SemtagError {
    /// Build an [`SemtagError::InvalidConfig`] from any message
    pub fn invalid_config(message: impl Into<String>) -> Self {
        SemtagError::InvalidConfig(message.into())
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SemtagError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_comparison_message() {
        let err = SemtagError::InvalidComparison {
            left: "Culture".to_string(),
            right: "loi Création".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Culture"));
        assert!(msg.contains("loi Création"));
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = SemtagError::io(
            "corpus/triggers.trg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("corpus/triggers.trg"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
