//! Domain errors raised while loading configuration documents.
//!
//! All errors use `thiserror`-derived enums with structured context so
//! callers can inspect the failure programmatically. Every variant names the
//! file it originated from; loader failures are fatal for the current
//! command.

use std::path::PathBuf;

use thiserror::Error;

/// Errors arising from loading and decoding Deskribe input documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required input file does not exist.
    #[error("required configuration file '{}' is missing", path.display())]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The file could not be read for a reason other than absence.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not syntactically valid JSON.
    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        /// Path of the malformed document.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but does not match the expected shape.
    #[error("invalid configuration in '{}': {message}", path.display())]
    Schema {
        /// Path of the offending document.
        path: PathBuf,
        /// Description of the shape violation.
        message: String,
    },

    /// A manifest resource carried a `type` tag outside the recognised set.
    #[error("unknown resource type '{resource_type}' in '{}' (resource {index})", path.display())]
    UnknownResourceType {
        /// The offending tag value.
        resource_type: String,
        /// Path of the manifest.
        path: PathBuf,
        /// Zero-based position of the resource in the manifest.
        index: usize,
    },
}

impl ConfigError {
    /// Builds a schema error for the given document.
    #[must_use]
    pub fn schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }
}
