//! Errors raised at the adapter boundary.

use thiserror::Error;

/// Failures surfaced by adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The operation observed a cancellation request and aborted.
    #[error("operation cancelled")]
    Cancelled,

    /// The adapter failed to complete an operation.
    #[error("adapter '{name}' failed: {message}")]
    Operation {
        /// Adapter name.
        name: String,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying error reported by the driver.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AdapterError {
    /// Builds an operation failure without an underlying source.
    #[must_use]
    pub fn operation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Builds an operation failure that wraps an underlying source.
    #[must_use]
    pub fn operation_with_source(
        name: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Operation {
            name: name.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }
}
