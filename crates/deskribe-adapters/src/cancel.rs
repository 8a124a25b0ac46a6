//! Cooperative cancellation for adapter operations.
//!
//! The engine is synchronous, so cancellation is a shared atomic flag
//! rather than a task handle. The engine checks the token before every
//! adapter invocation; adapters are expected to check it at their own
//! suspension points. Cancellation never rolls back committed side effects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::AdapterError;

/// Cloneable cancellation flag shared between a caller and the engine.
///
/// # Example
///
/// ```
/// use deskribe_adapters::CancelToken;
///
/// let token = CancelToken::new();
/// assert!(token.ensure_active().is_ok());
/// token.cancel();
/// assert!(token.ensure_active().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the active state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. All clones observe the request.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with [`AdapterError::Cancelled`] once cancellation is
    /// requested.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Cancelled`] when the token has been
    /// cancelled.
    pub fn ensure_active(&self) -> Result<(), AdapterError> {
        if self.is_cancelled() {
            Err(AdapterError::Cancelled)
        } else {
            Ok(())
        }
    }
}
