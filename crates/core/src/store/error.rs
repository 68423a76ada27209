//! Ledger store error types.

use thiserror::Error;

/// Errors raised by a ledger store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The call did not complete within the configured timeout.
    #[error("Ledger store call {operation} timed out after {after_ms} ms")]
    Timeout {
        /// The store operation.
        operation: &'static str,
        /// The timeout that elapsed.
        after_ms: u64,
    },

    /// The store could not be reached.
    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with an error.
    #[error("Ledger store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the error code for diagnostics.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "STORE_TIMEOUT",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
            Self::Backend(_) => "STORE_ERROR",
        }
    }

    /// Returns true if this error is transient and the call may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable(_))
    }
}
