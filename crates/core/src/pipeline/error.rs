//! Pipeline fault types.
//!
//! A fault means the voucher could not be validated at all. Faults never reach
//! the caller as `Err`; the validator turns them into a single
//! `SYSTEM_VALIDATION_ERROR` result.

use glcheck_shared::ConfigError;
use thiserror::Error;

use crate::store::StoreError;

/// Reasons a validation run could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFault {
    /// The context is missing data no rule can work without.
    #[error("Malformed voucher context: {0}")]
    MalformedContext(String),

    /// The policy passed for this run is out of range.
    #[error("Invalid validation policy: {0}")]
    InvalidPolicy(String),

    /// The ledger store failed or timed out.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A sum or ratio of amounts left the range of `Decimal`.
    #[error("Amount out of range: {0}")]
    AmountOverflow(String),

    /// The caller cancelled the run.
    #[error("Validation was cancelled")]
    Cancelled,
}

impl ValidationFault {
    /// Returns the error code for diagnostics.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedContext(_) => "MALFORMED_CONTEXT",
            Self::InvalidPolicy(_) => "INVALID_POLICY",
            Self::Store(err) => err.error_code(),
            Self::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl From<ConfigError> for ValidationFault {
    fn from(err: ConfigError) -> Self {
        Self::InvalidPolicy(err.to_string())
    }
}
