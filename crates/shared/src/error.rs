//! Configuration error types.

use thiserror::Error;

/// Result type alias using `ConfigError`.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A policy value is outside its accepted range.
    #[error("Invalid policy value for {field}: {reason}")]
    InvalidPolicy {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An engine setting is outside its accepted range.
    #[error("Invalid engine setting for {field}: {reason}")]
    InvalidSetting {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Returns the error code for diagnostics.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Load(_) => "CONFIG_LOAD_ERROR",
            Self::InvalidPolicy { .. } => "INVALID_POLICY",
            Self::InvalidSetting { .. } => "INVALID_SETTING",
        }
    }
}
