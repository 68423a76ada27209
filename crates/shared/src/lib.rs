//! Shared identifiers, errors, and configuration for glcheck.
//!
//! This crate provides common types used across all other crates:
//! - Typed names for type-safe references to ledger master data
//! - Validation policy groups (`ErpValidationConfig`)
//! - Engine settings (caching, store timeouts, retries)
//! - Configuration error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, EngineSettings, ErpValidationConfig};
pub use error::{ConfigError, ConfigResult};
