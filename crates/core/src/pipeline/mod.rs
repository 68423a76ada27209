//! Validation pipeline.
//!
//! The balance phase runs first. The remaining phases run concurrently and
//! their findings are merged in phase order, so the result does not depend on
//! which store call returns first. Any fault (malformed context, invalid
//! policy, store failure, timeout, cancellation) replaces the whole result with
//! one `SYSTEM_VALIDATION_ERROR`.

pub mod clock;
pub mod error;
pub mod validator;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ValidationFault;
pub use validator::GlValidator;
