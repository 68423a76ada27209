//! Extension hooks.
//!
//! Inter-company, tax, workflow and document series checks have a reserved
//! place at the end of the pipeline. Until a deployment plugs in its own
//! `Rule` for one of them, the hook reports nothing.

use async_trait::async_trait;
use tracing::trace;

use super::{Phase, Rule, RuleContext};
use crate::pipeline::ValidationFault;
use crate::result::RuleOutcome;

/// A rule that reports nothing.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionHook {
    phase: Phase,
}

impl ExtensionHook {
    /// Creates a hook for `phase`.
    #[must_use]
    pub const fn new(phase: Phase) -> Self {
        Self { phase }
    }
}

#[async_trait]
impl Rule for ExtensionHook {
    fn phase(&self) -> Phase {
        self.phase
    }

    async fn check(&self, _ctx: &RuleContext<'_>) -> Result<RuleOutcome, ValidationFault> {
        trace!(phase = %self.phase, "Extension hook has no checks");
        Ok(RuleOutcome::default())
    }
}
