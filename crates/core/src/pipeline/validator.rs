//! The GL entry validator.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use glcheck_shared::{AppConfig, EngineSettings, ErpValidationConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::clock::{Clock, SystemClock};
use super::error::ValidationFault;
use crate::lookup::{LookupCache, Lookups};
use crate::model::VoucherValidationContext;
use crate::result::{RuleOutcome, ValidationResult};
use crate::rules::{Phase, Rule, RuleContext, default_rules};
use crate::store::LedgerStore;

/// Validates proposed vouchers against one company's policy.
///
/// The policy and the lookup caches live as long as the validator. Validation
/// never writes to the ledger store.
pub struct GlValidator {
    rules: Vec<Arc<dyn Rule>>,
    policy: ErpValidationConfig,
    lookups: Lookups,
    clock: Arc<dyn Clock>,
}

impl GlValidator {
    /// Creates a validator with default engine settings.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, policy: ErpValidationConfig) -> Self {
        Self::with_settings(store, policy, &EngineSettings::default())
    }

    /// Creates a validator with explicit engine settings.
    #[must_use]
    pub fn with_settings(
        store: Arc<dyn LedgerStore>,
        policy: ErpValidationConfig,
        settings: &EngineSettings,
    ) -> Self {
        let lookups = Lookups::new(
            store,
            LookupCache::with_settings(&settings.cache),
            Duration::from_millis(settings.store.timeout_ms),
        );
        Self {
            rules: default_rules(),
            policy,
            lookups,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a validator from loaded application configuration.
    #[must_use]
    pub fn from_config(store: Arc<dyn LedgerStore>, config: &AppConfig) -> Self {
        Self::with_settings(store, config.policy.clone(), &config.engine)
    }

    /// Replaces the clock used for "today".
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the rule list.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<Arc<dyn Rule>>) -> Self {
        self.rules = rules;
        self
    }

    /// Returns the lookup caches.
    #[must_use]
    pub fn cache(&self) -> &LookupCache {
        self.lookups.cache()
    }

    /// Drops every cached lookup.
    pub fn clear_cache(&self) {
        self.lookups.cache().clear();
        debug!("Lookup caches cleared");
    }

    /// Validates a voucher under the instance policy.
    pub async fn validate_voucher(&self, context: &VoucherValidationContext) -> ValidationResult {
        Self::finish(self.run(context, &self.policy).await)
    }

    /// Validates a voucher under an explicit policy.
    ///
    /// Caches are shared with every other call on this validator.
    pub async fn validate_voucher_enhanced(
        &self,
        context: &VoucherValidationContext,
        config: &ErpValidationConfig,
    ) -> ValidationResult {
        Self::finish(self.run(context, config).await)
    }

    /// Validates a voucher, giving up as soon as `token` is cancelled.
    ///
    /// In-flight store calls are dropped and the result is a single system error.
    pub async fn validate_voucher_cancellable(
        &self,
        context: &VoucherValidationContext,
        token: &CancellationToken,
    ) -> ValidationResult {
        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Err(ValidationFault::Cancelled),
            result = self.run(context, &self.policy) => result,
        };
        Self::finish(outcome)
    }

    /// Parses a voucher context from JSON and validates it.
    pub async fn validate_json(&self, json: &str) -> ValidationResult {
        match VoucherValidationContext::from_json(json) {
            Ok(context) => self.validate_voucher(&context).await,
            Err(fault) => Self::finish(Err(fault)),
        }
    }

    #[instrument(
        name = "validate_voucher",
        skip_all,
        fields(
            company = %context.company,
            voucher_type = %context.voucher_type,
            posting_date = %context.posting_date,
            entries = context.entries.len(),
        )
    )]
    async fn run(
        &self,
        context: &VoucherValidationContext,
        policy: &ErpValidationConfig,
    ) -> Result<ValidationResult, ValidationFault> {
        context.check_structure()?;
        policy.validate()?;

        let ctx = RuleContext {
            voucher: context,
            policy,
            lookups: &self.lookups,
            today: self.clock.today(),
        };

        let (foundational, dependent): (Vec<_>, Vec<_>) = self
            .rules
            .iter()
            .partition(|rule| rule.phase().is_foundational());

        let mut outcomes = Vec::with_capacity(self.rules.len());
        for rule in foundational {
            let outcome = rule.check(&ctx).await?;
            Self::log_phase(rule.phase(), &outcome);
            outcomes.push((rule.phase(), outcome));
        }

        let rest = try_join_all(dependent.into_iter().map(|rule| {
            let ctx = &ctx;
            async move { Ok::<_, ValidationFault>((rule.phase(), rule.check(ctx).await?)) }
        }))
        .await?;
        for (phase, outcome) in rest {
            Self::log_phase(phase, &outcome);
            outcomes.push((phase, outcome));
        }

        Ok(ValidationResult::from_phases(outcomes))
    }

    fn log_phase(phase: Phase, outcome: &RuleOutcome) {
        debug!(
            phase = %phase,
            errors = outcome.errors.len(),
            warnings = outcome.warnings.len(),
            "Phase complete"
        );
    }

    fn finish(outcome: Result<ValidationResult, ValidationFault>) -> ValidationResult {
        match outcome {
            Ok(result) => {
                info!(
                    is_valid = result.is_valid,
                    errors = result.errors.len(),
                    warnings = result.warnings.len(),
                    "Voucher validated"
                );
                result
            }
            Err(fault) => {
                warn!(code = fault.error_code(), error = %fault, "Voucher validation aborted");
                ValidationResult::from_fault(&fault)
            }
        }
    }
}

impl std::fmt::Debug for GlValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlValidator")
            .field("phases", &self.rules.iter().map(|r| r.phase()).collect::<Vec<_>>())
            .field("policy", &self.policy)
            .field("lookups", &self.lookups)
            .finish_non_exhaustive()
    }
}
