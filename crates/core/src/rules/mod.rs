//! Validation rules.
//!
//! Each rule owns one phase of the pipeline and reports its findings as a
//! `RuleOutcome`. Rules only read through `Lookups` and never fail on business
//! problems; an `Err` means the voucher could not be inspected at all.
//!
//! - `balance` - Entry well-formedness, account existence, currency, debit = credit
//! - `cost_center` - Cost center policy and allocation sums
//! - `dimension` - Mandatory accounting dimensions
//! - `budget` - Budget variance and exceedance policy
//! - `period` - Backdating, fiscal year and authorization limits
//! - `consistency` - Voucher linking, party/account, currencies, cash guard
//! - `hooks` - Extension points that currently report nothing

pub mod balance;
pub mod budget;
pub mod consistency;
pub mod cost_center;
pub mod dimension;
pub mod hooks;
pub mod period;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod cost_center_props;
#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use glcheck_shared::ErpValidationConfig;
use serde::{Deserialize, Serialize};

use crate::lookup::Lookups;
use crate::model::VoucherValidationContext;
use crate::pipeline::ValidationFault;
use crate::result::RuleOutcome;

pub use balance::BalanceRule;
pub use budget::BudgetRule;
pub use consistency::ConsistencyRule;
pub use cost_center::CostCenterRule;
pub use dimension::DimensionRule;
pub use hooks::ExtensionHook;
pub use period::PeriodRule;

/// Pipeline phase, in execution and reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Well-formedness, accounts, currencies, debit = credit.
    BalanceIntegrity,
    /// Cost center policy.
    CostCenter,
    /// Accounting dimensions.
    Dimensions,
    /// Budget control.
    Budget,
    /// Posting period and authorization limits.
    PeriodAuthorization,
    /// Cross-entry consistency.
    AdvancedConsistency,
    /// Inter-company hook.
    InterCompany,
    /// Tax implications hook.
    TaxImplications,
    /// Workflow state hook.
    WorkflowState,
    /// Document series hook.
    DocumentSeries,
}

impl Phase {
    /// All phases in order.
    pub const ALL: [Self; 10] = [
        Self::BalanceIntegrity,
        Self::CostCenter,
        Self::Dimensions,
        Self::Budget,
        Self::PeriodAuthorization,
        Self::AdvancedConsistency,
        Self::InterCompany,
        Self::TaxImplications,
        Self::WorkflowState,
        Self::DocumentSeries,
    ];

    /// Position of the phase in the pipeline.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BalanceIntegrity => "balance_integrity",
            Self::CostCenter => "cost_center",
            Self::Dimensions => "dimensions",
            Self::Budget => "budget",
            Self::PeriodAuthorization => "period_authorization",
            Self::AdvancedConsistency => "advanced_consistency",
            Self::InterCompany => "inter_company",
            Self::TaxImplications => "tax_implications",
            Self::WorkflowState => "workflow_state",
            Self::DocumentSeries => "document_series",
        }
    }

    /// Foundational phases run alone, before everything else.
    #[must_use]
    pub const fn is_foundational(self) -> bool {
        matches!(self, Self::BalanceIntegrity)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The voucher under validation.
    pub voucher: &'a VoucherValidationContext,
    /// Active policy.
    pub policy: &'a ErpValidationConfig,
    /// Store gateway.
    pub lookups: &'a Lookups,
    /// The current date, for backdating checks.
    pub today: NaiveDate,
}

/// A single validation phase.
#[async_trait]
pub trait Rule: Send + Sync {
    /// The phase this rule reports under.
    fn phase(&self) -> Phase;

    /// Inspects the voucher.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationFault` only when the voucher cannot be inspected
    /// (store failure, timeout). Business problems are reported in the outcome.
    async fn check(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome, ValidationFault>;
}

/// The full rule list: every validation phase followed by the extension hooks.
#[must_use]
pub fn default_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(BalanceRule),
        Arc::new(CostCenterRule),
        Arc::new(DimensionRule),
        Arc::new(BudgetRule),
        Arc::new(PeriodRule),
        Arc::new(ConsistencyRule),
        Arc::new(ExtensionHook::new(Phase::InterCompany)),
        Arc::new(ExtensionHook::new(Phase::TaxImplications)),
        Arc::new(ExtensionHook::new(Phase::WorkflowState)),
        Arc::new(ExtensionHook::new(Phase::DocumentSeries)),
    ]
}
