//! Cost center phase.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{Phase, Rule, RuleContext};
use crate::model::{AccountType, AllocationShare};
use crate::pipeline::ValidationFault;
use crate::result::{RuleOutcome, ValidationCode, entry_field};

/// Largest deviation from 100% still accepted for an allocation.
pub const ALLOCATION_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Cost center rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostCenterRule;

/// Sum of allocation percentages, or `None` if it does not fit in a `Decimal`.
#[must_use]
pub fn allocation_total(shares: &[AllocationShare]) -> Option<Decimal> {
    shares
        .iter()
        .try_fold(Decimal::ZERO, |total, s| total.checked_add(s.percentage))
}

/// Whether allocation percentages add up to 100 within `ALLOCATION_TOLERANCE`.
#[must_use]
pub fn allocation_is_complete(shares: &[AllocationShare]) -> bool {
    allocation_total(shares)
        .and_then(|total| total.checked_sub(Decimal::ONE_HUNDRED))
        .is_some_and(|gap| gap.abs() <= ALLOCATION_TOLERANCE)
}

#[async_trait]
impl Rule for CostCenterRule {
    fn phase(&self) -> Phase {
        Phase::CostCenter
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome, ValidationFault> {
        let rules = &ctx.policy.cost_center_rules;
        let mut outcome = RuleOutcome::default();

        for (index, entry) in ctx.voucher.entries.iter().enumerate() {
            let field = entry_field(index, "cost_center");

            let Some(cc_id) = entry.cost_center() else {
                let account = ctx.lookups.account(&entry.account).await?;
                let is_expense = account.is_some_and(|a| a.account_type == AccountType::Expense);
                if is_expense && rules.require_for_pl {
                    outcome.error(
                        ValidationCode::CostCenterValidationError,
                        field,
                        format!("Cost center is required for expense account {}", entry.account),
                    );
                    outcome.suggest("Set a cost center on every profit and loss line");
                }
                continue;
            };

            let Some(cost_center) = ctx.lookups.cost_center(cc_id).await? else {
                outcome.error(
                    ValidationCode::CostCenterValidationError,
                    field,
                    format!("Cost center {cc_id} does not exist"),
                );
                continue;
            };
            if cost_center.is_disabled {
                outcome.error(
                    ValidationCode::CostCenterValidationError,
                    field,
                    format!("Cost center {cc_id} is disabled"),
                );
                continue;
            }
            if cost_center.is_group && !rules.allow_group_cost_center {
                outcome.error(
                    ValidationCode::CostCenterValidationError,
                    field,
                    format!("Cost center {cc_id} is a group and cannot be posted to"),
                );
                outcome.suggest("Post to a leaf cost center instead of a group");
                continue;
            }

            if rules.validate_allocation {
                let shares = ctx
                    .lookups
                    .allocations(cc_id, ctx.voucher.posting_date)
                    .await?;
                if !shares.is_empty() && !allocation_is_complete(&shares) {
                    outcome.error(
                        ValidationCode::CostCenterAllocationError,
                        field,
                        match allocation_total(&shares) {
                            Some(total) => format!(
                                "Allocation of cost center {cc_id} adds up to {total}%, \
                                 expected 100%"
                            ),
                            None => format!(
                                "Allocation of cost center {cc_id} is out of range, expected 100%"
                            ),
                        },
                    );
                }
            }
        }

        Ok(outcome)
    }
}
