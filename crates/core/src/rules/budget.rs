//! Budget control phase.
//!
//! Only expense lines are checked. A line without a budget, or with a zero
//! budget, is skipped.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{Phase, Rule, RuleContext};
use crate::model::{AccountType, BudgetPeriod, GlEntryInput};
use crate::pipeline::ValidationFault;
use crate::result::{BudgetCheck, Impact, RuleOutcome, ValidationCode, entry_field};

/// Budget control rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetRule;

/// Variance of `actual` against a non-zero `budget`, as a percentage of the budget.
///
/// Returns `None` if the percentage does not fit in a `Decimal`.
#[must_use]
pub fn variance_percentage(budget: Decimal, actual: Decimal) -> Option<Decimal> {
    actual
        .checked_sub(budget)?
        .checked_div(budget)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

fn amount_field(index: usize, entry: &GlEntryInput) -> String {
    if entry.credit > entry.debit {
        entry_field(index, "credit")
    } else {
        entry_field(index, "debit")
    }
}

#[async_trait]
impl Rule for BudgetRule {
    fn phase(&self) -> Phase {
        Phase::Budget
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome, ValidationFault> {
        let rules = &ctx.policy.budget_rules;
        let mut outcome = RuleOutcome::default();
        if !rules.enable_budget_validation {
            return Ok(outcome);
        }

        let period = BudgetPeriod::containing(ctx.voucher.posting_date);
        let require_approval = ctx.policy.authorization_rules.require_approval_above_limit;

        for (index, entry) in ctx.voucher.entries.iter().enumerate() {
            let account = ctx.lookups.account(&entry.account).await?;
            if !account.is_some_and(|a| a.account_type == AccountType::Expense) {
                continue;
            }

            let cost_center = entry.cost_center();
            let Some(figures) = ctx
                .lookups
                .budget(&entry.account, cost_center, period)
                .await?
            else {
                continue;
            };
            if figures.budget_amount.is_zero() {
                continue;
            }

            let out_of_range = || {
                ValidationFault::AmountOverflow(format!("budget variance of {}", entry.account))
            };
            let mut actual = entry.amount();
            if rules.include_booked_actuals {
                actual = actual
                    .checked_add(figures.actual_amount)
                    .ok_or_else(out_of_range)?;
            }
            let variance = actual
                .checked_sub(figures.budget_amount)
                .ok_or_else(out_of_range)?;
            let variance_percentage =
                variance_percentage(figures.budget_amount, actual).ok_or_else(out_of_range)?;
            let exceeds_limit = variance_percentage > rules.budget_exceedance_threshold;

            outcome.budget_checks.push(BudgetCheck {
                entry_index: index,
                account: entry.account.clone(),
                cost_center: cost_center.cloned(),
                period,
                budget_amount: figures.budget_amount,
                actual_amount: actual,
                variance,
                variance_percentage,
                exceeds_limit,
            });

            if !exceeds_limit {
                continue;
            }

            let field = amount_field(index, entry);
            let message = format!(
                "{} exceeds the {period} budget of {} by {}% (limit {}%)",
                entry.account,
                figures.budget_amount,
                variance_percentage.round_dp(2),
                rules.budget_exceedance_threshold
            );
            if rules.allow_budget_exceedance {
                outcome.warning(
                    ValidationCode::BudgetExceededWarning,
                    field.clone(),
                    message,
                    Impact::High,
                );
            } else {
                outcome.error(ValidationCode::BudgetExceeded, field.clone(), message);
                outcome.suggest("Reduce the amount or request a budget revision");
            }
            if require_approval {
                outcome.warning(
                    ValidationCode::BudgetApprovalRequired,
                    field,
                    format!(
                        "Spending above the {period} budget of {} needs approval",
                        entry.account
                    ),
                    Impact::Medium,
                );
            }
        }

        Ok(outcome)
    }
}
