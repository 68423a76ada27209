//! Posting period and authorization phase.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use super::{Phase, Rule, RuleContext};
use crate::pipeline::ValidationFault;
use crate::result::{Impact, RuleOutcome, ValidationCode};

/// Posting period and authorization rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodRule;

/// Earliest posting date still accepted when backdating is allowed.
#[must_use]
pub fn earliest_backdate(today: NaiveDate, limit_days: u32) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(u64::from(limit_days)))
}

#[async_trait]
impl Rule for PeriodRule {
    fn phase(&self) -> Phase {
        Phase::PeriodAuthorization
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome, ValidationFault> {
        let period = &ctx.policy.period_rules;
        let auth = &ctx.policy.authorization_rules;
        let posting_date = ctx.voucher.posting_date;
        let mut outcome = RuleOutcome::default();

        if !period.allow_backdated_entries {
            if posting_date < ctx.today {
                outcome.error(
                    ValidationCode::BackdatedEntryNotAllowed,
                    "posting_date",
                    format!("Posting date {posting_date} is before today ({})", ctx.today),
                );
            }
        } else if let Some(earliest) = earliest_backdate(ctx.today, period.backdate_limit)
            && posting_date < earliest
        {
            outcome.error(
                ValidationCode::BackdateLimitExceeded,
                "posting_date",
                format!(
                    "Posting date {posting_date} is more than {} days in the past",
                    period.backdate_limit
                ),
            );
            outcome.suggest(format!("Use a posting date on or after {earliest}"));
        }

        if period.validate_fiscal_year {
            match ctx.lookups.fiscal_year_start(&ctx.voucher.company).await? {
                None => outcome.error(
                    ValidationCode::InvalidFiscalYear,
                    "posting_date",
                    format!("No fiscal year is configured for {}", ctx.voucher.company),
                ),
                Some(start) if posting_date < start => outcome.error(
                    ValidationCode::InvalidFiscalYear,
                    "posting_date",
                    format!(
                        "Posting date {posting_date} is before the fiscal year starting {start}"
                    ),
                ),
                Some(_) => {}
            }
        }

        if auth.enforce_authorization_limits {
            let total = ctx
                .voucher
                .entries
                .iter()
                .try_fold(Decimal::ZERO, |total, e| total.checked_add(e.amount()))
                .ok_or_else(|| ValidationFault::AmountOverflow("voucher total".into()))?;
            if total > auth.max_amount_without_approval {
                let message = format!(
                    "Voucher total {total} exceeds the approval limit of {}",
                    auth.max_amount_without_approval
                );
                if auth.require_approval_above_limit {
                    outcome.warning(
                        ValidationCode::ApprovalRequired,
                        "entries",
                        message,
                        Impact::High,
                    );
                    outcome.suggest("Route the voucher for approval before posting");
                } else {
                    outcome.error(ValidationCode::AuthorizationLimitExceeded, "entries", message);
                }
            }
        }

        Ok(outcome)
    }
}
