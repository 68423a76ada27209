//! Balance and integrity phase.
//!
//! Runs first and alone. Checks, in order: the voucher has lines, every line
//! is well-formed, every account exists and is enabled, every line's currency
//! resolves and agrees with its account, and total debit equals total credit
//! within `BALANCE_TOLERANCE`.

use async_trait::async_trait;
use futures::future::try_join_all;
use rust_decimal::Decimal;

use super::{Phase, Rule, RuleContext};
use crate::model::{Account, GlEntryInput};
use crate::pipeline::ValidationFault;
use crate::result::{Impact, RuleOutcome, ValidationCode, VoucherTotals, entry_field};

/// Balance and integrity rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceRule;

/// Sums debits and credits of all lines.
///
/// # Errors
///
/// Returns `ValidationFault::AmountOverflow` if a total does not fit in a `Decimal`.
pub fn voucher_totals(entries: &[GlEntryInput]) -> Result<VoucherTotals, ValidationFault> {
    entries
        .iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(d, c), e| {
            Some((d.checked_add(e.debit)?, c.checked_add(e.credit)?))
        })
        .and_then(|(debit, credit)| VoucherTotals::new(debit, credit))
        .ok_or_else(|| ValidationFault::AmountOverflow("voucher debit and credit totals".into()))
}

/// Records well-formedness findings for one line.
pub fn check_shape(index: usize, entry: &GlEntryInput, outcome: &mut RuleOutcome) {
    if entry.debit < Decimal::ZERO {
        outcome.error(
            ValidationCode::NegativeAmount,
            entry_field(index, "debit"),
            format!("Debit amount {} must not be negative", entry.debit),
        );
    }
    if entry.credit < Decimal::ZERO {
        outcome.error(
            ValidationCode::NegativeAmount,
            entry_field(index, "credit"),
            format!("Credit amount {} must not be negative", entry.credit),
        );
    }
    if entry.debit > Decimal::ZERO && entry.credit > Decimal::ZERO {
        outcome.error(
            ValidationCode::DebitAndCreditBothSet,
            entry_field(index, "debit"),
            format!(
                "Line for {} sets both debit ({}) and credit ({})",
                entry.account, entry.debit, entry.credit
            ),
        );
        outcome.suggest("Split lines that carry both a debit and a credit into two lines");
    }
    if entry.debit.is_zero() && entry.credit.is_zero() {
        outcome.warning(
            ValidationCode::ZeroAmountEntry,
            entry_field(index, "debit"),
            format!("Line for {} has no amount", entry.account),
            Impact::Low,
        );
    }
}

/// Records account existence, state and currency findings for one line.
fn check_account(
    index: usize,
    entry: &GlEntryInput,
    account: Option<&Account>,
    outcome: &mut RuleOutcome,
) {
    let Some(account) = account else {
        outcome.error(
            ValidationCode::AccountNotFound,
            entry_field(index, "account"),
            format!("Account {} does not exist", entry.account),
        );
        return;
    };

    if account.is_disabled {
        outcome.error(
            ValidationCode::AccountDisabled,
            entry_field(index, "account"),
            format!("Account {} is disabled", account.id),
        );
    }

    let fixed = account
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    match (entry.currency(), fixed) {
        (None, None) => outcome.error(
            ValidationCode::CurrencyNotResolved,
            entry_field(index, "account_currency"),
            format!("Currency of the line for {} cannot be resolved", entry.account),
        ),
        (Some(line), Some(fixed)) if !line.eq_ignore_ascii_case(fixed) => outcome.error(
            ValidationCode::AccountCurrencyMismatch,
            entry_field(index, "account_currency"),
            format!(
                "Line currency {line} differs from currency {fixed} of account {}",
                account.id
            ),
        ),
        _ => {}
    }
}

/// Records `BALANCE_MISMATCH` when the totals are off by more than the tolerance.
pub fn check_balance(totals: &VoucherTotals, outcome: &mut RuleOutcome) {
    if !totals.is_balanced {
        outcome.error(
            ValidationCode::BalanceMismatch,
            "entries",
            format!(
                "Total debit {} does not equal total credit {} (difference {})",
                totals.total_debit, totals.total_credit, totals.difference
            ),
        );
        outcome.suggest("Adjust the lines so that total debit equals total credit");
    }
}

#[async_trait]
impl Rule for BalanceRule {
    fn phase(&self) -> Phase {
        Phase::BalanceIntegrity
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome, ValidationFault> {
        let entries = &ctx.voucher.entries;
        let mut outcome = RuleOutcome::default();

        if entries.is_empty() {
            outcome.error(
                ValidationCode::NoEntries,
                "entries",
                "Voucher has no GL entries",
            );
            outcome.totals = Some(voucher_totals(entries)?);
            return Ok(outcome);
        }

        for (index, entry) in entries.iter().enumerate() {
            check_shape(index, entry, &mut outcome);
        }

        let accounts =
            try_join_all(entries.iter().map(|e| ctx.lookups.account(&e.account))).await?;
        for (index, (entry, account)) in entries.iter().zip(&accounts).enumerate() {
            check_account(index, entry, account.as_ref(), &mut outcome);
        }

        let totals = voucher_totals(entries)?;
        check_balance(&totals, &mut outcome);
        outcome.totals = Some(totals);
        Ok(outcome)
    }
}
