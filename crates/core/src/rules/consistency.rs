//! Cross-entry consistency phase.
//!
//! Voucher linking, party/account agreement, mixed currencies and the cash
//! balance guard.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use glcheck_shared::types::AccountId;
use rust_decimal::Decimal;

use super::{Phase, Rule, RuleContext};
use crate::model::{AccountType, DocStatus, GlEntryInput, PartyType};
use crate::pipeline::ValidationFault;
use crate::result::{Impact, RuleOutcome, ValidationCode, entry_field};

/// Cross-entry consistency rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyRule;

/// Account type a party type must be booked against, if any.
#[must_use]
pub fn expected_account_type(party_type: &PartyType) -> Option<AccountType> {
    match party_type {
        PartyType::Customer => Some(AccountType::Receivable),
        PartyType::Supplier => Some(AccountType::Payable),
        _ => None,
    }
}

/// Distinct explicit line currencies, upper-cased.
#[must_use]
pub fn distinct_currencies(entries: &[GlEntryInput]) -> BTreeSet<String> {
    entries
        .iter()
        .filter_map(GlEntryInput::currency)
        .map(str::to_ascii_uppercase)
        .collect()
}

impl ConsistencyRule {
    async fn check_linking(
        ctx: &RuleContext<'_>,
        index: usize,
        entry: &GlEntryInput,
        outcome: &mut RuleOutcome,
    ) -> Result<(), ValidationFault> {
        let voucher_type = entry
            .against_voucher_type
            .as_ref()
            .filter(|t| !t.as_str().trim().is_empty());
        let voucher_no = entry.against_voucher.as_ref().filter(|n| !n.is_blank());
        let field = entry_field(index, "against_voucher");

        match (voucher_type, voucher_no) {
            (None, None) => {}
            (Some(_), None) | (None, Some(_)) => outcome.error(
                ValidationCode::InvalidVoucherLinking,
                field,
                "Both the against voucher type and number are required",
            ),
            (Some(voucher_type), Some(voucher_no)) => {
                match ctx
                    .lookups
                    .find_voucher(voucher_type, voucher_no, &ctx.voucher.company)
                    .await?
                {
                    None => outcome.error(
                        ValidationCode::InvalidVoucherLinking,
                        field,
                        format!("{voucher_type} {voucher_no} does not exist"),
                    ),
                    Some(DocStatus::Submitted) => {}
                    Some(status) => {
                        outcome.error(
                            ValidationCode::InvalidVoucherLinking,
                            field,
                            format!(
                                "{voucher_type} {voucher_no} is {}, \
                                 only submitted vouchers can be referenced",
                                status.as_str()
                            ),
                        );
                        outcome.suggest(format!("Submit {voucher_type} {voucher_no} first"));
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Rule for ConsistencyRule {
    fn phase(&self) -> Phase {
        Phase::AdvancedConsistency
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome, ValidationFault> {
        let voucher = ctx.voucher;
        let mut outcome = RuleOutcome::default();
        let mut cash_balances: HashMap<AccountId, Decimal> = HashMap::new();
        let mut overdrawn: BTreeSet<AccountId> = BTreeSet::new();

        for (index, entry) in voucher.entries.iter().enumerate() {
            Self::check_linking(ctx, index, entry, &mut outcome).await?;

            let Some(account) = ctx.lookups.account(&entry.account).await? else {
                continue;
            };

            if let Some(party_type) = &entry.party_type
                && let Some(expected) = expected_account_type(party_type)
                && account.account_type != expected
            {
                outcome.warning(
                    ValidationCode::PartyAccountMismatch,
                    entry_field(index, "party_type"),
                    format!(
                        "{party_type} lines should use a {expected} account, {} is {}",
                        account.id, account.account_type
                    ),
                    Impact::Medium,
                );
            }

            if account.account_type == AccountType::Cash {
                let balance = match cash_balances.get(&account.id) {
                    Some(balance) => *balance,
                    None => {
                        ctx.lookups
                            .running_balance(&account.id, voucher.posting_date)
                            .await?
                    }
                };
                let balance = entry
                    .net_debit()
                    .and_then(|net| balance.checked_add(net))
                    .ok_or_else(|| {
                        ValidationFault::AmountOverflow(format!(
                            "running balance of cash account {}",
                            account.id
                        ))
                    })?;
                cash_balances.insert(account.id.clone(), balance);

                if balance < Decimal::ZERO && overdrawn.insert(account.id.clone()) {
                    outcome.error(
                        ValidationCode::NegativeCashBalance,
                        entry_field(index, "credit"),
                        format!("Cash account {} would go negative ({balance})", account.id),
                    );
                    outcome.suggest("Fund the cash account before paying out of it");
                }
            }
        }

        let currencies = distinct_currencies(&voucher.entries);
        if currencies.len() > 1 {
            let listed: Vec<&str> = currencies.iter().map(String::as_str).collect();
            outcome.warning(
                ValidationCode::MultiCurrencyVoucher,
                "entries",
                format!("Voucher mixes currencies: {}", listed.join(", ")),
                Impact::Medium,
            );
        }

        Ok(outcome)
    }
}
