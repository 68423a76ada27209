//! Shared fixtures for rule tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use glcheck_shared::ErpValidationConfig;

use super::{Rule, RuleContext};
use crate::lookup::{LookupCache, Lookups};
use crate::model::{
    Account, AccountType, CostCenter, GlEntryInput, VoucherType, VoucherValidationContext,
};
use crate::pipeline::ValidationFault;
use crate::result::RuleOutcome;
use crate::store::InMemoryLedgerStore;

pub(crate) const COMPANY: &str = "ACME";

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn today() -> NaiveDate {
    date(2026, 3, 15)
}

/// Small chart of accounts with a fiscal year starting on January 1st.
pub(crate) fn chart() -> InMemoryLedgerStore {
    InMemoryLedgerStore::new()
        .with_account(Account::new("Rent", AccountType::Expense, "USD"))
        .with_account(Account::new("Travel", AccountType::Expense, "USD"))
        .with_account(Account::new("Bank", AccountType::Bank, "USD"))
        .with_account(Account::new("Cash", AccountType::Cash, "USD"))
        .with_account(Account::new("Debtors", AccountType::Receivable, "USD"))
        .with_account(Account::new("Creditors", AccountType::Payable, "USD"))
        .with_account(Account::new("Equipment", AccountType::Asset, "USD"))
        .with_account(Account::new("Capital", AccountType::Equity, "USD"))
        .with_account(Account::new("Sales", AccountType::Income, "USD"))
        .with_account(Account::new("Euro Bank", AccountType::Bank, "EUR"))
        .with_account(Account::new("Old Expense", AccountType::Expense, "USD").disabled())
        .with_account(Account::new("Suspense", AccountType::Asset, "USD").without_currency())
        .with_cost_center(CostCenter::new("Main"))
        .with_cost_center(CostCenter::new("All Departments").group())
        .with_cost_center(CostCenter::new("Closed").disabled())
        .with_fiscal_year_start(COMPANY, date(2026, 1, 1))
}

pub(crate) fn voucher(entries: Vec<GlEntryInput>) -> VoucherValidationContext {
    VoucherValidationContext {
        company: COMPANY.into(),
        voucher_type: VoucherType::JournalEntry,
        posting_date: today(),
        entries,
    }
}

pub(crate) fn lookups(store: InMemoryLedgerStore) -> Lookups {
    Lookups::new(Arc::new(store), LookupCache::new(), Duration::from_secs(5))
}

/// Runs one rule against a store snapshot.
pub(crate) async fn try_run(
    rule: &dyn Rule,
    store: InMemoryLedgerStore,
    voucher: &VoucherValidationContext,
    policy: &ErpValidationConfig,
) -> Result<RuleOutcome, ValidationFault> {
    let lookups = lookups(store);
    let ctx = RuleContext {
        voucher,
        policy,
        lookups: &lookups,
        today: today(),
    };
    rule.check(&ctx).await
}

/// Runs one rule against a store snapshot, expecting it to complete.
pub(crate) async fn run(
    rule: &dyn Rule,
    store: InMemoryLedgerStore,
    voucher: &VoucherValidationContext,
    policy: &ErpValidationConfig,
) -> RuleOutcome {
    try_run(rule, store, voucher, policy).await.unwrap()
}
