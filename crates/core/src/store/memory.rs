//! In-memory ledger store.
//!
//! Holds an immutable snapshot built up front. Useful for embedding the engine
//! next to data that is already loaded, and as the store behind tests. Latency
//! and transient failures can be injected to exercise timeouts and retries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use glcheck_shared::types::{AccountId, CompanyId, CostCenterId, VoucherNo};
use rust_decimal::Decimal;

use super::{LedgerStore, StoreError};
use crate::model::{
    Account, AllocationShare, BudgetFigures, BudgetKey, BudgetPeriod, CostCenter,
    DimensionDefinition, DocStatus, VoucherType,
};

type VoucherKey = (VoucherType, VoucherNo, CompanyId);

/// Ledger store backed by in-memory maps.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    accounts: HashMap<AccountId, Account>,
    cost_centers: HashMap<CostCenterId, CostCenter>,
    allocations: HashMap<CostCenterId, Vec<(NaiveDate, Vec<AllocationShare>)>>,
    dimensions: HashMap<(CompanyId, VoucherType), Vec<DimensionDefinition>>,
    budgets: HashMap<BudgetKey, BudgetFigures>,
    fiscal_years: HashMap<CompanyId, NaiveDate>,
    vouchers: HashMap<VoucherKey, DocStatus>,
    movements: HashMap<AccountId, Vec<(NaiveDate, Decimal)>>,
    latency: Option<Duration>,
    transient_failures: AtomicUsize,
    calls: AtomicUsize,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account.
    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.insert(account.id.clone(), account);
        self
    }

    /// Adds a cost center.
    #[must_use]
    pub fn with_cost_center(mut self, cost_center: CostCenter) -> Self {
        self.cost_centers.insert(cost_center.id.clone(), cost_center);
        self
    }

    /// Adds an allocation for a cost center, effective from `valid_from`.
    #[must_use]
    pub fn with_allocation(
        mut self,
        cost_center: impl Into<CostCenterId>,
        valid_from: NaiveDate,
        shares: Vec<AllocationShare>,
    ) -> Self {
        let schedules = self.allocations.entry(cost_center.into()).or_default();
        schedules.push((valid_from, shares));
        schedules.sort_by_key(|(from, _)| *from);
        self
    }

    /// Adds a dimension for a company and voucher type.
    #[must_use]
    pub fn with_dimension(
        mut self,
        company: impl Into<CompanyId>,
        voucher_type: VoucherType,
        definition: DimensionDefinition,
    ) -> Self {
        self.dimensions
            .entry((company.into(), voucher_type))
            .or_default()
            .push(definition);
        self
    }

    /// Sets the budget for an account, optional cost center and period.
    #[must_use]
    pub fn with_budget(
        mut self,
        account: impl Into<AccountId>,
        cost_center: Option<CostCenterId>,
        period: BudgetPeriod,
        figures: BudgetFigures,
    ) -> Self {
        self.budgets.insert((account.into(), cost_center, period), figures);
        self
    }

    /// Sets the fiscal year start of a company.
    #[must_use]
    pub fn with_fiscal_year_start(
        mut self,
        company: impl Into<CompanyId>,
        start: NaiveDate,
    ) -> Self {
        self.fiscal_years.insert(company.into(), start);
        self
    }

    /// Registers an existing voucher.
    #[must_use]
    pub fn with_voucher(
        mut self,
        voucher_type: VoucherType,
        voucher_no: impl Into<VoucherNo>,
        company: impl Into<CompanyId>,
        status: DocStatus,
    ) -> Self {
        self.vouchers
            .insert((voucher_type, voucher_no.into(), company.into()), status);
        self
    }

    /// Records a debit-normal balance movement on an account.
    #[must_use]
    pub fn with_movement(
        mut self,
        account: impl Into<AccountId>,
        date: NaiveDate,
        amount: Decimal,
    ) -> Self {
        self.movements
            .entry(account.into())
            .or_default()
            .push((date, amount));
        self
    }

    /// Delays every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fails the next `count` calls with `StoreError::Unavailable`.
    #[must_use]
    pub fn with_transient_failures(self, count: usize) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Returns the number of calls received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let failed = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StoreError::Unavailable("injected transient failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_account(&self, account: &AccountId) -> Result<Option<Account>, StoreError> {
        self.enter().await?;
        Ok(self.accounts.get(account).cloned())
    }

    async fn get_cost_center(
        &self,
        cost_center: &CostCenterId,
    ) -> Result<Option<CostCenter>, StoreError> {
        self.enter().await?;
        Ok(self.cost_centers.get(cost_center).cloned())
    }

    async fn get_cost_center_allocations(
        &self,
        cost_center: &CostCenterId,
        as_of: NaiveDate,
    ) -> Result<Vec<AllocationShare>, StoreError> {
        self.enter().await?;
        let shares = self
            .allocations
            .get(cost_center)
            .and_then(|schedules| {
                schedules
                    .iter()
                    .rev()
                    .find(|(valid_from, _)| *valid_from <= as_of)
            })
            .map(|(_, shares)| shares.clone())
            .unwrap_or_default();
        Ok(shares)
    }

    async fn get_dimension_definitions(
        &self,
        company: &CompanyId,
        voucher_type: &VoucherType,
    ) -> Result<Vec<DimensionDefinition>, StoreError> {
        self.enter().await?;
        Ok(self
            .dimensions
            .get(&(company.clone(), voucher_type.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_budget(
        &self,
        account: &AccountId,
        cost_center: Option<&CostCenterId>,
        period: BudgetPeriod,
    ) -> Result<Option<BudgetFigures>, StoreError> {
        self.enter().await?;
        // A cost-center budget wins over the company-wide one.
        let specific = cost_center
            .and_then(|cc| self.budgets.get(&(account.clone(), Some(cc.clone()), period)));
        Ok(specific
            .or_else(|| self.budgets.get(&(account.clone(), None, period)))
            .copied())
    }

    async fn get_fiscal_year_start(
        &self,
        company: &CompanyId,
    ) -> Result<Option<NaiveDate>, StoreError> {
        self.enter().await?;
        Ok(self.fiscal_years.get(company).copied())
    }

    async fn find_voucher(
        &self,
        voucher_type: &VoucherType,
        voucher_no: &VoucherNo,
        company: &CompanyId,
    ) -> Result<Option<DocStatus>, StoreError> {
        self.enter().await?;
        Ok(self
            .vouchers
            .get(&(voucher_type.clone(), voucher_no.clone(), company.clone()))
            .copied())
    }

    async fn get_running_balance(
        &self,
        account: &AccountId,
        as_of: NaiveDate,
    ) -> Result<Decimal, StoreError> {
        self.enter().await?;
        let Some(moves) = self.movements.get(account) else {
            return Ok(Decimal::ZERO);
        };
        moves
            .iter()
            .filter(|(date, _)| *date <= as_of)
            .try_fold(Decimal::ZERO, |total, (_, amount)| total.checked_add(*amount))
            .ok_or_else(|| StoreError::Backend(format!("balance of {account} is out of range")))
    }
}
