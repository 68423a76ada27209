//! Cache-backed, timeout-guarded access to the ledger store.
//!
//! Rules never talk to the store directly. Every call goes through `Lookups`,
//! which bounds it with the configured timeout and memoizes master data.
//! Balances and voucher statuses change as the ledger moves, so those are
//! always read fresh.

pub mod cache;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use glcheck_shared::types::{AccountId, CompanyId, CostCenterId, VoucherNo};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::model::{
    Account, AllocationShare, BudgetFigures, BudgetPeriod, CostCenter, DimensionDefinition,
    DocStatus, VoucherType,
};
use crate::pipeline::ValidationFault;
use crate::store::{LedgerStore, StoreError};

pub use cache::LookupCache;

/// Read gateway shared by all rules of one validator.
#[derive(Clone)]
pub struct Lookups {
    store: Arc<dyn LedgerStore>,
    cache: LookupCache,
    timeout: Duration,
}

fn shared_fault(err: Arc<StoreError>) -> ValidationFault {
    ValidationFault::Store((*err).clone())
}

impl Lookups {
    /// Creates a gateway over a store.
    ///
    /// # Arguments
    ///
    /// * `store` - The ledger store to read from
    /// * `cache` - Caches to populate; clones of it see the same entries
    /// * `timeout` - Deadline applied to each individual store call
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, cache: LookupCache, timeout: Duration) -> Self {
        Self {
            store,
            cache,
            timeout,
        }
    }

    /// Returns the caches.
    #[must_use]
    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        if let Ok(result) = tokio::time::timeout(self.timeout, call).await {
            result
        } else {
            let after_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(operation, after_ms, "Ledger store call timed out");
            Err(StoreError::Timeout {
                operation,
                after_ms,
            })
        }
    }

    /// Looks up an account.
    ///
    /// Concurrent misses for the same account share a single store call.
    ///
    /// # Returns
    ///
    /// The account snapshot, from cache or freshly loaded, or `None` if the
    /// store does not know the account.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFault::Store` if the load fails or times out.
    pub async fn account(&self, account: &AccountId) -> Result<Option<Account>, ValidationFault> {
        self.cache
            .accounts
            .try_get_with(account.clone(), async {
                debug!(%account, "Loading account");
                self.guarded("get_account", self.store.get_account(account))
                    .await
            })
            .await
            .map_err(shared_fault)
    }

    /// Looks up a cost center.
    pub async fn cost_center(
        &self,
        cost_center: &CostCenterId,
    ) -> Result<Option<CostCenter>, ValidationFault> {
        self.cache
            .cost_centers
            .try_get_with(cost_center.clone(), async {
                debug!(%cost_center, "Loading cost center");
                self.guarded("get_cost_center", self.store.get_cost_center(cost_center))
                    .await
            })
            .await
            .map_err(shared_fault)
    }

    /// Returns the allocation of a cost center in effect on `as_of`.
    pub async fn allocations(
        &self,
        cost_center: &CostCenterId,
        as_of: NaiveDate,
    ) -> Result<Arc<Vec<AllocationShare>>, ValidationFault> {
        self.cache
            .allocations
            .try_get_with((cost_center.clone(), as_of), async {
                self.guarded(
                    "get_cost_center_allocations",
                    self.store.get_cost_center_allocations(cost_center, as_of),
                )
                .await
                .map(Arc::new)
            })
            .await
            .map_err(shared_fault)
    }

    /// Returns the dimensions configured for a company and voucher type.
    pub async fn dimensions(
        &self,
        company: &CompanyId,
        voucher_type: &VoucherType,
    ) -> Result<Arc<Vec<DimensionDefinition>>, ValidationFault> {
        self.cache
            .dimensions
            .try_get_with((company.clone(), voucher_type.clone()), async {
                debug!(%company, %voucher_type, "Loading dimension definitions");
                self.guarded(
                    "get_dimension_definitions",
                    self.store.get_dimension_definitions(company, voucher_type),
                )
                .await
                .map(Arc::new)
            })
            .await
            .map_err(shared_fault)
    }

    /// Returns the budget figures for an account, cost center and period.
    pub async fn budget(
        &self,
        account: &AccountId,
        cost_center: Option<&CostCenterId>,
        period: BudgetPeriod,
    ) -> Result<Option<BudgetFigures>, ValidationFault> {
        self.cache
            .budgets
            .try_get_with((account.clone(), cost_center.cloned(), period), async {
                self.guarded(
                    "get_budget",
                    self.store.get_budget(account, cost_center, period),
                )
                .await
            })
            .await
            .map_err(shared_fault)
    }

    /// Returns the fiscal year start of a company.
    pub async fn fiscal_year_start(
        &self,
        company: &CompanyId,
    ) -> Result<Option<NaiveDate>, ValidationFault> {
        Ok(self
            .guarded(
                "get_fiscal_year_start",
                self.store.get_fiscal_year_start(company),
            )
            .await?)
    }

    /// Returns the status of a voucher, or `None` if it does not exist.
    pub async fn find_voucher(
        &self,
        voucher_type: &VoucherType,
        voucher_no: &VoucherNo,
        company: &CompanyId,
    ) -> Result<Option<DocStatus>, ValidationFault> {
        Ok(self
            .guarded(
                "find_voucher",
                self.store.find_voucher(voucher_type, voucher_no, company),
            )
            .await?)
    }

    /// Returns the running balance of an account as of `as_of`.
    pub async fn running_balance(
        &self,
        account: &AccountId,
        as_of: NaiveDate,
    ) -> Result<Decimal, ValidationFault> {
        Ok(self
            .guarded(
                "get_running_balance",
                self.store.get_running_balance(account, as_of),
            )
            .await?)
    }
}

impl std::fmt::Debug for Lookups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lookups")
            .field("cache", &self.cache)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
