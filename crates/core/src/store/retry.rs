//! Retrying store decorator.
//!
//! Transient failures (timeouts, unreachable store) are retried with bounded
//! exponential backoff at the port boundary. Rules never retry.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use glcheck_shared::config::StoreSettings;
use glcheck_shared::types::{AccountId, CompanyId, CostCenterId, VoucherNo};
use rust_decimal::Decimal;
use tracing::warn;

use super::{LedgerStore, StoreError};
use crate::model::{
    Account, AllocationShare, BudgetFigures, BudgetPeriod, CostCenter, DimensionDefinition,
    DocStatus, VoucherType,
};

/// Upper bound for a single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Wraps a store and retries transient failures.
#[derive(Debug)]
pub struct RetryingStore<S> {
    inner: S,
    max_retries: u32,
    base_backoff: Duration,
}

impl<S: LedgerStore> RetryingStore<S> {
    /// Creates a decorator with an explicit retry budget.
    #[must_use]
    pub fn new(inner: S, max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff,
        }
    }

    /// Creates a decorator from store settings.
    #[must_use]
    pub fn with_settings(inner: S, settings: &StoreSettings) -> Self {
        Self::new(
            inner,
            settings.max_retries,
            Duration::from_millis(settings.retry_backoff_ms),
        )
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Delay before retry number `attempt + 1`.
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }

    async fn retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, StoreError>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Retrying ledger store call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}

#[async_trait]
impl<S: LedgerStore> LedgerStore for RetryingStore<S> {
    async fn get_account(&self, account: &AccountId) -> Result<Option<Account>, StoreError> {
        self.retry("get_account", || self.inner.get_account(account))
            .await
    }

    async fn get_cost_center(
        &self,
        cost_center: &CostCenterId,
    ) -> Result<Option<CostCenter>, StoreError> {
        self.retry("get_cost_center", || self.inner.get_cost_center(cost_center))
            .await
    }

    async fn get_cost_center_allocations(
        &self,
        cost_center: &CostCenterId,
        as_of: NaiveDate,
    ) -> Result<Vec<AllocationShare>, StoreError> {
        self.retry("get_cost_center_allocations", || {
            self.inner.get_cost_center_allocations(cost_center, as_of)
        })
        .await
    }

    async fn get_dimension_definitions(
        &self,
        company: &CompanyId,
        voucher_type: &VoucherType,
    ) -> Result<Vec<DimensionDefinition>, StoreError> {
        self.retry("get_dimension_definitions", || {
            self.inner.get_dimension_definitions(company, voucher_type)
        })
        .await
    }

    async fn get_budget(
        &self,
        account: &AccountId,
        cost_center: Option<&CostCenterId>,
        period: BudgetPeriod,
    ) -> Result<Option<BudgetFigures>, StoreError> {
        self.retry("get_budget", || {
            self.inner.get_budget(account, cost_center, period)
        })
        .await
    }

    async fn get_fiscal_year_start(
        &self,
        company: &CompanyId,
    ) -> Result<Option<NaiveDate>, StoreError> {
        self.retry("get_fiscal_year_start", || {
            self.inner.get_fiscal_year_start(company)
        })
        .await
    }

    async fn find_voucher(
        &self,
        voucher_type: &VoucherType,
        voucher_no: &VoucherNo,
        company: &CompanyId,
    ) -> Result<Option<DocStatus>, StoreError> {
        self.retry("find_voucher", || {
            self.inner.find_voucher(voucher_type, voucher_no, company)
        })
        .await
    }

    async fn get_running_balance(
        &self,
        account: &AccountId,
        as_of: NaiveDate,
    ) -> Result<Decimal, StoreError> {
        self.retry("get_running_balance", || {
            self.inner.get_running_balance(account, as_of)
        })
        .await
    }
}
