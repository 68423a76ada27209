//! Ledger store port.
//!
//! The engine never owns ledger data. The surrounding application supplies a
//! `LedgerStore` and the engine only reads through it.
//!
//! - `error` - Store error types
//! - `memory` - In-memory store for embedding and tests
//! - `retry` - Decorator retrying transient failures with bounded backoff

pub mod error;
pub mod memory;
pub mod retry;

use async_trait::async_trait;
use chrono::NaiveDate;
use glcheck_shared::types::{AccountId, CompanyId, CostCenterId, VoucherNo};
use rust_decimal::Decimal;

use crate::model::{
    Account, AllocationShare, BudgetFigures, BudgetPeriod, CostCenter, DimensionDefinition,
    DocStatus, VoucherType,
};

pub use error::StoreError;
pub use memory::InMemoryLedgerStore;
pub use retry::RetryingStore;

/// Read-only access to ledger master data and balances.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Looks up an account.
    async fn get_account(&self, account: &AccountId) -> Result<Option<Account>, StoreError>;

    /// Looks up a cost center.
    async fn get_cost_center(
        &self,
        cost_center: &CostCenterId,
    ) -> Result<Option<CostCenter>, StoreError>;

    /// Returns the allocation of a cost center in effect on `as_of`.
    ///
    /// An empty list means no allocation applies.
    async fn get_cost_center_allocations(
        &self,
        cost_center: &CostCenterId,
        as_of: NaiveDate,
    ) -> Result<Vec<AllocationShare>, StoreError>;

    /// Returns the dimensions configured for a company and voucher type.
    async fn get_dimension_definitions(
        &self,
        company: &CompanyId,
        voucher_type: &VoucherType,
    ) -> Result<Vec<DimensionDefinition>, StoreError>;

    /// Returns the budget figures for an account, cost center and period.
    async fn get_budget(
        &self,
        account: &AccountId,
        cost_center: Option<&CostCenterId>,
        period: BudgetPeriod,
    ) -> Result<Option<BudgetFigures>, StoreError>;

    /// Returns the start date of the company's current fiscal year.
    async fn get_fiscal_year_start(
        &self,
        company: &CompanyId,
    ) -> Result<Option<NaiveDate>, StoreError>;

    /// Returns the status of a voucher, or `None` if it does not exist.
    async fn find_voucher(
        &self,
        voucher_type: &VoucherType,
        voucher_no: &VoucherNo,
        company: &CompanyId,
    ) -> Result<Option<DocStatus>, StoreError>;

    /// Returns the debit-normal balance of an account as of `as_of`.
    async fn get_running_balance(
        &self,
        account: &AccountId,
        as_of: NaiveDate,
    ) -> Result<Decimal, StoreError>;
}
