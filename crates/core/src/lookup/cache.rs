//! Lookup caching using Moka.
//!
//! Read-through memoization of ledger master data. Population happens on a
//! miss and is idempotent; concurrent misses for the same key share one load.
//! Entries live until `clear` is called, except account snapshots which also
//! expire after a short TTL.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use glcheck_shared::config::CacheSettings;
use glcheck_shared::types::{AccountId, CompanyId, CostCenterId};
use moka::future::Cache;

use crate::model::{
    Account, AllocationShare, BudgetFigures, BudgetKey, CostCenter, DimensionDefinition,
    VoucherType,
};

/// Caches for ledger master data, owned by one validator instance.
///
/// Cloning is cheap and clones share the same underlying storage.
#[derive(Clone)]
pub struct LookupCache {
    pub(crate) accounts: Cache<AccountId, Option<Account>>,
    pub(crate) cost_centers: Cache<CostCenterId, Option<CostCenter>>,
    pub(crate) allocations: Cache<(CostCenterId, NaiveDate), Arc<Vec<AllocationShare>>>,
    pub(crate) dimensions: Cache<(CompanyId, VoucherType), Arc<Vec<DimensionDefinition>>>,
    pub(crate) budgets: Cache<BudgetKey, Option<BudgetFigures>>,
}

impl LookupCache {
    /// Creates caches with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(&CacheSettings::default())
    }

    /// Creates caches with custom settings.
    ///
    /// # Arguments
    ///
    /// * `settings` - Per-cache entry capacity and the account snapshot TTL
    #[must_use]
    pub fn with_settings(settings: &CacheSettings) -> Self {
        let capacity = settings.max_capacity;
        Self {
            accounts: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(Duration::from_secs(settings.account_ttl_secs))
                .build(),
            cost_centers: Cache::new(capacity),
            allocations: Cache::new(capacity),
            dimensions: Cache::new(capacity),
            budgets: Cache::new(capacity),
        }
    }

    /// Invalidates every cached entry.
    pub fn clear(&self) {
        self.accounts.invalidate_all();
        self.cost_centers.invalidate_all();
        self.allocations.invalidate_all();
        self.dimensions.invalidate_all();
        self.budgets.invalidate_all();
    }

    /// Returns the number of entries currently cached across all caches.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.accounts.entry_count()
            + self.cost_centers.entry_count()
            + self.allocations.entry_count()
            + self.dimensions.entry_count()
            + self.budgets.entry_count()
    }

    /// Runs cache maintenance tasks.
    ///
    /// Moka applies invalidations and evictions lazily; calling this makes
    /// `entry_count` reflect them immediately.
    pub async fn run_pending_tasks(&self) {
        self.accounts.run_pending_tasks().await;
        self.cost_centers.run_pending_tasks().await;
        self.allocations.run_pending_tasks().await;
        self.dimensions.run_pending_tasks().await;
        self.budgets.run_pending_tasks().await;
    }
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LookupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupCache")
            .field("entries", &self.entry_count())
            .finish()
    }
}
