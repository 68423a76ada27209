//! General ledger entry validation engine.
//!
//! Decides whether a proposed voucher may be posted. The engine reads ledger
//! master data through a caller-supplied `LedgerStore` and never writes to it.
//!
//! # Modules
//!
//! - `model` - Voucher input and ledger master data
//! - `store` - Ledger store port, in-memory store, retrying decorator
//! - `lookup` - Timeout-guarded, cached access to the store
//! - `rules` - One rule per validation phase
//! - `result` - Validation codes, findings and the merged result
//! - `pipeline` - The validator that runs the rules

pub mod lookup;
pub mod model;
pub mod pipeline;
pub mod result;
pub mod rules;
pub mod store;

pub use lookup::{LookupCache, Lookups};
pub use model::{
    Account, AccountType, AllocationShare, BudgetFigures, BudgetPeriod, CostCenter,
    DimensionDefinition, DocStatus, GlEntryInput, PartyType, VoucherType,
    VoucherValidationContext,
};
pub use pipeline::{Clock, FixedClock, GlValidator, SystemClock, ValidationFault};
pub use result::{
    Category, Impact, Severity, ValidationCode, ValidationError, ValidationResult,
    ValidationWarning,
};
pub use rules::{Phase, Rule, RuleContext};
pub use store::{InMemoryLedgerStore, LedgerStore, RetryingStore, StoreError};
