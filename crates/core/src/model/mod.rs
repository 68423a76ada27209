//! Voucher input and ledger master data types.

pub mod master;
pub mod voucher;

pub use master::{
    Account, AccountType, AllocationShare, BudgetFigures, BudgetKey, BudgetPeriod, CostCenter,
    DimensionDefinition, DocStatus,
};
pub use voucher::{GlEntryInput, PartyType, VoucherType, VoucherValidationContext};
