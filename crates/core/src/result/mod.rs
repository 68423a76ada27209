//! Structured error/warning taxonomy and the merged validation result.

pub mod codes;
pub mod types;

pub use codes::ValidationCode;
pub use types::{
    BALANCE_TOLERANCE, BudgetCheck, Category, DimensionValidation, Impact, RuleOutcome, Severity,
    ValidationError, ValidationResult, ValidationWarning, VoucherTotals, entry_field,
};
