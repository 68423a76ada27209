//! Validation codes consumed by UI and audit systems.

use serde::{Deserialize, Serialize};

use super::types::Category;

/// Machine-readable code of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    // ========== System ==========
    /// Validation could not run to completion.
    SystemValidationError,

    // ========== Balance & Integrity ==========
    /// Voucher has no lines.
    NoEntries,
    /// Referenced account does not exist.
    AccountNotFound,
    /// Referenced account is disabled.
    AccountDisabled,
    /// Neither the line nor its account names a currency.
    CurrencyNotResolved,
    /// Line currency differs from the account currency.
    AccountCurrencyMismatch,
    /// Debit or credit is negative.
    NegativeAmount,
    /// Both debit and credit are set on one line.
    DebitAndCreditBothSet,
    /// Neither debit nor credit is set.
    ZeroAmountEntry,
    /// Total debit differs from total credit.
    BalanceMismatch,

    // ========== Cost Center ==========
    /// Cost center missing, unknown, disabled or a group.
    CostCenterValidationError,
    /// Allocation percentages do not total 100.
    CostCenterAllocationError,

    // ========== Dimensions ==========
    /// Mandatory dimension has no value.
    MandatoryDimensionMissing,

    // ========== Budget ==========
    /// Line exceeds its budget and exceedance is not allowed.
    BudgetExceeded,
    /// Line exceeds its budget; exceedance is allowed.
    BudgetExceededWarning,
    /// Budget exceedance needs approval.
    BudgetApprovalRequired,

    // ========== Period & Authorization ==========
    /// Backdated posting is not allowed.
    BackdatedEntryNotAllowed,
    /// Posting date lies further back than the backdate limit.
    BackdateLimitExceeded,
    /// Posting date precedes the fiscal year.
    InvalidFiscalYear,
    /// Voucher total needs approval.
    ApprovalRequired,
    /// Voucher total exceeds the authorization limit.
    AuthorizationLimitExceeded,

    // ========== Advanced Consistency ==========
    /// Linked voucher missing or not submitted.
    InvalidVoucherLinking,
    /// Party type does not match the account type.
    PartyAccountMismatch,
    /// Lines span more than one currency.
    MultiCurrencyVoucher,
    /// A cash account would go negative.
    NegativeCashBalance,
}

impl ValidationCode {
    /// Returns the wire representation of the code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SystemValidationError => "SYSTEM_VALIDATION_ERROR",
            Self::NoEntries => "NO_ENTRIES",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::CurrencyNotResolved => "CURRENCY_NOT_RESOLVED",
            Self::AccountCurrencyMismatch => "ACCOUNT_CURRENCY_MISMATCH",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::DebitAndCreditBothSet => "DEBIT_AND_CREDIT_BOTH_SET",
            Self::ZeroAmountEntry => "ZERO_AMOUNT_ENTRY",
            Self::BalanceMismatch => "BALANCE_MISMATCH",
            Self::CostCenterValidationError => "COST_CENTER_VALIDATION_ERROR",
            Self::CostCenterAllocationError => "COST_CENTER_ALLOCATION_ERROR",
            Self::MandatoryDimensionMissing => "MANDATORY_DIMENSION_MISSING",
            Self::BudgetExceeded => "BUDGET_EXCEEDED",
            Self::BudgetExceededWarning => "BUDGET_EXCEEDED_WARNING",
            Self::BudgetApprovalRequired => "BUDGET_APPROVAL_REQUIRED",
            Self::BackdatedEntryNotAllowed => "BACKDATED_ENTRY_NOT_ALLOWED",
            Self::BackdateLimitExceeded => "BACKDATE_LIMIT_EXCEEDED",
            Self::InvalidFiscalYear => "INVALID_FISCAL_YEAR",
            Self::ApprovalRequired => "APPROVAL_REQUIRED",
            Self::AuthorizationLimitExceeded => "AUTHORIZATION_LIMIT_EXCEEDED",
            Self::InvalidVoucherLinking => "INVALID_VOUCHER_LINKING",
            Self::PartyAccountMismatch => "PARTY_ACCOUNT_MISMATCH",
            Self::MultiCurrencyVoucher => "MULTI_CURRENCY_VOUCHER",
            Self::NegativeCashBalance => "NEGATIVE_CASH_BALANCE",
        }
    }

    /// Returns the category an error with this code belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::SystemValidationError
            | Self::NoEntries
            | Self::AccountNotFound
            | Self::AccountDisabled
            | Self::CurrencyNotResolved
            | Self::AccountCurrencyMismatch
            | Self::NegativeAmount
            | Self::DebitAndCreditBothSet
            | Self::ZeroAmountEntry
            | Self::BalanceMismatch => Category::DataIntegrity,

            Self::CostCenterValidationError
            | Self::CostCenterAllocationError
            | Self::MandatoryDimensionMissing
            | Self::BudgetExceeded
            | Self::BudgetExceededWarning
            | Self::BudgetApprovalRequired
            | Self::BackdatedEntryNotAllowed
            | Self::BackdateLimitExceeded
            | Self::InvalidFiscalYear
            | Self::ApprovalRequired
            | Self::AuthorizationLimitExceeded
            | Self::InvalidVoucherLinking
            | Self::PartyAccountMismatch
            | Self::MultiCurrencyVoucher
            | Self::NegativeCashBalance => Category::BusinessRule,
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
