//! Ledger master data read from the store.
//!
//! These are snapshots owned by the ledger store. The engine only reads them.

use chrono::{Datelike, NaiveDate};
use glcheck_shared::types::{AccountId, CostCenterId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account classification relevant to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Generic asset.
    Asset,
    /// Generic liability.
    Liability,
    /// Equity.
    Equity,
    /// Income.
    Income,
    /// Expense (profit and loss).
    Expense,
    /// Cash in hand.
    Cash,
    /// Bank account.
    Bank,
    /// Trade receivables.
    Receivable,
    /// Trade payables.
    Payable,
    /// Tax account.
    Tax,
    /// Stock / inventory.
    Stock,
    /// Anything else.
    Other,
}

impl AccountType {
    /// Returns the display name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Cash => "Cash",
            Self::Bank => "Bank",
            Self::Receivable => "Receivable",
            Self::Payable => "Payable",
            Self::Tax => "Tax",
            Self::Stock => "Stock",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Whether the account is disabled.
    pub is_disabled: bool,
    /// Account currency, if one is fixed.
    pub currency: Option<String>,
}

impl Account {
    /// Creates an enabled account with the given currency.
    #[must_use]
    pub fn new(id: impl Into<AccountId>, account_type: AccountType, currency: &str) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            account_type,
            is_disabled: false,
            currency: Some(currency.to_string()),
        }
    }

    /// Marks the account disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.is_disabled = true;
        self
    }

    /// Clears the fixed currency.
    #[must_use]
    pub fn without_currency(mut self) -> Self {
        self.currency = None;
        self
    }
}

/// Cost center record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCenter {
    /// The cost center ID.
    pub id: CostCenterId,
    /// Display name.
    pub name: String,
    /// Whether this is a group node of the cost center tree.
    pub is_group: bool,
    /// Whether the cost center is disabled.
    pub is_disabled: bool,
}

impl CostCenter {
    /// Creates an enabled leaf cost center.
    #[must_use]
    pub fn new(id: impl Into<CostCenterId>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            is_group: false,
            is_disabled: false,
        }
    }

    /// Marks the cost center as a group node.
    #[must_use]
    pub fn group(mut self) -> Self {
        self.is_group = true;
        self
    }

    /// Marks the cost center disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.is_disabled = true;
        self
    }
}

/// One share of a cost center allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationShare {
    /// Receiving cost center.
    pub cost_center: CostCenterId,
    /// Percentage of the amount distributed to it.
    pub percentage: Decimal,
}

impl AllocationShare {
    /// Creates an allocation share.
    #[must_use]
    pub fn new(cost_center: impl Into<CostCenterId>, percentage: Decimal) -> Self {
        Self {
            cost_center: cost_center.into(),
            percentage,
        }
    }
}

/// Accounting dimension configured for a company and voucher type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDefinition {
    /// Field name the value is stored under on each entry.
    pub fieldname: String,
    /// Display label.
    pub label: String,
    /// Whether every entry must carry a value.
    pub is_mandatory: bool,
    /// Whether the dimension is switched off.
    pub is_disabled: bool,
}

impl DimensionDefinition {
    /// Creates an enabled dimension.
    #[must_use]
    pub fn new(fieldname: &str, label: &str, is_mandatory: bool) -> Self {
        Self {
            fieldname: fieldname.to_string(),
            label: label.to_string(),
            is_mandatory,
            is_disabled: false,
        }
    }
}

/// Budget period a posting date falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BudgetPeriod {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

impl BudgetPeriod {
    /// Returns the monthly period containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Budget figures for an account, cost center and period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetFigures {
    /// Budgeted amount.
    pub budget_amount: Decimal,
    /// Amount already booked in the period.
    pub actual_amount: Decimal,
}

/// Identifies a budget: account, optional cost center and month.
pub type BudgetKey = (AccountId, Option<CostCenterId>, BudgetPeriod);

/// Document status of a voucher in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    /// Saved but not submitted (docstatus 0).
    Draft,
    /// Submitted and posted (docstatus 1).
    Submitted,
    /// Cancelled (docstatus 2).
    Cancelled,
}

impl DocStatus {
    /// Returns the status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_period_containing() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        let period = BudgetPeriod::containing(date);
        assert_eq!(period, BudgetPeriod { year: 2026, month: 2 });
        assert_eq!(period.to_string(), "2026-02");
    }

    #[test]
    fn test_doc_status_names() {
        for status in [DocStatus::Draft, DocStatus::Submitted, DocStatus::Cancelled] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_account_builders() {
        let account = Account::new("Petty Cash", AccountType::Cash, "USD").disabled();
        assert!(account.is_disabled);
        assert_eq!(account.name, "Petty Cash");
        assert!(Account::new("X", AccountType::Asset, "USD")
            .without_currency()
            .currency
            .is_none());
    }
}
