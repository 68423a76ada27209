//! Voucher domain types submitted for validation.
//!
//! A voucher is an ordered list of GL entry lines booked together on one
//! posting date. None of these types are persisted by the engine.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use glcheck_shared::types::{AccountId, CompanyId, CostCenterId, VoucherNo};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pipeline::ValidationFault;

/// Voucher type classification.
///
/// Serialized with the document names used by the accounting front end
/// (`"Journal Entry"`, `"Sales Invoice"`, ...). Unknown names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VoucherType {
    /// General journal entry.
    JournalEntry,
    /// Incoming or outgoing payment.
    PaymentEntry,
    /// Sales invoice.
    SalesInvoice,
    /// Purchase invoice.
    PurchaseInvoice,
    /// Employee expense claim.
    ExpenseClaim,
    /// Stock movement.
    StockEntry,
    /// Any other document type.
    Other(String),
}

impl VoucherType {
    /// Returns the document name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::JournalEntry => "Journal Entry",
            Self::PaymentEntry => "Payment Entry",
            Self::SalesInvoice => "Sales Invoice",
            Self::PurchaseInvoice => "Purchase Invoice",
            Self::ExpenseClaim => "Expense Claim",
            Self::StockEntry => "Stock Entry",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for VoucherType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Journal Entry" => Self::JournalEntry,
            "Payment Entry" => Self::PaymentEntry,
            "Sales Invoice" => Self::SalesInvoice,
            "Purchase Invoice" => Self::PurchaseInvoice,
            "Expense Claim" => Self::ExpenseClaim,
            "Stock Entry" => Self::StockEntry,
            _ => Self::Other(name),
        }
    }
}

impl From<&str> for VoucherType {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<VoucherType> for String {
    fn from(voucher_type: VoucherType) -> Self {
        match voucher_type {
            VoucherType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of party a line is booked against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartyType {
    /// Customer (receivable side).
    Customer,
    /// Supplier (payable side).
    Supplier,
    /// Employee.
    Employee,
    /// Shareholder.
    Shareholder,
    /// Any other party type.
    Other(String),
}

impl PartyType {
    /// Returns the party type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Customer => "Customer",
            Self::Supplier => "Supplier",
            Self::Employee => "Employee",
            Self::Shareholder => "Shareholder",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for PartyType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Customer" => Self::Customer,
            "Supplier" => Self::Supplier,
            "Employee" => Self::Employee,
            "Shareholder" => Self::Shareholder,
            _ => Self::Other(name),
        }
    }
}

impl From<PartyType> for String {
    fn from(party_type: PartyType) -> Self {
        match party_type {
            PartyType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PartyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One GL line of a proposed voucher.
///
/// Exactly one of `debit`/`credit` is expected to be non-zero; this is
/// checked by the balance phase rather than enforced by the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlEntryInput {
    /// The account to post to.
    pub account: AccountId,
    /// Debit amount (>= 0).
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount (>= 0).
    #[serde(default)]
    pub credit: Decimal,
    /// Cost center the line is booked against.
    #[serde(default)]
    pub cost_center: Option<CostCenterId>,
    /// Kind of party, when the line is booked against one.
    #[serde(default)]
    pub party_type: Option<PartyType>,
    /// Party name.
    #[serde(default)]
    pub party: Option<String>,
    /// Currency the line is expressed in (ISO 4217).
    #[serde(default)]
    pub account_currency: Option<String>,
    /// Document type this line settles or references.
    #[serde(default)]
    pub against_voucher_type: Option<VoucherType>,
    /// Document number this line settles or references.
    #[serde(default)]
    pub against_voucher: Option<VoucherNo>,
    /// Accounting dimension values keyed by dimension field name.
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
}

impl GlEntryInput {
    fn blank(account: AccountId) -> Self {
        Self {
            account,
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            cost_center: None,
            party_type: None,
            party: None,
            account_currency: None,
            against_voucher_type: None,
            against_voucher: None,
            dimensions: BTreeMap::new(),
        }
    }

    /// Creates a debit line.
    #[must_use]
    pub fn debit(account: impl Into<AccountId>, amount: Decimal) -> Self {
        Self {
            debit: amount,
            ..Self::blank(account.into())
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account: impl Into<AccountId>, amount: Decimal) -> Self {
        Self {
            credit: amount,
            ..Self::blank(account.into())
        }
    }

    /// Sets the cost center.
    #[must_use]
    pub fn with_cost_center(mut self, cost_center: impl Into<CostCenterId>) -> Self {
        self.cost_center = Some(cost_center.into());
        self
    }

    /// Sets the party.
    #[must_use]
    pub fn with_party(mut self, party_type: PartyType, party: impl Into<String>) -> Self {
        self.party_type = Some(party_type);
        self.party = Some(party.into());
        self
    }

    /// Sets the line currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.account_currency = Some(currency.into());
        self
    }

    /// Links the line to another voucher.
    #[must_use]
    pub fn against(mut self, voucher_type: VoucherType, voucher_no: impl Into<VoucherNo>) -> Self {
        self.against_voucher_type = Some(voucher_type);
        self.against_voucher = Some(voucher_no.into());
        self
    }

    /// Tags the line with a dimension value.
    #[must_use]
    pub fn with_dimension(
        mut self,
        fieldname: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.dimensions.insert(fieldname.into(), value.into());
        self
    }

    /// The line amount: the larger of debit and credit.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.debit.max(self.credit)
    }

    /// Net effect on a debit-normal balance, or `None` on overflow.
    #[must_use]
    pub fn net_debit(&self) -> Option<Decimal> {
        self.debit.checked_sub(self.credit)
    }

    /// The cost center, ignoring blank names.
    #[must_use]
    pub fn cost_center(&self) -> Option<&CostCenterId> {
        self.cost_center.as_ref().filter(|cc| !cc.is_blank())
    }

    /// The line currency, ignoring blank codes.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.account_currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// The value tagged for a dimension, ignoring blank values.
    #[must_use]
    pub fn dimension_value(&self, fieldname: &str) -> Option<&str> {
        self.dimensions
            .get(fieldname)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// A proposed voucher submitted for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherValidationContext {
    /// The company the voucher is booked for.
    pub company: CompanyId,
    /// The document type.
    pub voucher_type: VoucherType,
    /// The posting date.
    pub posting_date: NaiveDate,
    /// The GL lines, in document order.
    #[serde(default)]
    pub entries: Vec<GlEntryInput>,
}

impl VoucherValidationContext {
    /// Creates a context with no lines.
    #[must_use]
    pub fn new(
        company: impl Into<CompanyId>,
        voucher_type: VoucherType,
        posting_date: NaiveDate,
    ) -> Self {
        Self {
            company: company.into(),
            voucher_type,
            posting_date,
            entries: Vec::new(),
        }
    }

    /// Appends a line.
    #[must_use]
    pub fn with_entry(mut self, entry: GlEntryInput) -> Self {
        self.entries.push(entry);
        self
    }

    /// Parses a context from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFault::MalformedContext` if the document does not parse.
    pub fn from_json(json: &str) -> Result<Self, ValidationFault> {
        serde_json::from_str(json).map_err(|e| ValidationFault::MalformedContext(e.to_string()))
    }

    /// Checks that the context is structurally usable.
    ///
    /// Business problems (unbalanced, unknown accounts, ...) are not faults;
    /// only a context no rule could meaningfully inspect is rejected here.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFault::MalformedContext` describing the first problem.
    pub fn check_structure(&self) -> Result<(), ValidationFault> {
        if self.company.is_blank() {
            return Err(ValidationFault::MalformedContext(
                "company is required".to_string(),
            ));
        }
        if self.voucher_type.as_str().trim().is_empty() {
            return Err(ValidationFault::MalformedContext(
                "voucher type is required".to_string(),
            ));
        }
        if let Some(index) = self.entries.iter().position(|e| e.account.is_blank()) {
            return Err(ValidationFault::MalformedContext(format!(
                "entries[{index}] has no account"
            )));
        }
        Ok(())
    }
}
