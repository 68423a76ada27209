//! Validation findings and the merged validation result.

use std::collections::HashSet;

use glcheck_shared::types::{AccountId, CostCenterId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::codes::ValidationCode;
use crate::model::BudgetPeriod;
use crate::pipeline::ValidationFault;
use crate::rules::Phase;

/// Largest debit/credit difference still treated as balanced.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Severity of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks posting.
    Error,
    /// Informational; does not block posting.
    Warning,
}

/// Category of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Structural problems: unbalanced voucher, missing account.
    DataIntegrity,
    /// Policy violations: cost center, budget, period, authorization.
    BusinessRule,
}

/// Impact of a validation warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Cosmetic.
    Low,
    /// Worth a review.
    Medium,
    /// Gating (e.g. approval needed).
    High,
}

/// A validation error record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Machine-readable code.
    pub code: ValidationCode,
    /// Field path the error refers to (e.g. `entries[1].cost_center`).
    pub field: String,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub severity: Severity,
    /// Category.
    pub category: Category,
}

/// A validation warning record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Machine-readable code.
    pub code: ValidationCode,
    /// Field path the warning refers to.
    pub field: String,
    /// Human-readable message.
    pub message: String,
    /// Impact.
    pub impact: Impact,
}

/// Debit and credit totals of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherTotals {
    /// Sum of all debits.
    pub total_debit: Decimal,
    /// Sum of all credits.
    pub total_credit: Decimal,
    /// `total_debit - total_credit`.
    pub difference: Decimal,
    /// Whether the difference is within `BALANCE_TOLERANCE`.
    pub is_balanced: bool,
}

impl VoucherTotals {
    /// Creates totals from debit and credit sums.
    ///
    /// Returns `None` if the difference does not fit in a `Decimal`.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Option<Self> {
        let difference = total_debit.checked_sub(total_credit)?;
        Some(Self {
            total_debit,
            total_credit,
            difference,
            is_balanced: difference.abs() <= BALANCE_TOLERANCE,
        })
    }
}

/// Per-entry, per-dimension validation breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValidation {
    /// Index of the entry in the voucher.
    pub entry_index: usize,
    /// Dimension field name.
    pub fieldname: String,
    /// Dimension label.
    pub label: String,
    /// The value found on the entry.
    pub value: Option<String>,
    /// Whether the dimension is mandatory.
    pub is_mandatory: bool,
    /// `!is_mandatory || value.is_some()`.
    pub is_valid: bool,
}

/// Budget figures computed for one expense entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCheck {
    /// Index of the entry in the voucher.
    pub entry_index: usize,
    /// The expense account.
    pub account: AccountId,
    /// The cost center the budget was looked up for.
    pub cost_center: Option<CostCenterId>,
    /// The budget period.
    pub period: BudgetPeriod,
    /// Budgeted amount.
    pub budget_amount: Decimal,
    /// Actual amount compared against the budget.
    pub actual_amount: Decimal,
    /// `actual - budget`.
    pub variance: Decimal,
    /// `variance / budget * 100`.
    pub variance_percentage: Decimal,
    /// Whether the variance percentage is above the threshold.
    pub exceeds_limit: bool,
}

/// Findings emitted by a single rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Errors.
    pub errors: Vec<ValidationError>,
    /// Warnings.
    pub warnings: Vec<ValidationWarning>,
    /// Remediation hints.
    pub suggestions: Vec<String>,
    /// Voucher totals, reported by the balance phase.
    pub totals: Option<VoucherTotals>,
    /// Dimension breakdown, reported by the dimension phase.
    pub dimensions: Vec<DimensionValidation>,
    /// Budget figures, reported by the budget phase.
    pub budget_checks: Vec<BudgetCheck>,
}

impl RuleOutcome {
    /// Records a blocking error; the category follows from the code.
    pub fn error(
        &mut self,
        code: ValidationCode,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(ValidationError {
            code,
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
            category: code.category(),
        });
    }

    /// Records a warning.
    pub fn warning(
        &mut self,
        code: ValidationCode,
        field: impl Into<String>,
        message: impl Into<String>,
        impact: Impact,
    ) {
        self.warnings.push(ValidationWarning {
            code,
            field: field.into(),
            message: message.into(),
            impact,
        });
    }

    /// Records a remediation hint.
    pub fn suggest(&mut self, suggestion: impl Into<String>) {
        self.suggestions.push(suggestion.into());
    }

    /// Returns true if any error code matches.
    #[must_use]
    pub fn has_error(&self, code: ValidationCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Returns true if any warning code matches.
    #[must_use]
    pub fn has_warning(&self, code: ValidationCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// Field path of an entry attribute.
#[must_use]
pub fn entry_field(index: usize, name: &str) -> String {
    format!("entries[{index}].{name}")
}

/// The merged outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no error has severity `error`.
    pub is_valid: bool,
    /// Errors, ordered by phase then entry.
    pub errors: Vec<ValidationError>,
    /// Warnings, ordered by phase then entry.
    pub warnings: Vec<ValidationWarning>,
    /// De-duplicated remediation hints, in first-seen order.
    pub suggestions: Vec<String>,
    /// Voucher totals, when the balance phase ran.
    pub totals: Option<VoucherTotals>,
    /// Dimension breakdown.
    pub dimensions: Vec<DimensionValidation>,
    /// Budget figures.
    pub budget_checks: Vec<BudgetCheck>,
    /// Phases that ran, in order.
    pub phases: Vec<Phase>,
}

impl ValidationResult {
    /// Merges rule outcomes in phase order.
    ///
    /// Outcomes of the same phase keep their relative order.
    #[must_use]
    pub fn from_phases(mut outcomes: Vec<(Phase, RuleOutcome)>) -> Self {
        outcomes.sort_by_key(|(phase, _)| phase.index());

        let mut result = Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            totals: None,
            dimensions: Vec::new(),
            budget_checks: Vec::new(),
            phases: Vec::with_capacity(outcomes.len()),
        };
        let mut seen = HashSet::new();

        for (phase, outcome) in outcomes {
            result.phases.push(phase);
            result.errors.extend(outcome.errors);
            result.warnings.extend(outcome.warnings);
            for suggestion in outcome.suggestions {
                if seen.insert(suggestion.clone()) {
                    result.suggestions.push(suggestion);
                }
            }
            if outcome.totals.is_some() {
                result.totals = outcome.totals;
            }
            result.dimensions.extend(outcome.dimensions);
            result.budget_checks.extend(outcome.budget_checks);
        }

        result.is_valid = !result
            .errors
            .iter()
            .any(|e| e.severity == Severity::Error);
        result
    }

    /// Builds the single synthetic error returned when validation cannot complete.
    #[must_use]
    pub fn from_fault(fault: &ValidationFault) -> Self {
        Self {
            is_valid: false,
            errors: vec![ValidationError {
                code: ValidationCode::SystemValidationError,
                field: "voucher".to_string(),
                message: fault.to_string(),
                severity: Severity::Error,
                category: Category::DataIntegrity,
            }],
            warnings: Vec::new(),
            suggestions: Vec::new(),
            totals: None,
            dimensions: Vec::new(),
            budget_checks: Vec::new(),
            phases: Vec::new(),
        }
    }

    /// Returns the codes of all errors, in order.
    #[must_use]
    pub fn error_codes(&self) -> Vec<ValidationCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    /// Returns the codes of all warnings, in order.
    #[must_use]
    pub fn warning_codes(&self) -> Vec<ValidationCode> {
        self.warnings.iter().map(|w| w.code).collect()
    }
}
