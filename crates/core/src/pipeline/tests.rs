//! End-to-end tests of the validation pipeline.

use std::sync::Arc;
use std::time::Duration;

use glcheck_shared::types::CostCenterId;
use futures::future::join;
use glcheck_shared::{EngineSettings, ErpValidationConfig};
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::model::{BudgetFigures, BudgetPeriod, DimensionDefinition, GlEntryInput, VoucherType};
use crate::result::{Category, ValidationCode, ValidationResult};
use crate::rules::Phase;
use crate::rules::fixtures::{COMPANY, chart, date, today, voucher};
use crate::store::{InMemoryLedgerStore, RetryingStore};

fn validator(store: InMemoryLedgerStore, policy: ErpValidationConfig) -> GlValidator {
    GlValidator::new(Arc::new(store), policy).with_clock(FixedClock(today()))
}

fn counting_validator(store: &Arc<InMemoryLedgerStore>) -> GlValidator {
    GlValidator::new(store.clone(), ErpValidationConfig::default()).with_clock(FixedClock(today()))
}

fn asset_purchase(amount: rust_decimal::Decimal) -> Vec<GlEntryInput> {
    vec![
        GlEntryInput::debit("Equipment", amount),
        GlEntryInput::credit("Capital", amount),
    ]
}

fn assert_system_error(result: &ValidationResult, needle: &str) {
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ValidationCode::SystemValidationError);
    assert_eq!(result.errors[0].category, Category::DataIntegrity);
    assert!(
        result.errors[0].message.contains(needle),
        "{} does not mention {needle}",
        result.errors[0].message
    );
    assert!(result.warnings.is_empty());
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[tokio::test]
async fn test_balanced_asset_purchase_is_valid() {
    let validator = validator(chart(), ErpValidationConfig::default());

    let result = validator.validate_voucher(&voucher(asset_purchase(dec!(100)))).await;

    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
    assert_eq!(result.phases, Phase::ALL.to_vec());
    assert_eq!(result.totals.map(|t| t.total_credit), Some(dec!(100)));
}

#[tokio::test]
async fn test_expense_without_cost_center() {
    let validator = validator(chart(), ErpValidationConfig::default());

    let result = validator
        .validate_voucher(&voucher(vec![
            GlEntryInput::debit("Rent", dec!(100)),
            GlEntryInput::credit("Bank", dec!(100)),
        ]))
        .await;

    assert!(!result.is_valid);
    assert_eq!(result.error_codes(), vec![ValidationCode::CostCenterValidationError]);
    assert_eq!(result.errors[0].category, Category::BusinessRule);
}

#[tokio::test]
async fn test_cash_overdraft() {
    let store = chart().with_movement("Cash", date(2026, 3, 1), dec!(50));
    let validator = validator(store, ErpValidationConfig::default());

    let result = validator
        .validate_voucher(&voucher(vec![
            GlEntryInput::debit("Rent", dec!(80)).with_cost_center("Main"),
            GlEntryInput::credit("Cash", dec!(80)),
        ]))
        .await;

    assert!(!result.is_valid);
    assert_eq!(result.error_codes(), vec![ValidationCode::NegativeCashBalance]);
}

#[tokio::test]
async fn test_large_voucher_needs_approval_but_is_valid() {
    let mut policy = ErpValidationConfig::default();
    policy.authorization_rules.max_amount_without_approval = dec!(10000);
    let validator = validator(chart(), policy);

    let result = validator
        .validate_voucher(&voucher(asset_purchase(dec!(7500))))
        .await;

    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    assert_eq!(result.warning_codes(), vec![ValidationCode::ApprovalRequired]);
}

// ============================================================================
// Merging and ordering
// ============================================================================

#[tokio::test]
async fn test_findings_are_ordered_by_phase() {
    let validator = validator(chart(), ErpValidationConfig::default());
    let mut context = voucher(vec![
        GlEntryInput::debit("Rent", dec!(100)),
        GlEntryInput::credit("Bank", dec!(90)),
    ]);
    context.posting_date = date(2026, 1, 10);

    let first = validator.validate_voucher(&context).await;
    let second = validator.validate_voucher(&context).await;

    assert_eq!(
        first.error_codes(),
        vec![
            ValidationCode::BalanceMismatch,
            ValidationCode::CostCenterValidationError,
            ValidationCode::BackdateLimitExceeded,
        ]
    );
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_empty_voucher_still_runs_every_phase() {
    let validator = validator(chart(), ErpValidationConfig::default());

    let result = validator.validate_voucher(&voucher(vec![])).await;

    assert_eq!(result.error_codes(), vec![ValidationCode::NoEntries]);
    assert_eq!(result.phases.len(), Phase::ALL.len());
}

#[tokio::test]
async fn test_result_carries_budget_and_dimension_breakdown() {
    let store = chart()
        .with_dimension(
            COMPANY,
            VoucherType::JournalEntry,
            DimensionDefinition::new("project", "Project", true),
        )
        .with_budget(
            "Travel",
            Some(CostCenterId::new("Main")),
            BudgetPeriod::containing(today()),
            BudgetFigures {
                budget_amount: dec!(1000),
                actual_amount: dec!(0),
            },
        );
    let validator = validator(store, ErpValidationConfig::default());

    let result = validator
        .validate_voucher(&voucher(vec![
            GlEntryInput::debit("Travel", dec!(1500))
                .with_cost_center("Main")
                .with_dimension("project", "PRJ-7"),
            GlEntryInput::credit("Bank", dec!(1500)),
        ]))
        .await;

    assert_eq!(
        result.error_codes(),
        vec![
            ValidationCode::MandatoryDimensionMissing,
            ValidationCode::BudgetExceeded,
        ]
    );
    assert_eq!(result.warning_codes(), vec![ValidationCode::BudgetApprovalRequired]);
    assert_eq!(result.dimensions.len(), 2);
    assert_eq!(result.budget_checks.len(), 1);
    assert_eq!(result.budget_checks[0].variance_percentage, dec!(50));
    assert!(!result.suggestions.is_empty());
}

#[tokio::test]
async fn test_enhanced_uses_the_given_policy() {
    let validator = validator(chart(), ErpValidationConfig::default());
    let context = voucher(vec![
        GlEntryInput::debit("Rent", dec!(100)),
        GlEntryInput::credit("Bank", dec!(100)),
    ]);
    let mut relaxed = ErpValidationConfig::default();
    relaxed.cost_center_rules.require_for_pl = false;

    assert!(!validator.validate_voucher(&context).await.is_valid);
    assert!(validator.validate_voucher_enhanced(&context, &relaxed).await.is_valid);
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn test_repeated_validation_hits_the_cache() {
    let store = Arc::new(chart());
    let validator = counting_validator(&store);
    let context = voucher(asset_purchase(dec!(100)));

    validator.validate_voucher(&context).await;
    let after_first = store.calls();
    validator.validate_voucher(&context).await;

    // Only the fiscal year lookup is uncached.
    assert_eq!(store.calls() - after_first, 1);
}

#[tokio::test]
async fn test_clear_cache_forces_reload() {
    let store = Arc::new(chart());
    let validator = counting_validator(&store);
    let context = voucher(asset_purchase(dec!(100)));

    validator.validate_voucher(&context).await;
    let first_run = store.calls();
    validator.cache().run_pending_tasks().await;
    assert!(validator.cache().entry_count() > 0);

    validator.clear_cache();
    validator.cache().run_pending_tasks().await;
    assert_eq!(validator.cache().entry_count(), 0);

    validator.validate_voucher(&context).await;
    assert_eq!(store.calls(), first_run * 2);
}

#[tokio::test]
async fn test_concurrent_validations_share_the_cache() {
    let context = voucher(vec![
        GlEntryInput::debit("Rent", dec!(100)).with_cost_center("Main"),
        GlEntryInput::credit("Bank", dec!(100)),
    ]);

    let reference = Arc::new(chart());
    let expected = counting_validator(&reference).validate_voucher(&context).await;
    let single_run = reference.calls();

    let store = Arc::new(chart().with_latency(Duration::from_millis(50)));
    let validator = counting_validator(&store);
    let (first, second) = join(
        validator.validate_voucher(&context),
        validator.validate_voucher(&context),
    )
    .await;

    assert!(expected.is_valid);
    assert_eq!(first, expected);
    assert_eq!(second, expected);
    // Cached keys load once across both runs; the fiscal year lookup runs per run.
    assert_eq!(store.calls(), single_run + 1);
}

// ============================================================================
// Faults
// ============================================================================

#[tokio::test]
async fn test_store_timeout_becomes_system_error() {
    let mut settings = EngineSettings::default();
    settings.store.timeout_ms = 20;
    let store = chart().with_latency(Duration::from_millis(500));
    let validator =
        GlValidator::with_settings(Arc::new(store), ErpValidationConfig::default(), &settings)
            .with_clock(FixedClock(today()));

    let result = validator
        .validate_voucher(&voucher(asset_purchase(dec!(100))))
        .await;

    assert_system_error(&result, "timed out");
}

#[tokio::test]
async fn test_store_failure_becomes_system_error() {
    let validator = validator(chart().with_transient_failures(100), ErpValidationConfig::default());

    let result = validator
        .validate_voucher(&voucher(asset_purchase(dec!(100))))
        .await;

    assert_system_error(&result, "unavailable");
}

#[tokio::test]
async fn test_transient_failures_are_retried_by_the_decorator() {
    let store = RetryingStore::new(chart().with_transient_failures(2), 2, Duration::from_millis(1));
    let validator = GlValidator::new(Arc::new(store), ErpValidationConfig::default())
        .with_clock(FixedClock(today()));

    let result = validator
        .validate_voucher(&voucher(asset_purchase(dec!(100))))
        .await;

    assert!(result.is_valid);
}

#[tokio::test]
async fn test_pre_cancelled_token() {
    let validator = validator(chart(), ErpValidationConfig::default());
    let token = CancellationToken::new();
    token.cancel();

    let result = validator
        .validate_voucher_cancellable(&voucher(asset_purchase(dec!(100))), &token)
        .await;

    assert_system_error(&result, "cancelled");
}

#[tokio::test]
async fn test_cancellation_abandons_slow_store_calls() {
    let validator = validator(
        chart().with_latency(Duration::from_secs(2)),
        ErpValidationConfig::default(),
    );
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let result = validator
        .validate_voucher_cancellable(&voucher(asset_purchase(dec!(100))), &token)
        .await;

    assert_system_error(&result, "cancelled");
}

#[tokio::test]
async fn test_uncancelled_token_validates_normally() {
    let validator = validator(chart(), ErpValidationConfig::default());

    let result = validator
        .validate_voucher_cancellable(
            &voucher(asset_purchase(dec!(100))),
            &CancellationToken::new(),
        )
        .await;

    assert!(result.is_valid);
}

#[tokio::test]
async fn test_malformed_context() {
    let validator = validator(chart(), ErpValidationConfig::default());
    let mut context = voucher(asset_purchase(dec!(100)));
    context.company = "  ".into();

    let result = validator.validate_voucher(&context).await;
    assert_system_error(&result, "company");
}

#[tokio::test]
async fn test_invalid_policy() {
    let validator = validator(chart(), ErpValidationConfig::default());
    let mut policy = ErpValidationConfig::default();
    policy.budget_rules.budget_exceedance_threshold = dec!(-5);

    let result = validator
        .validate_voucher_enhanced(&voucher(asset_purchase(dec!(100))), &policy)
        .await;
    assert_system_error(&result, "budget_exceedance_threshold");
}

#[tokio::test]
async fn test_budget_variance_out_of_range() {
    let store = chart().with_budget(
        "Travel",
        Some(CostCenterId::new("Main")),
        BudgetPeriod::containing(today()),
        BudgetFigures {
            budget_amount: dec!(0.0001),
            actual_amount: dec!(0),
        },
    );
    let validator = validator(store, ErpValidationConfig::default());
    let amount = dec!(10000000000000000000000000);

    let result = validator
        .validate_voucher(&voucher(vec![
            GlEntryInput::debit("Travel", amount).with_cost_center("Main"),
            GlEntryInput::credit("Bank", amount),
        ]))
        .await;

    assert_system_error(&result, "budget variance of Travel");
}

// ============================================================================
// JSON entry point
// ============================================================================

#[tokio::test]
async fn test_validate_json() {
    let validator = validator(chart(), ErpValidationConfig::default());
    let json = r#"{
        "company": "ACME",
        "voucher_type": "Journal Entry",
        "posting_date": "2026-03-15",
        "entries": [
            {"account": "Equipment", "debit": "250.00"},
            {"account": "Capital", "credit": "250.00"}
        ]
    }"#;

    let result = validator.validate_json(json).await;
    assert!(result.is_valid);
}

#[tokio::test]
async fn test_validate_json_rejects_garbage() {
    let validator = validator(chart(), ErpValidationConfig::default());

    let result = validator.validate_json(r#"{"company": "ACME""#).await;
    assert_system_error(&result, "Malformed");
}

#[tokio::test]
async fn test_validate_json_with_out_of_range_totals() {
    let validator = validator(chart(), ErpValidationConfig::default());
    let json = r#"{
        "company": "ACME",
        "voucher_type": "Journal Entry",
        "posting_date": "2026-03-15",
        "entries": [
            {"account": "Equipment", "debit": "50000000000000000000000000000"},
            {"account": "Equipment", "debit": "50000000000000000000000000000"}
        ]
    }"#;

    let result = validator.validate_json(json).await;
    assert_system_error(&result, "out of range");
}
