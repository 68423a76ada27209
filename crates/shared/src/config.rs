//! Configuration management.
//!
//! Two independent groups are loaded together:
//! - `engine` - runtime knobs for caching, store timeouts and retries
//! - `policy` - the business-rule toggles and thresholds applied to vouchers
//!
//! Policy field names also accept the camelCase spelling used by the
//! accounting front end (`requireForPL`, `budgetExceedanceThreshold`, ...).

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Engine runtime settings.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Validation policy.
    #[serde(default)]
    pub policy: ErpValidationConfig,
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, then `GLCHECK__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails its range checks.
    pub fn load() -> ConfigResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("GLCHECK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::checked(config)
    }

    /// Loads configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or fails its range checks.
    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?;

        Self::checked(config)
    }

    fn checked(config: config::Config) -> ConfigResult<Self> {
        let loaded: Self = config.try_deserialize()?;
        loaded.engine.validate()?;
        loaded.policy.validate()?;
        Ok(loaded)
    }
}

// ============================================================================
// Engine settings
// ============================================================================

/// Runtime settings for the validation engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineSettings {
    /// Lookup cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
    /// Ledger store access settings.
    #[serde(default)]
    pub store: StoreSettings,
}

impl EngineSettings {
    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSetting` for the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cache.max_capacity == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "cache.max_capacity",
                reason: "must be positive".into(),
            });
        }
        if self.store.timeout_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "store.timeout_ms",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Lookup cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of entries per cache.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Time-to-live for account snapshots, in seconds.
    #[serde(default = "default_account_ttl")]
    pub account_ttl_secs: u64,
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_account_ttl() -> u64 {
    60
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            account_ttl_secs: default_account_ttl(),
        }
    }
}

/// Ledger store access settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Timeout applied to every store call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries attempted for transient store failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    50
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

// ============================================================================
// Validation policy
// ============================================================================

/// Validation policy for one company.
///
/// Constructed once per validator instance and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErpValidationConfig {
    /// Cost center policy.
    #[serde(default, alias = "costCenterRules")]
    pub cost_center_rules: CostCenterRules,
    /// Accounting dimension policy.
    #[serde(default, alias = "dimensionRules")]
    pub dimension_rules: DimensionRules,
    /// Budget control policy.
    #[serde(default, alias = "budgetRules")]
    pub budget_rules: BudgetRules,
    /// Posting period policy.
    #[serde(default, alias = "periodRules")]
    pub period_rules: PeriodRules,
    /// Authorization limit policy.
    #[serde(default, alias = "authorizationRules")]
    pub authorization_rules: AuthorizationRules,
}

impl ErpValidationConfig {
    /// Checks that thresholds and limits are within range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPolicy` for the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.budget_rules.budget_exceedance_threshold.is_sign_negative() {
            return Err(ConfigError::InvalidPolicy {
                field: "budget_rules.budget_exceedance_threshold",
                reason: "must not be negative".into(),
            });
        }
        if self
            .authorization_rules
            .max_amount_without_approval
            .is_sign_negative()
        {
            return Err(ConfigError::InvalidPolicy {
                field: "authorization_rules.max_amount_without_approval",
                reason: "must not be negative".into(),
            });
        }
        Ok(())
    }
}

fn enabled() -> bool {
    true
}

/// Cost center policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CostCenterRules {
    /// Expense lines must carry a cost center.
    #[serde(default = "enabled", alias = "requireForPL")]
    pub require_for_pl: bool,
    /// Group cost centers may be booked against directly.
    #[serde(default, alias = "allowGroupCostCenter")]
    pub allow_group_cost_center: bool,
    /// Allocation percentages must total 100.
    #[serde(default = "enabled", alias = "validateAllocation")]
    pub validate_allocation: bool,
}

impl Default for CostCenterRules {
    fn default() -> Self {
        Self {
            require_for_pl: true,
            allow_group_cost_center: false,
            validate_allocation: true,
        }
    }
}

/// Accounting dimension policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DimensionRules {
    /// Mandatory dimensions must carry a value.
    #[serde(default = "enabled", alias = "validateMandatoryDimensions")]
    pub validate_mandatory_dimensions: bool,
}

impl Default for DimensionRules {
    fn default() -> Self {
        Self {
            validate_mandatory_dimensions: true,
        }
    }
}

/// Budget control policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BudgetRules {
    /// Budget checks run at all.
    #[serde(default = "enabled", alias = "enableBudgetValidation")]
    pub enable_budget_validation: bool,
    /// Variance percentage above which a line exceeds its budget.
    #[serde(
        default = "default_budget_exceedance_threshold",
        alias = "budgetExceedanceThreshold"
    )]
    pub budget_exceedance_threshold: Decimal,
    /// Exceeding lines produce a warning instead of an error.
    #[serde(default, alias = "allowBudgetExceedance")]
    pub allow_budget_exceedance: bool,
    /// Already-booked actuals are added to the line amount.
    #[serde(default, alias = "includeBookedActuals")]
    pub include_booked_actuals: bool,
}

fn default_budget_exceedance_threshold() -> Decimal {
    Decimal::TEN
}

impl Default for BudgetRules {
    fn default() -> Self {
        Self {
            enable_budget_validation: true,
            budget_exceedance_threshold: default_budget_exceedance_threshold(),
            allow_budget_exceedance: false,
            include_booked_actuals: false,
        }
    }
}

/// Posting period policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeriodRules {
    /// Posting dates before today are accepted.
    #[serde(default = "enabled", alias = "allowBackdatedEntries")]
    pub allow_backdated_entries: bool,
    /// How many days back a posting date may lie.
    #[serde(default = "default_backdate_limit", alias = "backdateLimit")]
    pub backdate_limit: u32,
    /// Posting dates must not precede the fiscal year start.
    #[serde(default = "enabled", alias = "validateFiscalYear")]
    pub validate_fiscal_year: bool,
}

fn default_backdate_limit() -> u32 {
    30
}

impl Default for PeriodRules {
    fn default() -> Self {
        Self {
            allow_backdated_entries: true,
            backdate_limit: default_backdate_limit(),
            validate_fiscal_year: true,
        }
    }
}

/// Authorization limit policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizationRules {
    /// Voucher totals are compared against the approval limit.
    #[serde(default = "enabled", alias = "enforceAuthorizationLimits")]
    pub enforce_authorization_limits: bool,
    /// Largest voucher total that needs no approval.
    #[serde(
        default = "default_max_amount_without_approval",
        alias = "maxAmountWithoutApproval"
    )]
    pub max_amount_without_approval: Decimal,
    /// Totals above the limit request approval instead of failing.
    #[serde(default = "enabled", alias = "requireApprovalAboveLimit")]
    pub require_approval_above_limit: bool,
}

fn default_max_amount_without_approval() -> Decimal {
    Decimal::from(100_000)
}

impl Default for AuthorizationRules {
    fn default() -> Self {
        Self {
            enforce_authorization_limits: true,
            max_amount_without_approval: default_max_amount_without_approval(),
            require_approval_above_limit: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_policy_defaults() {
        let policy = ErpValidationConfig::default();
        assert!(policy.cost_center_rules.require_for_pl);
        assert!(!policy.cost_center_rules.allow_group_cost_center);
        assert!(policy.cost_center_rules.validate_allocation);
        assert!(policy.dimension_rules.validate_mandatory_dimensions);
        assert_eq!(policy.budget_rules.budget_exceedance_threshold, dec!(10));
        assert!(!policy.budget_rules.allow_budget_exceedance);
        assert!(policy.period_rules.allow_backdated_entries);
        assert_eq!(policy.period_rules.backdate_limit, 30);
        assert_eq!(
            policy.authorization_rules.max_amount_without_approval,
            dec!(100000)
        );
        assert!(policy.validate().is_ok());
    }

    #[rstest]
    #[case(dec!(-0.01), dec!(100))]
    #[case(dec!(10), dec!(-1))]
    fn test_negative_limits_rejected(#[case] threshold: Decimal, #[case] max_amount: Decimal) {
        let mut policy = ErpValidationConfig::default();
        policy.budget_rules.budget_exceedance_threshold = threshold;
        policy.authorization_rules.max_amount_without_approval = max_amount;

        assert!(matches!(
            policy.validate(),
            Err(ConfigError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn test_engine_settings_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.cache.max_capacity, 10_000);
        assert_eq!(settings.store.timeout_ms, 5_000);
        assert_eq!(settings.store.max_retries, 2);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = EngineSettings::default();
        settings.store.timeout_ms = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting {
                field: "store.timeout_ms",
                ..
            })
        ));
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("glcheck-test")),
                ("GLCHECK__ENGINE__STORE__TIMEOUT_MS", Some("250")),
                (
                    "GLCHECK__POLICY__BUDGET_RULES__ALLOW_BUDGET_EXCEEDANCE",
                    Some("true"),
                ),
                (
                    "GLCHECK__POLICY__PERIOD_RULES__BACKDATE_LIMIT",
                    Some("7"),
                ),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.engine.store.timeout_ms, 250);
                assert!(config.policy.budget_rules.allow_budget_exceedance);
                assert_eq!(config.policy.period_rules.backdate_limit, 7);
                // Untouched groups keep their defaults.
                assert!(config.policy.cost_center_rules.require_for_pl);
            },
        );
    }

    #[test]
    fn test_camel_case_policy_keys_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            [engine.store]
            timeout_ms = 900

            [policy.costCenterRules]
            requireForPL = false
            allowGroupCostCenter = true

            [policy.budgetRules]
            budgetExceedanceThreshold = "15.5"
            includeBookedActuals = true

            [policy.periodRules]
            backdateLimit = 14

            [policy.authorizationRules]
            maxAmountWithoutApproval = "2500"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.store.timeout_ms, 900);
        assert!(!config.policy.cost_center_rules.require_for_pl);
        assert!(config.policy.cost_center_rules.allow_group_cost_center);
        assert_eq!(config.policy.budget_rules.budget_exceedance_threshold, dec!(15.5));
        assert!(config.policy.budget_rules.include_booked_actuals);
        assert_eq!(config.policy.period_rules.backdate_limit, 14);
        assert_eq!(
            config.policy.authorization_rules.max_amount_without_approval,
            dec!(2500)
        );
        assert!(config.policy.dimension_rules.validate_mandatory_dimensions);
    }

    #[test]
    fn test_camel_case_policy_from_json() {
        let policy: ErpValidationConfig = serde_json::from_str(
            r#"{
                "costCenterRules": {"requireForPL": false, "validateAllocation": false},
                "dimensionRules": {"validateMandatoryDimensions": false},
                "budgetRules": {"enableBudgetValidation": false, "allowBudgetExceedance": true},
                "periodRules": {"allowBackdatedEntries": false, "validateFiscalYear": false},
                "authorizationRules": {
                    "enforceAuthorizationLimits": false,
                    "requireApprovalAboveLimit": false
                }
            }"#,
        )
        .unwrap();

        assert!(!policy.cost_center_rules.require_for_pl);
        assert!(!policy.cost_center_rules.validate_allocation);
        assert!(!policy.dimension_rules.validate_mandatory_dimensions);
        assert!(!policy.budget_rules.enable_budget_validation);
        assert!(policy.budget_rules.allow_budget_exceedance);
        assert!(!policy.period_rules.allow_backdated_entries);
        assert!(!policy.period_rules.validate_fiscal_year);
        assert!(!policy.authorization_rules.enforce_authorization_limits);
        assert!(!policy.authorization_rules.require_approval_above_limit);
    }

    #[test]
    fn test_from_toml_applies_range_checks() {
        let result = AppConfig::from_toml(
            r#"
            [policy.budgetRules]
            budgetExceedanceThreshold = "-1"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidPolicy { .. })));
    }
}
