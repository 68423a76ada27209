//! Accounting dimension phase.
//!
//! Always reports the full entry x dimension breakdown. Mandatory values are
//! only enforced when the policy asks for it.

use async_trait::async_trait;

use super::{Phase, Rule, RuleContext};
use crate::pipeline::ValidationFault;
use crate::result::{DimensionValidation, RuleOutcome, ValidationCode, entry_field};

/// Accounting dimension rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionRule;

#[async_trait]
impl Rule for DimensionRule {
    fn phase(&self) -> Phase {
        Phase::Dimensions
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome, ValidationFault> {
        let voucher = ctx.voucher;
        let enforce = ctx.policy.dimension_rules.validate_mandatory_dimensions;
        let definitions = ctx
            .lookups
            .dimensions(&voucher.company, &voucher.voucher_type)
            .await?;
        let mut outcome = RuleOutcome::default();

        for (index, entry) in voucher.entries.iter().enumerate() {
            for definition in definitions.iter().filter(|d| !d.is_disabled) {
                let value = entry.dimension_value(&definition.fieldname);
                let is_valid = !definition.is_mandatory || value.is_some();

                if !is_valid && enforce {
                    outcome.error(
                        ValidationCode::MandatoryDimensionMissing,
                        entry_field(index, &definition.fieldname),
                        format!(
                            "{} is mandatory for {} lines",
                            definition.label, voucher.voucher_type
                        ),
                    );
                    outcome.suggest(format!("Set {} on every line", definition.label));
                }

                outcome.dimensions.push(DimensionValidation {
                    entry_index: index,
                    fieldname: definition.fieldname.clone(),
                    label: definition.label.clone(),
                    value: value.map(str::to_string),
                    is_mandatory: definition.is_mandatory,
                    is_valid,
                });
            }
        }

        Ok(outcome)
    }
}
