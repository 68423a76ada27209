//! Property-based tests for the balance invariant.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{check_balance, check_shape, voucher_totals};
use crate::model::GlEntryInput;
use crate::result::{RuleOutcome, ValidationCode};

/// Amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Debit lines plus one credit line offsetting them exactly.
fn balanced_lines() -> impl Strategy<Value = Vec<GlEntryInput>> {
    prop::collection::vec(positive_amount(), 1..8).prop_map(|amounts| {
        let total: Decimal = amounts.iter().copied().sum();
        let mut lines: Vec<GlEntryInput> = amounts
            .into_iter()
            .map(|a| GlEntryInput::debit("Expense", a))
            .collect();
        lines.push(GlEntryInput::credit("Bank", total));
        lines
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Offsetting lines always balance.
    #[test]
    fn prop_balanced_lines_pass(lines in balanced_lines()) {
        let totals = voucher_totals(&lines).unwrap();
        prop_assert!(totals.is_balanced);
        prop_assert!(totals.difference.is_zero());

        let mut outcome = RuleOutcome::default();
        check_balance(&totals, &mut outcome);
        prop_assert!(outcome.errors.is_empty());
    }

    /// Any drift of at most one cent is tolerated.
    #[test]
    fn prop_one_cent_drift_is_tolerated(lines in balanced_lines(), up in any::<bool>()) {
        let mut lines = lines;
        let cent = Decimal::new(1, 2);
        let last = lines.len() - 1;
        lines[last].credit = if up { lines[last].credit + cent } else { lines[last].credit - cent };

        let mut outcome = RuleOutcome::default();
        check_balance(&voucher_totals(&lines).unwrap(), &mut outcome);
        prop_assert!(outcome.errors.is_empty());
    }

    /// Drift beyond one cent is always a mismatch.
    #[test]
    fn prop_larger_drift_is_mismatch(lines in balanced_lines(), extra_cents in 2i64..1_000_000i64) {
        let mut lines = lines;
        let last = lines.len() - 1;
        lines[last].credit += Decimal::new(extra_cents, 2);

        let mut outcome = RuleOutcome::default();
        check_balance(&voucher_totals(&lines).unwrap(), &mut outcome);
        prop_assert!(outcome.has_error(ValidationCode::BalanceMismatch));
    }

    /// Single-sided positive lines are always well-formed.
    #[test]
    fn prop_single_sided_lines_are_well_formed(
        amount in positive_amount(),
        debit in any::<bool>(),
    ) {
        let line = if debit {
            GlEntryInput::debit("Expense", amount)
        } else {
            GlEntryInput::credit("Bank", amount)
        };

        let mut outcome = RuleOutcome::default();
        check_shape(0, &line, &mut outcome);
        prop_assert!(outcome.errors.is_empty());
        prop_assert!(outcome.warnings.is_empty());
    }
}
