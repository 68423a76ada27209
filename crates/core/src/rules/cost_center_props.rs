//! Property-based tests for cost center allocation sums.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::cost_center::{allocation_is_complete, allocation_total};
use crate::model::AllocationShare;

/// Splits 100.00% into `parts` random shares.
fn complete_allocation() -> impl Strategy<Value = Vec<AllocationShare>> {
    prop::collection::vec(1i64..5_000i64, 1..6).prop_map(|weights| {
        let total: i64 = weights.iter().sum();
        let mut remaining = 10_000i64;
        let mut shares = Vec::with_capacity(weights.len());
        for (i, w) in weights.iter().enumerate() {
            let basis_points = if i + 1 == weights.len() {
                remaining
            } else {
                w * 10_000 / total
            };
            remaining -= basis_points;
            shares.push(AllocationShare::new(format!("CC-{i}"), Decimal::new(basis_points, 2)));
        }
        shares
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Shares summing to exactly 100% are complete.
    #[test]
    fn prop_exact_split_is_complete(shares in complete_allocation()) {
        prop_assert_eq!(allocation_total(&shares), Some(Decimal::ONE_HUNDRED));
        prop_assert!(allocation_is_complete(&shares));
    }

    /// A deviation of at most 0.01 is still complete.
    #[test]
    fn prop_rounding_is_tolerated(shares in complete_allocation(), up in any::<bool>()) {
        let mut shares = shares;
        let cent = Decimal::new(1, 2);
        shares[0].percentage = if up {
            shares[0].percentage + cent
        } else {
            shares[0].percentage - cent
        };
        prop_assert!(allocation_is_complete(&shares));
    }

    /// A deviation above 0.01 is never complete.
    #[test]
    fn prop_real_gap_is_incomplete(
        shares in complete_allocation(),
        gap_cents in 2i64..5_000i64,
        up in any::<bool>(),
    ) {
        let mut shares = shares;
        let gap = Decimal::new(gap_cents, 2);
        shares[0].percentage = if up {
            shares[0].percentage + gap
        } else {
            shares[0].percentage - gap
        };
        prop_assert!(!allocation_is_complete(&shares));
    }
}
