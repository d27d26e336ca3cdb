//! Property-based tests for loan recomputation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::loan::ledger::recompute_loan;
use crate::loan::types::LoanStatus;

fn arb_cents(max: i64) -> impl Strategy<Value = Decimal> {
    (0..=max).prop_map(|c| Decimal::new(c, 2))
}

fn arb_status() -> impl Strategy<Value = LoanStatus> {
    prop_oneof![
        Just(LoanStatus::Active),
        Just(LoanStatus::Closed),
        Just(LoanStatus::BadDebt),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// paid = sum, remaining = max(amount - paid, 0), status follows remaining
    /// unless written off.
    #[test]
    fn prop_recompute_invariants(
        amount in arb_cents(10_000_000),
        collections in prop::collection::vec(arb_cents(2_000_000), 0..10),
        status in arb_status(),
    ) {
        let totals = recompute_loan(amount, status, &collections);
        let paid: Decimal = collections.iter().copied().sum();

        prop_assert_eq!(totals.total_paid, paid);
        prop_assert!(totals.total_remaining >= Decimal::ZERO);
        prop_assert_eq!(totals.total_remaining, (amount - paid).max(Decimal::ZERO));

        let expected = if status == LoanStatus::BadDebt {
            LoanStatus::BadDebt
        } else if totals.total_remaining.is_zero() {
            LoanStatus::Closed
        } else {
            LoanStatus::Active
        };
        prop_assert_eq!(totals.status, expected);
    }

    /// Recomputation is idempotent.
    #[test]
    fn prop_recompute_idempotent(
        amount in arb_cents(1_000_000),
        collections in prop::collection::vec(arb_cents(500_000), 0..5),
        status in arb_status(),
    ) {
        let once = recompute_loan(amount, status, &collections);
        let twice = recompute_loan(amount, once.status, &collections);
        prop_assert_eq!(once, twice);
    }
}
