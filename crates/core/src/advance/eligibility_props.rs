//! Property-based tests for the allowed advance range.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::advance::eligibility::{MIN_ADVANCE_AMOUNT, allowed_range, validate_amount};

/// Strategy for base salaries with two decimal places, 0.01 ..= 1,000,000.00.
fn arb_salary() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for requested amounts with two decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..=50_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Accepted iff 100 <= amount <= floor(base / 4, 2dp).
    #[test]
    fn prop_amount_accepted_iff_in_range(base in arb_salary(), amount in arb_amount()) {
        let max = (base / Decimal::from(4)).round_dp_with_strategy(2, rust_decimal::RoundingStrategy::ToZero);
        let expected = amount >= MIN_ADVANCE_AMOUNT && amount <= max;
        prop_assert_eq!(validate_amount(Some(base), amount).is_ok(), expected);
    }

    /// The maximum never exceeds a quarter of the salary and is within a cent of it.
    #[test]
    fn prop_max_is_floor_of_quarter(base in arb_salary()) {
        let range = allowed_range(Some(base)).unwrap();
        let quarter = base / Decimal::from(4);
        prop_assert!(range.max <= quarter);
        prop_assert!(quarter - range.max < Decimal::new(1, 2));
        prop_assert!(range.max.scale() <= 2);
    }

    /// Without a positive salary every amount is refused.
    #[test]
    fn prop_non_positive_salary_refuses_everything(
        cents in -100_000_000i64..=0,
        amount in arb_amount(),
    ) {
        prop_assert!(validate_amount(Some(Decimal::new(cents, 2)), amount).is_err());
        prop_assert!(validate_amount(None, amount).is_err());
    }
}
