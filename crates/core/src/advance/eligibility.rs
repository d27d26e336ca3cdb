//! Allowed advance amounts.
//!
//! An advance must be at least `MIN_ADVANCE_AMOUNT` and at most a quarter of
//! the base salary, floored to two decimal places. Employees without a
//! positive base salary cannot request advances at all.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::error::AdvanceError;

/// Smallest advance an employee may request.
pub const MIN_ADVANCE_AMOUNT: Decimal = Decimal::ONE_HUNDRED;

/// Inclusive range of allowed amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmountRange {
    /// Lower bound.
    pub min: Decimal,
    /// Upper bound.
    pub max: Decimal,
}

impl AmountRange {
    /// Returns true if `amount` lies within the range.
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        self.min <= amount && amount <= self.max
    }

    /// Returns true if no amount satisfies both bounds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max < self.min
    }
}

/// Returns the allowed range, or `None` without a positive base salary.
#[must_use]
pub fn allowed_range(base_salary: Option<Decimal>) -> Option<AmountRange> {
    let base = base_salary.filter(|b| b.is_sign_positive() && !b.is_zero())?;
    let max = (base / Decimal::from(4)).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    Some(AmountRange {
        min: MIN_ADVANCE_AMOUNT,
        max,
    })
}

/// Checks an amount against the employee's base salary.
///
/// # Errors
///
/// - `AdvanceError::NoBaseSalary` if the base salary is absent or not positive
/// - `AdvanceError::AmountBelowMinimum` / `AmountAboveMaximum` outside the range
pub fn validate_amount(base_salary: Option<Decimal>, amount: Decimal) -> Result<(), AdvanceError> {
    let range = allowed_range(base_salary).ok_or(AdvanceError::NoBaseSalary)?;
    if amount < range.min {
        return Err(AdvanceError::AmountBelowMinimum {
            amount,
            min: range.min,
        });
    }
    if amount > range.max {
        return Err(AdvanceError::AmountAboveMaximum {
            amount,
            max: range.max,
        });
    }
    Ok(())
}

/// What the employee portal shows before a request is filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    /// True when the base salary is positive and some period is open.
    pub eligible: bool,
    /// Lower bound, absent without a base salary.
    pub min_amount: Option<Decimal>,
    /// Upper bound, absent without a base salary.
    pub max_amount: Option<Decimal>,
}

impl Eligibility {
    /// Evaluates eligibility from the base salary and period availability.
    #[must_use]
    pub fn evaluate(base_salary: Option<Decimal>, any_period_open: bool) -> Self {
        let range = allowed_range(base_salary);
        Self {
            eligible: range.is_some() && any_period_open,
            min_amount: range.map(|r| r.min),
            max_amount: range.map(|r| r.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(4000), dec!(1000))]
    #[case(dec!(1000.05), dec!(250.01))]
    #[case(dec!(1000.03), dec!(250.00))]
    #[case(dec!(3333.33), dec!(833.33))]
    fn test_max_is_floored_quarter(#[case] base: Decimal, #[case] max: Decimal) {
        let range = allowed_range(Some(base)).unwrap();
        assert_eq!(range.min, dec!(100));
        assert_eq!(range.max, max);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(dec!(0)))]
    #[case(Some(dec!(-500)))]
    fn test_no_range_without_positive_salary(#[case] base: Option<Decimal>) {
        assert!(allowed_range(base).is_none());
        assert!(matches!(
            validate_amount(base, dec!(150)),
            Err(AdvanceError::NoBaseSalary)
        ));
    }

    #[test]
    fn test_validate_amount_bounds() {
        let base = Some(dec!(1000));
        assert!(validate_amount(base, dec!(100)).is_ok());
        assert!(validate_amount(base, dec!(250)).is_ok());
        assert!(matches!(
            validate_amount(base, dec!(99.99)),
            Err(AdvanceError::AmountBelowMinimum { .. })
        ));
        assert!(matches!(
            validate_amount(base, dec!(250.01)),
            Err(AdvanceError::AmountAboveMaximum { .. })
        ));
    }

    #[test]
    fn test_small_salary_gives_empty_range() {
        let range = allowed_range(Some(dec!(300))).unwrap();
        assert!(range.is_empty());
        assert!(validate_amount(Some(dec!(300)), dec!(100)).is_err());
    }

    #[test]
    fn test_eligibility() {
        let open = Eligibility::evaluate(Some(dec!(4000)), true);
        assert!(open.eligible);
        assert_eq!(open.max_amount, Some(dec!(1000)));

        let closed = Eligibility::evaluate(Some(dec!(4000)), false);
        assert!(!closed.eligible);
        assert_eq!(closed.min_amount, Some(dec!(100)));

        let no_salary = Eligibility::evaluate(None, true);
        assert!(!no_salary.eligible);
        assert_eq!(no_salary.min_amount, None);
        assert_eq!(no_salary.max_amount, None);
    }
}
