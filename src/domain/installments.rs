use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::utils::error::AppError;

pub const MIN_INSTALLMENTS: u32 = 2;
pub const MAX_INSTALLMENTS: u32 = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("installment count must be between {MIN_INSTALLMENTS} and {MAX_INSTALLMENTS}, got {0}")]
    CountOutOfRange(u32),

    #[error("first due date {0} is in the past")]
    FirstDueInPast(NaiveDate),

    #[error("total amount must be positive")]
    NonPositiveTotal,

    #[error("due date overflows the calendar")]
    DateOverflow,
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        AppError::ValidationError(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInstallment {
    pub seq: i32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// Split `total` into `count` monthly installments starting at `first_due`.
///
/// Amounts are equal parts rounded down to cents; the first installment
/// absorbs the remainder, so the amounts always sum to `total` exactly.
pub fn build_plan(
    total: Decimal,
    count: u32,
    first_due: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<PlannedInstallment>, PlanError> {
    if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&count) {
        return Err(PlanError::CountOutOfRange(count));
    }
    if total <= Decimal::ZERO {
        return Err(PlanError::NonPositiveTotal);
    }
    if first_due < today {
        return Err(PlanError::FirstDueInPast(first_due));
    }

    let part = (total / Decimal::from(count))
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let first = total - part * Decimal::from(count - 1);

    let mut plan = Vec::with_capacity(count as usize);
    for i in 0..count {
        let due_date = first_due
            .checked_add_months(Months::new(i))
            .ok_or(PlanError::DateOverflow)?;
        let amount = if i == 0 { first } else { part };

        plan.push(PlannedInstallment {
            seq: (i + 1) as i32,
            amount,
            due_date,
        });
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn even_split_has_equal_amounts() {
        let plan = build_plan(dec("300.00"), 3, date(2026, 9, 1), date(2026, 8, 7)).unwrap();

        assert_eq!(plan.len(), 3);
        assert!(plan.iter().all(|p| p.amount == dec("100.00")));
    }

    #[test]
    fn amounts_sum_to_total_with_rounding() {
        let total = dec("100.00");
        let plan = build_plan(total, 3, date(2026, 9, 1), date(2026, 8, 7)).unwrap();

        let sum: Decimal = plan.iter().map(|p| p.amount).sum();
        assert_eq!(sum, total);

        // first absorbs the remainder
        assert_eq!(plan[0].amount, dec("33.34"));
        assert_eq!(plan[1].amount, dec("33.33"));
        assert_eq!(plan[2].amount, dec("33.33"));
    }

    #[test]
    fn sum_holds_for_awkward_totals() {
        let today = date(2026, 8, 7);
        for (total, count) in [("0.03", 2u32), ("999.99", 7), ("123456.78", 12), ("10.01", 4)] {
            let total = dec(total);
            let plan = build_plan(total, count, date(2026, 9, 15), today).unwrap();
            let sum: Decimal = plan.iter().map(|p| p.amount).sum();
            assert_eq!(sum, total, "total {total} over {count} installments");
            assert!(plan.iter().all(|p| p.amount > Decimal::ZERO));
        }
    }

    #[test]
    fn due_dates_step_monthly_and_clamp() {
        let plan = build_plan(dec("90.00"), 3, date(2026, 1, 31), date(2026, 1, 1)).unwrap();

        assert_eq!(plan[0].due_date, date(2026, 1, 31));
        assert_eq!(plan[1].due_date, date(2026, 2, 28));
        assert_eq!(plan[2].due_date, date(2026, 3, 31));
    }

    #[test]
    fn sequence_numbers_start_at_one() {
        let plan = build_plan(dec("50.00"), 2, date(2026, 9, 1), date(2026, 8, 7)).unwrap();
        assert_eq!(plan[0].seq, 1);
        assert_eq!(plan[1].seq, 2);
    }

    #[test]
    fn count_bounds_are_enforced() {
        let today = date(2026, 8, 7);
        assert_eq!(
            build_plan(dec("100.00"), 1, date(2026, 9, 1), today),
            Err(PlanError::CountOutOfRange(1))
        );
        assert_eq!(
            build_plan(dec("100.00"), 13, date(2026, 9, 1), today),
            Err(PlanError::CountOutOfRange(13))
        );
    }

    #[test]
    fn past_first_due_is_rejected() {
        let err = build_plan(dec("100.00"), 2, date(2026, 8, 6), date(2026, 8, 7));
        assert_eq!(err, Err(PlanError::FirstDueInPast(date(2026, 8, 6))));
    }

    #[test]
    fn zero_total_is_rejected() {
        let err = build_plan(Decimal::ZERO, 2, date(2026, 9, 1), date(2026, 8, 7));
        assert_eq!(err, Err(PlanError::NonPositiveTotal));
    }
}
