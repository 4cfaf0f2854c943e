//! Pure budget reconciliation arithmetic.
//!
//! A budget's `spent` and `remaining` fields are derived data: `spent` is the
//! sum of the owner's matching transaction amounts inside the budget window,
//! and `remaining` is the budgeted cap minus that sum, floored at zero. Both
//! are always recomputed from scratch, never incrementally adjusted.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A transaction's contribution to budget spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendRecord {
    /// Transaction amount.
    pub amount: Decimal,
    /// Transaction date.
    pub date: NaiveDate,
}

/// Derived budget totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetTotals {
    /// Sum of matching transaction amounts in the window.
    pub spent: Decimal,
    /// Budgeted cap minus spend, floored at zero.
    pub remaining: Decimal,
}

/// Budget service for reconciliation arithmetic.
pub struct BudgetService;

impl BudgetService {
    /// Returns true when `date` falls inside the inclusive window.
    #[must_use]
    pub fn window_contains(start: NaiveDate, end: NaiveDate, date: NaiveDate) -> bool {
        start <= date && date <= end
    }

    /// Sums the amounts of the records dated inside the window.
    #[must_use]
    pub fn spent_in_window(records: &[SpendRecord], start: NaiveDate, end: NaiveDate) -> Decimal {
        records
            .iter()
            .filter(|r| Self::window_contains(start, end, r.date))
            .map(|r| r.amount)
            .sum()
    }

    /// Returns the remaining cap: `max(0, amount - spent)`.
    #[must_use]
    pub fn remaining(amount: Decimal, spent: Decimal) -> Decimal {
        (amount - spent).max(Decimal::ZERO)
    }

    /// Recomputes a budget's derived totals from scratch.
    #[must_use]
    pub fn reconcile_totals(
        amount: Decimal,
        records: &[SpendRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> BudgetTotals {
        let spent = Self::spent_in_window(records, start, end);
        BudgetTotals {
            spent,
            remaining: Self::remaining(amount, spent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(amount: Decimal, y: i32, m: u32, d: u32) -> SpendRecord {
        SpendRecord {
            amount,
            date: date(y, m, d),
        }
    }

    #[test]
    fn test_window_contains_bounds_inclusive() {
        let start = date(2025, 3, 1);
        let end = date(2025, 3, 31);

        assert!(BudgetService::window_contains(start, end, start));
        assert!(BudgetService::window_contains(start, end, end));
        assert!(BudgetService::window_contains(start, end, date(2025, 3, 15)));
        assert!(!BudgetService::window_contains(start, end, date(2025, 2, 28)));
        assert!(!BudgetService::window_contains(start, end, date(2025, 4, 1)));
    }

    #[test]
    fn test_spent_is_exact_sum_of_window_records() {
        let records = vec![
            record(dec!(50), 2025, 3, 5),
            record(dec!(20.50), 2025, 3, 31),
            record(dec!(100), 2025, 4, 1), // outside the window
        ];

        let spent = BudgetService::spent_in_window(&records, date(2025, 3, 1), date(2025, 3, 31));
        assert_eq!(spent, dec!(70.50));
    }

    #[test]
    fn test_spent_empty_window_is_zero() {
        let spent = BudgetService::spent_in_window(&[], date(2025, 3, 1), date(2025, 3, 31));
        assert_eq!(spent, Decimal::ZERO);
    }

    #[test]
    fn test_remaining_under_budget() {
        assert_eq!(BudgetService::remaining(dec!(500), dec!(70)), dec!(430));
    }

    #[test]
    fn test_remaining_floors_at_zero() {
        assert_eq!(BudgetService::remaining(dec!(500), dec!(600)), dec!(0));
        assert_eq!(BudgetService::remaining(dec!(0), dec!(25)), dec!(0));
    }

    #[test]
    fn test_reconcile_totals() {
        let records = vec![record(dec!(300), 2025, 3, 2), record(dec!(300), 2025, 3, 3)];

        let totals =
            BudgetService::reconcile_totals(dec!(500), &records, date(2025, 3, 1), date(2025, 3, 31));

        assert_eq!(totals.spent, dec!(600));
        assert_eq!(totals.remaining, dec!(0));
    }

    #[test]
    fn test_removing_a_record_recomputes_from_scratch() {
        let start = date(2025, 3, 1);
        let end = date(2025, 3, 31);
        let mut records = vec![record(dec!(50), 2025, 3, 5), record(dec!(20), 2025, 3, 6)];

        let before = BudgetService::reconcile_totals(dec!(500), &records, start, end);
        let removed = records.remove(0);
        let after = BudgetService::reconcile_totals(dec!(500), &records, start, end);

        assert_eq!(after.spent, before.spent - removed.amount);
        assert!(after.remaining <= dec!(500));
    }
}
