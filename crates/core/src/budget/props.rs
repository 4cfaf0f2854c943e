//! Property-based tests for budget reconciliation arithmetic.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::{BudgetService, SpendRecord};

/// Strategy for positive decimal amounts (0.00 to 10,000.00).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for dates in 2025.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1u32..=12, 1u32..=28).prop_map(|(m, d)| NaiveDate::from_ymd_opt(2025, m, d).unwrap())
}

/// Strategy for a set of spend records.
fn records_strategy() -> impl Strategy<Value = Vec<SpendRecord>> {
    prop::collection::vec(
        (amount_strategy(), date_strategy()).prop_map(|(amount, date)| SpendRecord { amount, date }),
        0..50,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `remaining` is never negative, for any cap and any spend.
    #[test]
    fn prop_remaining_never_negative(
        amount in amount_strategy(),
        spent in amount_strategy(),
    ) {
        let remaining = BudgetService::remaining(amount, spent);
        prop_assert!(remaining >= Decimal::ZERO);
    }

    /// The derived pair always satisfies `remaining == max(0, amount - spent)`.
    #[test]
    fn prop_totals_invariant(
        amount in amount_strategy(),
        records in records_strategy(),
    ) {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

        let totals = BudgetService::reconcile_totals(amount, &records, start, end);

        prop_assert_eq!(
            totals.remaining,
            (amount - totals.spent).max(Decimal::ZERO)
        );
        prop_assert!(totals.remaining <= amount.max(Decimal::ZERO));
    }

    /// `spent` is the exact sum of the records inside the window, and
    /// records outside the window never contribute.
    #[test]
    fn prop_spent_is_exact_window_sum(records in records_strategy()) {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();

        let expected: Decimal = records
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .map(|r| r.amount)
            .sum();

        prop_assert_eq!(BudgetService::spent_in_window(&records, start, end), expected);
    }

    /// Removing one in-window record reduces `spent` by exactly that record's
    /// amount (recomputed from scratch, not decremented).
    #[test]
    fn prop_removal_reduces_spent_exactly(
        amount in amount_strategy(),
        mut records in records_strategy(),
        index in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!records.is_empty());

        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

        let before = BudgetService::reconcile_totals(amount, &records, start, end);
        let removed = records.remove(index.index(records.len()));
        let after = BudgetService::reconcile_totals(amount, &records, start, end);

        prop_assert_eq!(after.spent, before.spent - removed.amount);
        prop_assert!(after.remaining <= amount);
    }
}
