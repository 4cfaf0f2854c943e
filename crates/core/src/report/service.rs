//! Report generation service.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{BudgetPerformance, ReportBudget, ReportTransaction, SpendingReport};
use crate::budget::BudgetService;

/// Service for generating spend reports.
pub struct ReportService;

impl ReportService {
    /// Builds a spending report from the transactions in range and the
    /// user's budgets.
    ///
    /// Budget performance covers every budget passed in, whether or not its
    /// own window overlaps the report range; each budget is measured against
    /// the report-range spend of its category (default 0).
    ///
    /// # Errors
    ///
    /// Returns `ReportError::NoTransactions` when `transactions` is empty,
    /// so an empty range is never reported as a successful zero report.
    pub fn build_spending_report(
        transactions: &[ReportTransaction],
        budgets: &[ReportBudget],
    ) -> Result<SpendingReport, ReportError> {
        if transactions.is_empty() {
            return Err(ReportError::NoTransactions);
        }

        let mut total_spending = Decimal::ZERO;
        let mut category_breakdown: BTreeMap<String, Decimal> = BTreeMap::new();

        for transaction in transactions {
            total_spending += transaction.amount;
            *category_breakdown
                .entry(transaction.category.clone())
                .or_insert(Decimal::ZERO) += transaction.amount;
        }

        let budget_performance = budgets
            .iter()
            .map(|budget| {
                let spent = category_breakdown
                    .get(&budget.category)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                BudgetPerformance {
                    category: budget.category.clone(),
                    month: budget.month.clone(),
                    budgeted: budget.amount,
                    spent,
                    remaining: BudgetService::remaining(budget.amount, spent),
                }
            })
            .collect();

        Ok(SpendingReport {
            total_spending,
            category_breakdown,
            budget_performance,
        })
    }
}
