//! Spend report data types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

/// A transaction row as seen by report aggregation.
#[derive(Debug, Clone)]
pub struct ReportTransaction {
    /// Spending category.
    pub category: String,
    /// Transaction amount.
    pub amount: Decimal,
}

/// A budget row as seen by report aggregation.
#[derive(Debug, Clone)]
pub struct ReportBudget {
    /// Budgeted category.
    pub category: String,
    /// Budget month (`YYYY-MM`).
    pub month: String,
    /// Budgeted cap.
    pub amount: Decimal,
}

/// Per-budget performance against report-range spend.
///
/// `spent` is the category's spend *within the report range*, not within the
/// budget's own window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetPerformance {
    /// Budgeted category.
    pub category: String,
    /// Budget month (`YYYY-MM`).
    pub month: String,
    /// Budgeted cap.
    pub budgeted: Decimal,
    /// Report-range spend for the category.
    pub spent: Decimal,
    /// `max(0, budgeted - spent)`.
    pub remaining: Decimal,
}

/// Spending report over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendingReport {
    /// Sum of all transaction amounts in range.
    #[serde(rename = "totalSpending")]
    pub total_spending: Decimal,
    /// Category to summed amount.
    #[serde(rename = "categoryBreakdown")]
    pub category_breakdown: BTreeMap<String, Decimal>,
    /// Performance of every budget the user has.
    #[serde(rename = "budgetPerformance")]
    pub budget_performance: Vec<BudgetPerformance>,
}
