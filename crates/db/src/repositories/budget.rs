//! Budget repository for budget database operations.
//!
//! Owns the stateful half of budget reconciliation: loading the budgets a
//! transaction mutation touches, recomputing their derived `spent` /
//! `remaining` totals from the matching transaction rows, and persisting the
//! result. The arithmetic itself lives in `finwise_core::budget`.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::warn;
use uuid::Uuid;

use finwise_core::budget::{BudgetService, Month, SpendRecord};

use crate::entities::{budgets, transactions};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(Uuid),

    /// One or more budgets failed to reconcile. The remaining affected
    /// budgets were still reconciled and persisted.
    #[error("reconciliation failed for budgets {failed:?}")]
    Reconcile {
        /// Ids of the budgets whose update was aborted.
        failed: Vec<Uuid>,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for the additive monthly budget upsert.
#[derive(Debug, Clone)]
pub struct UpsertMonthlyBudgetInput {
    /// Owning user.
    pub user_id: Uuid,
    /// Budgeted category.
    pub category: String,
    /// Budget month, the canonical key component.
    pub month: Month,
    /// Amount to set, or to add to an existing budget's cap.
    pub amount: Decimal,
    /// Window start; defaults to the month's first day.
    pub start_date: Option<NaiveDate>,
    /// Window end; defaults to the month's last day.
    pub end_date: Option<NaiveDate>,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Number of budgets recomputed and persisted.
    pub updated: usize,
}

/// Budget repository for CRUD and reconciliation.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all budgets owned by a user, ordered by month then category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<budgets::Model>, DbErr> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by(budgets::Column::Month, Order::Asc)
            .order_by(budgets::Column::Category, Order::Asc)
            .all(&self.db)
            .await
    }

    /// Finds a budget owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NotFound` if no such budget exists for this user.
    pub async fn find_for_user(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<budgets::Model, BudgetError> {
        budgets::Entity::find_by_id(id)
            .filter(budgets::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(BudgetError::NotFound(id))
    }

    /// Finds the budget for `(user, category, month)`, the canonical key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_month(
        &self,
        user_id: Uuid,
        category: &str,
        month: Month,
    ) -> Result<Option<budgets::Model>, DbErr> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::Category.eq(category))
            .filter(budgets::Column::Month.eq(month.to_string()))
            .one(&self.db)
            .await
    }

    /// Checks whether the user has budgeted this category in any month.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn has_any_for_category(
        &self,
        user_id: Uuid,
        category: &str,
    ) -> Result<bool, DbErr> {
        let count = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::Category.eq(category))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates or amends the budget for `(user, category, month)`.
    ///
    /// The amount is ADDITIVE on an existing budget: posting the same
    /// monthly budget twice doubles its cap rather than overwriting it.
    /// Either way the derived totals are recomputed from the matching
    /// transactions in the window before the row is written.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn upsert_monthly(
        &self,
        input: UpsertMonthlyBudgetInput,
    ) -> Result<budgets::Model, BudgetError> {
        let existing = self
            .find_by_month(input.user_id, &input.category, input.month)
            .await?;

        let (start, end) = match &existing {
            Some(budget) => (
                input.start_date.unwrap_or(budget.start_date),
                input.end_date.unwrap_or(budget.end_date),
            ),
            None => (
                input.start_date.unwrap_or_else(|| input.month.first_day()),
                input.end_date.unwrap_or_else(|| input.month.last_day()),
            ),
        };

        let spend = self
            .spend_records(input.user_id, &input.category, start, end)
            .await?;
        let now = Utc::now().into();

        match existing {
            Some(budget) => {
                let amount = budget.amount + input.amount;
                let totals = BudgetService::reconcile_totals(amount, &spend, start, end);

                let mut budget: budgets::ActiveModel = budget.into();
                budget.amount = Set(amount);
                budget.start_date = Set(start);
                budget.end_date = Set(end);
                budget.spent = Set(totals.spent);
                budget.remaining = Set(totals.remaining);
                budget.updated_at = Set(now);

                Ok(budget.update(&self.db).await?)
            }
            None => {
                let totals = BudgetService::reconcile_totals(input.amount, &spend, start, end);

                let budget = budgets::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(input.user_id),
                    category: Set(input.category),
                    month: Set(input.month.to_string()),
                    amount: Set(input.amount),
                    start_date: Set(start),
                    end_date: Set(end),
                    spent: Set(totals.spent),
                    remaining: Set(totals.remaining),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                Ok(budget.insert(&self.db).await?)
            }
        }
    }

    /// Re-establishes the derived totals of every budget of
    /// `(user, category)` whose window contains `date`.
    ///
    /// Failures are per-budget: a budget whose recompute or write fails is
    /// skipped without a partial write, the remaining budgets still
    /// reconcile, and the collected failures are surfaced as one
    /// `BudgetError::Reconcile`.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Database` if the affected budgets cannot be
    /// enumerated, `BudgetError::Reconcile` if any individual budget failed.
    pub async fn reconcile(
        &self,
        user_id: Uuid,
        category: &str,
        date: NaiveDate,
    ) -> Result<ReconcileSummary, BudgetError> {
        let affected = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::Category.eq(category))
            .filter(budgets::Column::StartDate.lte(date))
            .filter(budgets::Column::EndDate.gte(date))
            .all(&self.db)
            .await?;

        let mut updated = 0;
        let mut failed = Vec::new();

        for budget in affected {
            let budget_id = budget.id;
            match self.reconcile_one(budget).await {
                Ok(()) => updated += 1,
                Err(e) => {
                    warn!(budget_id = %budget_id, error = %e, "budget reconciliation failed");
                    failed.push(budget_id);
                }
            }
        }

        if failed.is_empty() {
            Ok(ReconcileSummary { updated })
        } else {
            Err(BudgetError::Reconcile { failed })
        }
    }

    /// Recomputes and persists one budget's derived totals.
    async fn reconcile_one(&self, budget: budgets::Model) -> Result<(), DbErr> {
        let spend = self
            .spend_records(
                budget.user_id,
                &budget.category,
                budget.start_date,
                budget.end_date,
            )
            .await?;

        let totals =
            BudgetService::reconcile_totals(budget.amount, &spend, budget.start_date, budget.end_date);

        let mut budget: budgets::ActiveModel = budget.into();
        budget.spent = Set(totals.spent);
        budget.remaining = Set(totals.remaining);
        budget.updated_at = Set(Utc::now().into());
        budget.update(&self.db).await?;

        Ok(())
    }

    /// Auto-provisions a zero-amount budget for the transaction's month.
    ///
    /// Applies only when the category has been budgeted in some other month
    /// but not this one, so a category that has ever been budgeted appears
    /// in every month's budget view where it has activity. Returns the
    /// created budget, or `None` when nothing needed provisioning.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn ensure_month_budget(
        &self,
        user_id: Uuid,
        category: &str,
        month: Month,
    ) -> Result<Option<budgets::Model>, BudgetError> {
        if self.find_by_month(user_id, category, month).await?.is_some() {
            return Ok(None);
        }

        if !self.has_any_for_category(user_id, category).await? {
            return Ok(None);
        }

        let start = month.first_day();
        let end = month.last_day();
        let spend = self.spend_records(user_id, category, start, end).await?;
        let totals = BudgetService::reconcile_totals(Decimal::ZERO, &spend, start, end);
        let now = Utc::now().into();

        let budget = budgets::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            category: Set(category.to_string()),
            month: Set(month.to_string()),
            amount: Set(Decimal::ZERO),
            start_date: Set(start),
            end_date: Set(end),
            spent: Set(totals.spent),
            remaining: Set(totals.remaining),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(Some(budget.insert(&self.db).await?))
    }

    /// Deletes a budget owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NotFound` if no such budget exists for this user.
    pub async fn delete_for_user(&self, user_id: Uuid, id: Uuid) -> Result<(), BudgetError> {
        let budget = self.find_for_user(user_id, id).await?;

        budget.delete(&self.db).await?;

        Ok(())
    }

    /// Loads the spend records for `(user, category)` inside the window.
    async fn spend_records(
        &self,
        user_id: Uuid,
        category: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SpendRecord>, DbErr> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Category.eq(category))
            .filter(transactions::Column::Date.gte(start))
            .filter(transactions::Column::Date.lte(end))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|t| SpendRecord {
                amount: t.amount,
                date: t.date,
            })
            .collect())
    }
}
