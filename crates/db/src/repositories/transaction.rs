//! Transaction repository for database operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, Order,
    QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::transactions;

/// Error types for transaction operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Owning user.
    pub user_id: Uuid,
    /// Transaction amount.
    pub amount: Decimal,
    /// Spending category.
    pub category: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Optional description.
    pub description: Option<String>,
}

/// Input for a full transaction update.
#[derive(Debug, Clone)]
pub struct UpdateTransactionInput {
    /// New amount.
    pub amount: Decimal,
    /// New category.
    pub category: String,
    /// New date.
    pub date: NaiveDate,
    /// New description.
    pub description: Option<String>,
}

/// Transaction repository for CRUD operations.
///
/// Every query is scoped to the owning user; a transaction is never visible
/// to any other user.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all transactions owned by a user, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<transactions::Model>, DbErr> {
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by(transactions::Column::Date, Order::Desc)
            .order_by(transactions::Column::CreatedAt, Order::Desc)
            .all(&self.db)
            .await
    }

    /// Finds a transaction owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` if no such transaction exists for
    /// this user.
    pub async fn find_for_user(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<transactions::Model, TransactionError> {
        transactions::Entity::find_by_id(id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(TransactionError::NotFound(id))
    }

    /// Creates a new transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        input: CreateTransactionInput,
    ) -> Result<transactions::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let transaction = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            amount: Set(input.amount),
            category: Set(input.category),
            date: Set(input.date),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        transaction.insert(&self.db).await
    }

    /// Applies a full update to a transaction owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` if no such transaction exists for
    /// this user.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: UpdateTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        let existing = self.find_for_user(user_id, id).await?;

        let mut transaction: transactions::ActiveModel = existing.into();
        transaction.amount = Set(input.amount);
        transaction.category = Set(input.category);
        transaction.date = Set(input.date);
        transaction.description = Set(input.description);
        transaction.updated_at = Set(chrono::Utc::now().into());

        Ok(transaction.update(&self.db).await?)
    }

    /// Deletes a transaction owned by a user, returning the deleted row.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` if no such transaction exists for
    /// this user.
    pub async fn delete(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<transactions::Model, TransactionError> {
        let existing = self.find_for_user(user_id, id).await?;

        existing.clone().delete(&self.db).await?;

        Ok(existing)
    }

    /// Lists a user's transactions with dates inside the inclusive range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<transactions::Model>, DbErr> {
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Date.gte(start))
            .filter(transactions::Column::Date.lte(end))
            .order_by(transactions::Column::Date, Order::Asc)
            .all(&self.db)
            .await
    }
}
