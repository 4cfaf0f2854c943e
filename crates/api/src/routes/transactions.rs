//! Transaction management routes.
//!
//! Every transaction mutation re-establishes the derived totals of the
//! budgets whose window contains the affected (category, date) coordinates.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::routes::budgets::map_budget_error;
use crate::routes::error_response;
use crate::{AppState, middleware::AuthUser};
use finwise_core::budget::Month;
use finwise_db::entities::transactions;
use finwise_db::repositories::{
    BudgetRepository, CreateTransactionInput, TransactionError, TransactionRepository,
    UpdateTransactionInput,
};
use finwise_shared::AppError;

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/{id}", put(update_transaction))
        .route("/transactions/{id}", delete(delete_transaction))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating or fully updating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionPayload {
    /// Transaction amount, as a decimal string.
    pub amount: String,
    /// Spending category.
    pub category: String,
    /// Transaction date (`YYYY-MM-DD`).
    pub date: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Owning user ID.
    pub user_id: Uuid,
    /// Transaction amount.
    pub amount: Decimal,
    /// Spending category.
    pub category: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Optional description.
    pub description: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(transaction: transactions::Model) -> Self {
        Self {
            id: transaction.id,
            user_id: transaction.user_id,
            amount: transaction.amount,
            category: transaction.category,
            date: transaction.date,
            description: transaction.description,
            created_at: transaction.created_at.to_rfc3339(),
            updated_at: transaction.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /transactions - List the authenticated user's transactions.
async fn list_transactions(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let tx_repo = TransactionRepository::new((*state.db).clone());

    match tx_repo.list_for_user(auth.user_id()).await {
        Ok(transactions) => {
            let items: Vec<TransactionResponse> = transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list transactions");
            error_response(&AppError::Database("an error occurred".into()))
        }
    }
}

/// POST /transactions - Record a new transaction.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TransactionPayload>,
) -> impl IntoResponse {
    let (amount, category, date) = match parse_payload(&payload) {
        Ok(parts) => parts,
        Err(response) => return response,
    };

    let tx_repo = TransactionRepository::new((*state.db).clone());
    let transaction = match tx_repo
        .create(CreateTransactionInput {
            user_id: auth.user_id(),
            amount,
            category: category.clone(),
            date,
            description: payload.description.clone(),
        })
        .await
    {
        Ok(transaction) => transaction,
        Err(e) => {
            error!(error = %e, "Failed to create transaction");
            return error_response(&AppError::Database("an error occurred".into()));
        }
    };

    let budget_repo = BudgetRepository::new((*state.db).clone());
    if let Err(response) =
        reconcile_coordinate(&budget_repo, auth.user_id(), &category, date, true).await
    {
        return response;
    }

    info!(
        user_id = %auth.user_id(),
        transaction_id = %transaction.id,
        "Transaction created"
    );

    (
        StatusCode::CREATED,
        Json(TransactionResponse::from(transaction)),
    )
        .into_response()
}

/// PUT /transactions/{id} - Fully update a transaction.
///
/// An update can move spend across categories or date windows, so both the
/// pre-image and post-image coordinates are reconciled.
async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionPayload>,
) -> impl IntoResponse {
    let (amount, category, date) = match parse_payload(&payload) {
        Ok(parts) => parts,
        Err(response) => return response,
    };

    let tx_repo = TransactionRepository::new((*state.db).clone());
    let old = match tx_repo.find_for_user(auth.user_id(), id).await {
        Ok(transaction) => transaction,
        Err(e) => return map_transaction_error(&e),
    };

    let updated = match tx_repo
        .update(
            auth.user_id(),
            id,
            UpdateTransactionInput {
                amount,
                category,
                date,
                description: payload.description.clone(),
            },
        )
        .await
    {
        Ok(transaction) => transaction,
        Err(e) => {
            error!(error = %e, "Failed to update transaction");
            return map_transaction_error(&e);
        }
    };

    let budget_repo = BudgetRepository::new((*state.db).clone());
    let moved = old.category != updated.category || old.date != updated.date;
    if moved {
        if let Err(response) =
            reconcile_coordinate(&budget_repo, auth.user_id(), &old.category, old.date, false)
                .await
        {
            return response;
        }
    }
    if let Err(response) = reconcile_coordinate(
        &budget_repo,
        auth.user_id(),
        &updated.category,
        updated.date,
        true,
    )
    .await
    {
        return response;
    }

    info!(
        user_id = %auth.user_id(),
        transaction_id = %updated.id,
        "Transaction updated"
    );

    (StatusCode::OK, Json(TransactionResponse::from(updated))).into_response()
}

/// DELETE /transactions/{id} - Delete a transaction.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let tx_repo = TransactionRepository::new((*state.db).clone());

    let deleted = match tx_repo.delete(auth.user_id(), id).await {
        Ok(transaction) => transaction,
        Err(e) => {
            error!(error = %e, "Failed to delete transaction");
            return map_transaction_error(&e);
        }
    };

    let budget_repo = BudgetRepository::new((*state.db).clone());
    if let Err(response) = reconcile_coordinate(
        &budget_repo,
        auth.user_id(),
        &deleted.category,
        deleted.date,
        false,
    )
    .await
    {
        return response;
    }

    info!(
        user_id = %auth.user_id(),
        transaction_id = %deleted.id,
        "Transaction deleted"
    );

    (
        StatusCode::OK,
        Json(json!({
            "message": "Transaction deleted successfully",
            "deleted": TransactionResponse::from(deleted)
        })),
    )
        .into_response()
}

// ============================================================================
// Helpers
// ============================================================================

/// Validates and parses the wire payload.
fn parse_payload(payload: &TransactionPayload) -> Result<(Decimal, String, NaiveDate), Response> {
    let category = payload.category.trim();
    if category.is_empty() {
        return Err(error_response(&AppError::Validation(
            "category must not be empty".into(),
        )));
    }

    let amount = Decimal::from_str(payload.amount.trim()).map_err(|_| {
        error_response(&AppError::Validation(
            "amount must be a decimal number".into(),
        ))
    })?;

    let date = NaiveDate::from_str(payload.date.trim()).map_err(|_| {
        error_response(&AppError::Validation(
            "date must be a YYYY-MM-DD calendar date".into(),
        ))
    })?;

    Ok((amount, category.to_string(), date))
}

/// Re-establishes budget totals for one (category, date) coordinate.
///
/// With `provision` set, the month's zero-amount budget row is created first
/// when the category is budgeted in some other month but not this one.
async fn reconcile_coordinate(
    budget_repo: &BudgetRepository,
    user_id: Uuid,
    category: &str,
    date: NaiveDate,
    provision: bool,
) -> Result<(), Response> {
    if provision {
        if let Err(e) = budget_repo
            .ensure_month_budget(user_id, category, Month::of(date))
            .await
        {
            error!(error = %e, "Failed to provision monthly budget");
            return Err(map_budget_error(&e));
        }
    }

    if let Err(e) = budget_repo.reconcile(user_id, category, date).await {
        error!(error = %e, "Budget reconciliation failed");
        return Err(map_budget_error(&e));
    }

    Ok(())
}

/// Maps a repository error onto the standard error body.
fn map_transaction_error(e: &TransactionError) -> Response {
    match e {
        TransactionError::NotFound(_) => {
            error_response(&AppError::NotFound("transaction not found".into()))
        }
        TransactionError::Database(_) => {
            error_response(&AppError::Database("an error occurred".into()))
        }
    }
}
