//! Budget management routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use finwise_core::budget::Month;
use finwise_db::entities::budgets;
use finwise_db::repositories::{BudgetError, BudgetRepository, UpsertMonthlyBudgetInput};
use finwise_shared::AppError;

/// Creates the budget routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets))
        .route("/budgets", post(create_budget))
        .route("/budgets/{id}", delete(delete_budget))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating or amending a monthly budget.
#[derive(Debug, Deserialize)]
pub struct BudgetPayload {
    /// Budgeted category.
    pub category: String,
    /// Budget month (`YYYY-MM`).
    pub month: String,
    /// Budgeted amount, as a decimal string.
    pub amount: String,
    /// Window start (`YYYY-MM-DD`); defaults to the month's first day.
    pub start_date: Option<String>,
    /// Window end (`YYYY-MM-DD`); defaults to the month's last day.
    pub end_date: Option<String>,
}

/// Response for a budget.
#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    /// Budget ID.
    pub id: Uuid,
    /// Owning user ID.
    pub user_id: Uuid,
    /// Budgeted category.
    pub category: String,
    /// Budget month (`YYYY-MM`).
    pub month: String,
    /// Budgeted cap.
    pub amount: Decimal,
    /// Window start.
    pub start_date: NaiveDate,
    /// Window end.
    pub end_date: NaiveDate,
    /// Derived spend inside the window.
    pub spent: Decimal,
    /// Derived remaining cap.
    pub remaining: Decimal,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<budgets::Model> for BudgetResponse {
    fn from(budget: budgets::Model) -> Self {
        Self {
            id: budget.id,
            user_id: budget.user_id,
            category: budget.category,
            month: budget.month,
            amount: budget.amount,
            start_date: budget.start_date,
            end_date: budget.end_date,
            spent: budget.spent,
            remaining: budget.remaining,
            created_at: budget.created_at.to_rfc3339(),
            updated_at: budget.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /budgets - List the authenticated user's budgets.
async fn list_budgets(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let budget_repo = BudgetRepository::new((*state.db).clone());

    match budget_repo.list_for_user(auth.user_id()).await {
        Ok(budgets) => {
            let items: Vec<BudgetResponse> =
                budgets.into_iter().map(BudgetResponse::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list budgets");
            error_response(&AppError::Database("an error occurred".into()))
        }
    }
}

/// POST /budgets - Create or amend the budget for `(category, month)`.
///
/// The amount is ADDITIVE: posting `{Food, 2025-03, 500}` twice yields one
/// budget with a cap of 1000, not two budgets and not an overwrite.
async fn create_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<BudgetPayload>,
) -> impl IntoResponse {
    let category = payload.category.trim();
    if category.is_empty() {
        return error_response(&AppError::Validation("category must not be empty".into()));
    }

    let Ok(month) = Month::from_str(payload.month.trim()) else {
        return error_response(&AppError::Validation(
            "month must be of the form YYYY-MM".into(),
        ));
    };

    let Ok(amount) = Decimal::from_str(payload.amount.trim()) else {
        return error_response(&AppError::Validation(
            "amount must be a decimal number".into(),
        ));
    };

    let start_date = match parse_optional_date(payload.start_date.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };
    let end_date = match parse_optional_date(payload.end_date.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };
    if let (Some(start), Some(end)) = (start_date, end_date)
        && start > end
    {
        return error_response(&AppError::Validation(
            "start_date must not be after end_date".into(),
        ));
    }

    let budget_repo = BudgetRepository::new((*state.db).clone());

    match budget_repo
        .upsert_monthly(UpsertMonthlyBudgetInput {
            user_id: auth.user_id(),
            category: category.to_string(),
            month,
            amount,
            start_date,
            end_date,
        })
        .await
    {
        Ok(budget) => {
            info!(
                user_id = %auth.user_id(),
                budget_id = %budget.id,
                month = %budget.month,
                "Budget upserted"
            );
            (StatusCode::CREATED, Json(BudgetResponse::from(budget))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to upsert budget");
            map_budget_error(&e)
        }
    }
}

/// DELETE /budgets/{id} - Delete a budget.
async fn delete_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let budget_repo = BudgetRepository::new((*state.db).clone());

    match budget_repo.delete_for_user(auth.user_id(), id).await {
        Ok(()) => {
            info!(user_id = %auth.user_id(), budget_id = %id, "Budget deleted");
            (
                StatusCode::OK,
                Json(json!({ "message": "Budget deleted successfully" })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete budget");
            map_budget_error(&e)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, Response> {
    match raw {
        None => Ok(None),
        Some(raw) => NaiveDate::from_str(raw.trim()).map(Some).map_err(|_| {
            error_response(&AppError::Validation(
                "dates must be YYYY-MM-DD calendar dates".into(),
            ))
        }),
    }
}

/// Maps a repository error onto the standard error body.
pub(crate) fn map_budget_error(e: &BudgetError) -> Response {
    match e {
        BudgetError::NotFound(_) => error_response(&AppError::NotFound("budget not found".into())),
        BudgetError::Reconcile { .. } => error_response(&AppError::Internal(e.to_string())),
        BudgetError::Database(_) => error_response(&AppError::Database("an error occurred".into())),
    }
}
