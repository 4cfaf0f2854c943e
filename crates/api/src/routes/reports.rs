//! Spend report routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;

use crate::routes::error_response;
use crate::{AppState, middleware::AuthUser};
use finwise_core::report::{ReportBudget, ReportError, ReportService, ReportTransaction};
use finwise_db::repositories::{BudgetRepository, TransactionRepository};
use finwise_shared::AppError;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports", get(generate_report))
}

/// Query parameters for report generation.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Range start (`YYYY-MM-DD`), required.
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    /// Range end (`YYYY-MM-DD`), required.
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// GET /reports?startDate&endDate - Aggregate spend over a date range.
///
/// Budget performance covers every budget the user has, measured against the
/// report-range spend of its category, regardless of the budget's own window.
async fn generate_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let (Some(start_raw), Some(end_raw)) = (query.start_date.as_deref(), query.end_date.as_deref())
    else {
        return error_response(&AppError::Validation(
            "startDate and endDate are required".into(),
        ));
    };

    let (Ok(start), Ok(end)) = (NaiveDate::from_str(start_raw), NaiveDate::from_str(end_raw))
    else {
        return error_response(&AppError::Validation(
            "startDate and endDate must be YYYY-MM-DD calendar dates".into(),
        ));
    };

    let tx_repo = TransactionRepository::new((*state.db).clone());
    let transactions: Vec<ReportTransaction> =
        match tx_repo.list_in_range(auth.user_id(), start, end).await {
            Ok(rows) => rows
                .into_iter()
                .map(|t| ReportTransaction {
                    category: t.category,
                    amount: t.amount,
                })
                .collect(),
            Err(e) => {
                error!(error = %e, "Failed to load transactions for report");
                return error_response(&AppError::Database("an error occurred".into()));
            }
        };

    let budget_repo = BudgetRepository::new((*state.db).clone());
    let budgets: Vec<ReportBudget> = match budget_repo.list_for_user(auth.user_id()).await {
        Ok(rows) => rows
            .into_iter()
            .map(|b| ReportBudget {
                category: b.category,
                month: b.month,
                amount: b.amount,
            })
            .collect(),
        Err(e) => {
            error!(error = %e, "Failed to load budgets for report");
            return error_response(&AppError::Database("an error occurred".into()));
        }
    };

    match ReportService::build_spending_report(&transactions, &budgets) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(ReportError::NoTransactions) => error_response(&AppError::NotFound(
            "no transactions found in the requested date range".into(),
        )),
    }
}
