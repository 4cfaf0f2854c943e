//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, middleware::auth::auth_middleware};
use finwise_shared::AppError;

pub mod auth;
pub mod budgets;
pub mod health;
pub mod reports;
pub mod transactions;

/// Creates the API router. Transaction, budget, and report routes require a
/// valid bearer token; signup, signin, and health are public.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(transactions::routes())
        .merge(budgets::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected)
}

/// Renders an application error as the standard `{error, message}` body.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}
