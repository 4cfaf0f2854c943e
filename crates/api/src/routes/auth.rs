//! Authentication routes for signup and signin.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::routes::error_response;
use finwise_core::auth::{hash_password, verify_password};
use finwise_db::UserRepository;
use finwise_shared::AppError;
use finwise_shared::auth::{SigninRequest, SignupRequest, TokenResponse};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

/// POST /signup - Register a new user.
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> impl IntoResponse {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return error_response(&AppError::Validation("a valid email is required".into()));
    }
    if payload.password.chars().count() < 8 {
        return error_response(&AppError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.email_exists(&email).await {
        Ok(true) => {
            return error_response(&AppError::Conflict(
                "an account with this email already exists".into(),
            ));
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return error_response(&AppError::Database(
                "an error occurred during signup".into(),
            ));
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return error_response(&AppError::Internal(
                "an error occurred during signup".into(),
            ));
        }
    };

    let user = match user_repo.create(&email, &password_hash).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return error_response(&AppError::Database(
                "an error occurred during signup".into(),
            ));
        }
    };

    info!(user_id = %user.id, email = %user.email, "New user signed up");

    (
        StatusCode::CREATED,
        Json(json!({
            "user": {
                "id": user.id,
                "email": user.email
            }
        })),
    )
        .into_response()
}

/// POST /signin - Authenticate a user and issue a bearer token.
async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> impl IntoResponse {
    let email = payload.email.trim().to_lowercase();
    let user_repo = UserRepository::new((*state.db).clone());

    // A single answer for unknown email and wrong password, so signin
    // cannot be used to probe which emails are registered.
    let user = match user_repo.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!(email = %email, "Signin attempt for non-existent user");
            return error_response(&AppError::Unauthorized("invalid email or password".into()));
        }
        Err(e) => {
            error!(error = %e, "Database error during signin");
            return error_response(&AppError::Database(
                "an error occurred during signin".into(),
            ));
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed signin attempt - invalid password");
            return error_response(&AppError::Unauthorized("invalid email or password".into()));
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return error_response(&AppError::Internal(
                "an error occurred during signin".into(),
            ));
        }
    }

    let token = match state.jwt_service.generate_token(user.id) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to generate token");
            return error_response(&AppError::Internal(
                "an error occurred during signin".into(),
            ));
        }
    };

    info!(user_id = %user.id, "User signed in");

    (
        StatusCode::OK,
        Json(TokenResponse {
            token,
            expires_in: state.jwt_service.token_expires_in(),
        }),
    )
        .into_response()
}
