//! Account API handlers.
//!
//! # Examples
//!
//! Create an account:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/users \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "alice@example.com", "password": "correct horse", "name": "Alice"}'
//! ```
//!
//! Get a token:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/users/token \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "alice@example.com", "password": "correct horse"}'
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use matchday::auth::{Account, ProfileUpdate, RegisterRequest};
use matchday::identity::Player;
use serde::{Deserialize, Serialize};

use super::AppState;
use super::errors::ApiResult;
use super::middleware::AuthUser;
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct TokenPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Account as returned to its owner. The password hash never leaves the core.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub account: Account,
    pub player: Player,
}

/// Create an account and its player.
///
/// # Request Body
///
/// ```json
/// {"email": "alice@example.com", "password": "correct horse", "name": "Alice"}
/// ```
///
/// # Response
///
/// `201 Created` with the account and the player provisioned for it.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid email, weak password, email taken or malformed body
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(request) = payload?;
    let (account, player) = state.accounts.register(request).await?;
    metrics::accounts_created_total();

    Ok((StatusCode::CREATED, Json(UserResponse { account, player })))
}

/// Exchange an email and password for an access token.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown email, wrong or blank password
pub async fn issue_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenPayload>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(payload) = payload?;

    match state.accounts.login(&payload.email, &payload.password).await {
        Ok(token) => {
            metrics::login_attempts_total(true);
            Ok(Json(TokenResponse { token }))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            tracing::info!(email = %payload.email, "Token request rejected: {}", e);
            Err(e.into())
        }
    }
}

/// The caller's account and player.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<UserResponse>> {
    let account = state.accounts.profile(user.account_id).await?;
    let player = state.accounts.player(user.account_id).await?;

    Ok(Json(UserResponse { account, player }))
}

/// Change the caller's display name and/or password.
///
/// # Request Body
///
/// ```json
/// {"name": "Alice B", "password": "new password"}
/// ```
///
/// Both fields are optional.
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(update) = payload?;
    let account = state.accounts.update_profile(user.account_id, update).await?;
    let player = state.accounts.player(user.account_id).await?;

    Ok(Json(UserResponse { account, player }))
}
