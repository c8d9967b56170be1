//! Registration and login.
//!
//! Both endpoints are reachable without a token and both hand back a
//! freshly issued one. Login never reuses an earlier token, so clients
//! on separate devices hold independent credentials.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use mandi_core::{normalize_email, validate_password, Role, UserId};
use mandi_state::User;

use crate::auth::{hash_password, issue_token, verify_password};
use crate::db;
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::routes::users::UserResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Create an account and issue its first token.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email, short password or unknown role", body = crate::error::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

    let user = User::new(
        email,
        hash_password(&req.password),
        req.name,
        req.phone_number,
        req.address,
        req.role,
    );
    let user_id = user.id;
    state.store.insert_user(user.clone())?;

    // User row first: the token row references it.
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::users::save(pool, &user).await {
            tracing::error!(user_id = %user_id, error = %e, "failed to persist user");
            return Err(AppError::Internal("failed to persist user".into()));
        }
    }
    let token = finish_auth(&state, user_id).await?;
    tracing::info!(user_id = %user_id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

/// Exchange credentials for a fresh token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = AuthResponse),
        (status = 400, description = "Unknown account, wrong password or deactivated account", body = crate::error::ErrorBody),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let rejected = || AppError::Validation("unable to log in with the provided credentials".into());

    let email = normalize_email(&req.email).map_err(|_| rejected())?;
    let user = state.store.user_by_email(&email).ok_or_else(rejected)?;
    if !user.is_active || !verify_password(&req.password, &user.password) {
        return Err(rejected());
    }

    let token = finish_auth(&state, user.id).await?;
    tracing::info!(user_id = %user.id, "login succeeded");
    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// Mint a token, index its digest and mirror it to Postgres. Only the
/// plaintext is returned; it is never stored.
async fn finish_auth(state: &AppState, user_id: UserId) -> Result<String, AppError> {
    let (token, digest) = issue_token();
    state.store.insert_token(digest.clone(), user_id);
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::tokens::save(pool, &digest, &user_id).await {
            tracing::error!(user_id = %user_id, error = %e, "failed to persist token");
            return Err(AppError::Internal("failed to persist token".into()));
        }
    }
    Ok(token)
}
