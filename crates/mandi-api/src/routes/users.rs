//! User administration endpoints.
//!
//! Listing and deletion are staff operations; a user may read and update
//! their own account. Privileged fields (`is_staff`, `is_active`) are
//! writable by staff only.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use mandi_authz::{can_perform, can_perform_on, Action, Actor, ResourceKind};
use mandi_core::{normalize_email, validate_password, Role, UserId};
use mandi_state::User;

use crate::auth::{denied, hash_password};
use crate::db;
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::state::AppState;

/// Public view of a user account. The credential hash never leaves the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    pub address: String,
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone_number: user.phone_number.clone(),
            address: user.address.clone(),
            role: user.role,
            is_staff: user.is_staff,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersListResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
}

/// List all user accounts, newest first.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "All registered users", body = UsersListResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UsersListResponse>, AppError> {
    if !can_perform(&actor, Action::List, ResourceKind::User).is_allowed() {
        return Err(denied(&actor));
    }
    let users: Vec<UserResponse> = state
        .store
        .list_users()
        .iter()
        .map(UserResponse::from)
        .collect();
    let total = users.len();
    Ok(Json(UsersListResponse { users, total }))
}

/// Fetch a single user account.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "The requested user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such user", body = crate::error::ErrorBody),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .store
        .get_user(&id)
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;
    if !can_perform_on(&actor, Action::Read, ResourceKind::User, &user).is_allowed() {
        return Err(denied(&actor));
    }
    Ok(Json(UserResponse::from(&user)))
}

/// Update a user account. Owners may edit their own profile; staff may
/// edit anyone and additionally flip `is_staff` / `is_active`.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "The updated user", body = UserResponse),
        (status = 400, description = "Invalid field value", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such user", body = crate::error::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<UserId>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .store
        .get_user(&id)
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;
    if !can_perform_on(&actor, Action::Update, ResourceKind::User, &user).is_allowed() {
        return Err(denied(&actor));
    }
    if (req.is_staff.is_some() || req.is_active.is_some()) && !actor.is_staff() {
        return Err(AppError::Forbidden(
            "only staff may change account flags".into(),
        ));
    }

    // Validate and pre-compute everything before entering the store
    // closure so a half-applied update can never be observed.
    let email = match req.email {
        Some(raw) => Some(normalize_email(&raw)?),
        None => None,
    };
    let password = match req.password {
        Some(raw) => {
            validate_password(&raw)?;
            Some(hash_password(&raw))
        }
        None => None,
    };

    let updated = state.store.update_user(&id, |user| {
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(password) = password {
            user.password = password;
        }
        if let Some(name) = req.name {
            user.name = name;
        }
        if let Some(phone_number) = req.phone_number {
            user.phone_number = phone_number;
        }
        if let Some(address) = req.address {
            user.address = address;
        }
        if let Some(role) = req.role {
            user.role = Some(role);
        }
        if let Some(is_staff) = req.is_staff {
            user.is_staff = is_staff;
        }
        if let Some(is_active) = req.is_active {
            user.is_active = is_active;
        }
    })?;

    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::users::save(pool, &updated).await {
            tracing::error!(user_id = %id, error = %e, "failed to persist user");
            return Err(AppError::Internal("failed to persist user".into()));
        }
        // Deactivation revoked the account's tokens in the store; mirror
        // that so hydration cannot resurrect them.
        if !updated.is_active {
            if let Err(e) = db::tokens::delete_for_user(pool, &id).await {
                tracing::error!(user_id = %id, error = %e, "failed to revoke persisted tokens");
                return Err(AppError::Internal("failed to persist user".into()));
            }
        }
    }
    Ok(Json(UserResponse::from(&updated)))
}

/// Delete a user account. Staff only; refused while the account still
/// owns products or orders.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such user", body = crate::error::ErrorBody),
        (status = 409, description = "User still referenced by products or orders", body = crate::error::ErrorBody),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<UserId>,
) -> Result<axum::http::StatusCode, AppError> {
    let user = state
        .store
        .get_user(&id)
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;
    if !can_perform_on(&actor, Action::Delete, ResourceKind::User, &user).is_allowed() {
        return Err(denied(&actor));
    }
    state.store.delete_user(&id)?;
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::users::delete(pool, &id).await {
            tracing::error!(user_id = %id, error = %e, "failed to delete persisted user");
            return Err(AppError::Internal("failed to delete user".into()));
        }
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}
