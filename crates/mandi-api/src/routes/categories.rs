//! Catalog taxonomy endpoints.
//!
//! Reads are public — anonymous callers may browse the catalog. All
//! writes are staff operations. Category names are unique.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use mandi_authz::{can_perform, Action, Actor, ResourceKind};
use mandi_core::CategoryId;
use mandi_state::Category;

use crate::auth::denied;
use crate::db;
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesListResponse {
    pub categories: Vec<CategoryResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .put(update_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

/// List all categories, sorted by name.
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "All categories", body = CategoriesListResponse),
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<CategoriesListResponse>, AppError> {
    if !can_perform(&actor, Action::List, ResourceKind::Category).is_allowed() {
        return Err(denied(&actor));
    }
    let categories: Vec<CategoryResponse> = state
        .store
        .list_categories()
        .iter()
        .map(CategoryResponse::from)
        .collect();
    let total = categories.len();
    Ok(Json(CategoriesListResponse { categories, total }))
}

/// Fetch a single category.
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category identifier")),
    responses(
        (status = 200, description = "The requested category", body = CategoryResponse),
        (status = 404, description = "No such category", body = crate::error::ErrorBody),
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryResponse>, AppError> {
    // Categories carry no owner, so the collection-level decision is the
    // whole decision.
    if !can_perform(&actor, Action::Read, ResourceKind::Category).is_allowed() {
        return Err(denied(&actor));
    }
    let category = state
        .store
        .get_category(&id)
        .ok_or_else(|| AppError::NotFound(format!("category {id} not found")))?;
    Ok(Json(CategoryResponse::from(&category)))
}

/// Create a category. Staff only.
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    security(("bearer_token" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 409, description = "Name already taken", body = crate::error::ErrorBody),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    AppJson(req): AppJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    if !can_perform(&actor, Action::Create, ResourceKind::Category).is_allowed() {
        return Err(denied(&actor));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("category name must not be empty".into()));
    }

    let category = Category::new(req.name, req.description);
    let id = category.id;
    state.store.insert_category(category.clone())?;
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::categories::save(pool, &category).await {
            tracing::error!(category_id = %id, error = %e, "failed to persist category");
            return Err(AppError::Internal("failed to persist category".into()));
        }
    }
    tracing::info!(category_id = %id, "category created");
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(&category))))
}

/// Update a category. Staff only.
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Category identifier")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "The updated category", body = CategoryResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such category", body = crate::error::ErrorBody),
        (status = 409, description = "Name already taken", body = crate::error::ErrorBody),
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<CategoryId>,
    AppJson(req): AppJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    if !can_perform(&actor, Action::Update, ResourceKind::Category).is_allowed() {
        return Err(denied(&actor));
    }
    if state.store.get_category(&id).is_none() {
        return Err(AppError::NotFound(format!("category {id} not found")));
    }
    if let Some(ref name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("category name must not be empty".into()));
        }
    }

    let updated = state.store.update_category(&id, |category| {
        if let Some(name) = req.name {
            category.name = name;
        }
        if let Some(description) = req.description {
            category.description = description;
        }
    })?;

    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::categories::save(pool, &updated).await {
            tracing::error!(category_id = %id, error = %e, "failed to persist category");
            return Err(AppError::Internal("failed to persist category".into()));
        }
    }
    Ok(Json(CategoryResponse::from(&updated)))
}

/// Delete a category. Staff only; refused while products still reference
/// it.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Category identifier")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such category", body = crate::error::ErrorBody),
        (status = 409, description = "Category still referenced by products", body = crate::error::ErrorBody),
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, AppError> {
    if !can_perform(&actor, Action::Delete, ResourceKind::Category).is_allowed() {
        return Err(denied(&actor));
    }
    if state.store.get_category(&id).is_none() {
        return Err(AppError::NotFound(format!("category {id} not found")));
    }
    state.store.delete_category(&id)?;
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::categories::delete(pool, &id).await {
            tracing::error!(category_id = %id, error = %e, "failed to delete persisted category");
            return Err(AppError::Internal("failed to delete category".into()));
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
