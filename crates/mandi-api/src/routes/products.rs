//! Product listing endpoints.
//!
//! Reads are public. Only farmers create listings, and a listing is
//! mutated only by the farmer who owns it (or staff). Prices travel as
//! decimal strings and are held as integer minor units internally.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use mandi_authz::{can_perform, can_perform_on, Action, Actor, ResourceKind};
use mandi_core::{format_amount, parse_amount, CategoryId, ProductId, ProductStatus, UserId};
use mandi_state::Product;

use crate::auth::denied;
use crate::db;
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: ProductId,
    #[schema(value_type = String, format = Uuid)]
    pub farmer: UserId,
    #[schema(value_type = String, format = Uuid)]
    pub category: CategoryId,
    pub name: String,
    pub description: String,
    /// Decimal string, e.g. `"10.50"`.
    pub price: String,
    pub quantity: u32,
    pub unit: String,
    #[schema(value_type = String)]
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            farmer: product.farmer,
            category: product.category,
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_amount(product.price),
            quantity: product.quantity,
            unit: product.unit.clone(),
            status: product.status,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductsListResponse {
    pub products: Vec<ProductResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal string, e.g. `"10.50"`.
    pub price: String,
    pub quantity: u32,
    #[serde(default)]
    pub unit: String,
    #[schema(value_type = String, format = Uuid)]
    pub category: CategoryId,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<u32>,
    pub unit: Option<String>,
    #[schema(value_type = Option<String>)]
    pub status: Option<ProductStatus>,
    #[schema(value_type = Option<String>)]
    pub category: Option<CategoryId>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
}

/// List all products, newest first.
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    responses(
        (status = 200, description = "All products", body = ProductsListResponse),
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ProductsListResponse>, AppError> {
    if !can_perform(&actor, Action::List, ResourceKind::Product).is_allowed() {
        return Err(denied(&actor));
    }
    let products: Vec<ProductResponse> = state
        .store
        .list_products()
        .iter()
        .map(ProductResponse::from)
        .collect();
    let total = products.len();
    Ok(Json(ProductsListResponse { products, total }))
}

/// Fetch a single product.
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "The requested product", body = ProductResponse),
        (status = 404, description = "No such product", body = crate::error::ErrorBody),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .store
        .get_product(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;
    if !can_perform_on(&actor, Action::Read, ResourceKind::Product, &product).is_allowed() {
        return Err(denied(&actor));
    }
    Ok(Json(ProductResponse::from(&product)))
}

/// Create a listing. Farmers only; the acting user becomes the owner.
#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    security(("bearer_token" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid price, quantity or category", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    AppJson(req): AppJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    if !can_perform(&actor, Action::Create, ResourceKind::Product).is_allowed() {
        return Err(denied(&actor));
    }
    let farmer = actor
        .id()
        .ok_or_else(|| AppError::Unauthorized("authentication required".into()))?;

    if req.name.trim().is_empty() {
        return Err(AppError::Validation("product name must not be empty".into()));
    }
    let price = parse_amount(&req.price)?;
    if state.store.get_category(&req.category).is_none() {
        return Err(AppError::Validation(format!(
            "category {} does not exist",
            req.category
        )));
    }

    let product = Product::new(
        farmer,
        req.category,
        req.name,
        req.description,
        price,
        req.quantity,
        req.unit,
    );
    let id = product.id;
    state.store.insert_product(product.clone())?;
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::products::save(pool, &product).await {
            tracing::error!(product_id = %id, error = %e, "failed to persist product");
            return Err(AppError::Internal("failed to persist product".into()));
        }
    }
    tracing::info!(product_id = %id, farmer_id = %farmer, "product created");
    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}

/// Update a listing. Owning farmer or staff.
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Product identifier")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "The updated product", body = ProductResponse),
        (status = 400, description = "Invalid price or category", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such product", body = crate::error::ErrorBody),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<ProductId>,
    AppJson(req): AppJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .store
        .get_product(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;
    if !can_perform_on(&actor, Action::Update, ResourceKind::Product, &product).is_allowed() {
        return Err(denied(&actor));
    }

    let price = match req.price {
        Some(ref raw) => Some(parse_amount(raw)?),
        None => None,
    };
    if let Some(ref category) = req.category {
        if state.store.get_category(category).is_none() {
            return Err(AppError::Validation(format!(
                "category {category} does not exist"
            )));
        }
    }

    let updated = state.store.update_product(&id, |product| {
        if let Some(name) = req.name {
            product.name = name;
        }
        if let Some(description) = req.description {
            product.description = description;
        }
        if let Some(price) = price {
            product.price = price;
        }
        if let Some(quantity) = req.quantity {
            product.quantity = quantity;
        }
        if let Some(unit) = req.unit {
            product.unit = unit;
        }
        if let Some(status) = req.status {
            product.status = status;
        }
        if let Some(category) = req.category {
            product.category = category;
        }
    })?;

    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::products::save(pool, &updated).await {
            tracing::error!(product_id = %id, error = %e, "failed to persist product");
            return Err(AppError::Internal("failed to persist product".into()));
        }
    }
    Ok(Json(ProductResponse::from(&updated)))
}

/// Delete a listing. Owning farmer or staff; refused while orders still
/// reference it.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Product identifier")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such product", body = crate::error::ErrorBody),
        (status = 409, description = "Product still referenced by orders", body = crate::error::ErrorBody),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    let product = state
        .store
        .get_product(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;
    if !can_perform_on(&actor, Action::Delete, ResourceKind::Product, &product).is_allowed() {
        return Err(denied(&actor));
    }
    state.store.delete_product(&id)?;
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::products::delete(pool, &id).await {
            tracing::error!(product_id = %id, error = %e, "failed to delete persisted product");
            return Err(AppError::Internal("failed to delete product".into()));
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
