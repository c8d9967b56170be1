//! Order lifecycle endpoints.
//!
//! Buyers place orders and see only their own; staff see and manage
//! everything. The total is frozen at creation from the product's price
//! at that moment — later price edits never touch existing orders.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use mandi_authz::{can_perform, can_perform_on, Action, Actor, ResourceKind};
use mandi_core::{format_amount, total_price, OrderId, OrderStatus, ProductId, UserId};
use mandi_state::Order;

use crate::auth::denied;
use crate::db;
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: OrderId,
    #[schema(value_type = String, format = Uuid)]
    pub buyer: UserId,
    #[schema(value_type = String, format = Uuid)]
    pub product: ProductId,
    pub quantity: u32,
    /// Decimal string, e.g. `"21.00"`.
    pub total_price: String,
    #[schema(value_type = String)]
    pub status: OrderStatus,
    pub delivery_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            buyer: order.buyer,
            product: order.product,
            quantity: order.quantity,
            total_price: format_amount(order.total_price),
            status: order.status,
            delivery_date: order.delivery_date,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrdersListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: usize,
}

/// Unknown fields are ignored rather than rejected: the total is always
/// computed server-side, so a client-supplied price must not be an
/// error, merely irrelevant.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[schema(value_type = String, format = Uuid)]
    pub product: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderRequest {
    #[schema(value_type = Option<String>)]
    pub status: Option<OrderStatus>,
    pub delivery_date: Option<DateTime<Utc>>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/:id",
            get(get_order)
                .put(update_order)
                .patch(update_order)
                .delete(delete_order),
        )
}

/// List orders, newest first. Staff see every order; a buyer sees only
/// their own.
#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Visible orders", body = OrdersListResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<OrdersListResponse>, AppError> {
    if !can_perform(&actor, Action::List, ResourceKind::Order).is_allowed() {
        return Err(denied(&actor));
    }
    let records = if actor.is_staff() {
        state.store.list_orders()
    } else {
        // The engine already guaranteed an authenticated buyer here.
        let buyer = actor
            .id()
            .ok_or_else(|| AppError::Unauthorized("authentication required".into()))?;
        state.store.list_orders_for(&buyer)
    };
    let orders: Vec<OrderResponse> = records.iter().map(OrderResponse::from).collect();
    let total = orders.len();
    Ok(Json(OrdersListResponse { orders, total }))
}

/// Fetch a single order. Buyer who placed it, or staff.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "orders",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "The requested order", body = OrderResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such order", body = crate::error::ErrorBody),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .store
        .get_order(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;
    if !can_perform_on(&actor, Action::Read, ResourceKind::Order, &order).is_allowed() {
        return Err(denied(&actor));
    }
    Ok(Json(OrderResponse::from(&order)))
}

/// Place an order. Buyers only; the acting user becomes the buyer and
/// the total is computed from the product's current price.
#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    security(("bearer_token" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Unknown product or invalid quantity", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    AppJson(req): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    if !can_perform(&actor, Action::Create, ResourceKind::Order).is_allowed() {
        return Err(denied(&actor));
    }
    let buyer = actor
        .id()
        .ok_or_else(|| AppError::Unauthorized("authentication required".into()))?;

    if req.quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1".into()));
    }
    let product = state.store.get_product(&req.product).ok_or_else(|| {
        AppError::Validation(format!("product {} does not exist", req.product))
    })?;
    let total = total_price(product.price, req.quantity)?;

    let order = Order::new(buyer, req.product, req.quantity, total);
    let id = order.id;
    state.store.insert_order(order.clone())?;
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::orders::save(pool, &order).await {
            tracing::error!(order_id = %id, error = %e, "failed to persist order");
            return Err(AppError::Internal("failed to persist order".into()));
        }
    }
    tracing::info!(order_id = %id, buyer_id = %buyer, "order placed");
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// Update an order's status or delivery date. Staff only — buyers never
/// mutate orders once placed.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    tag = "orders",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Order identifier")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "The updated order", body = OrderResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such order", body = crate::error::ErrorBody),
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<OrderId>,
    AppJson(req): AppJson<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .store
        .get_order(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;
    if !can_perform_on(&actor, Action::Update, ResourceKind::Order, &order).is_allowed() {
        return Err(denied(&actor));
    }

    let updated = state.store.update_order(&id, |order| {
        if let Some(status) = req.status {
            order.status = status;
        }
        if let Some(delivery_date) = req.delivery_date {
            order.delivery_date = Some(delivery_date);
        }
    })?;

    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::orders::save(pool, &updated).await {
            tracing::error!(order_id = %id, error = %e, "failed to persist order");
            return Err(AppError::Internal("failed to persist order".into()));
        }
    }
    Ok(Json(OrderResponse::from(&updated)))
}

/// Delete an order. Staff only.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "orders",
    security(("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Order identifier")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "No such order", body = crate::error::ErrorBody),
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<OrderId>,
) -> Result<StatusCode, AppError> {
    let order = state
        .store
        .get_order(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;
    if !can_perform_on(&actor, Action::Delete, ResourceKind::Order, &order).is_allowed() {
        return Err(denied(&actor));
    }
    state.store.delete_order(&id)?;
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::orders::delete(pool, &id).await {
            tracing::error!(order_id = %id, error = %e, "failed to delete persisted order");
            return Err(AppError::Internal("failed to delete order".into()));
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
