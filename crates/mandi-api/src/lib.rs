//! # mandi-api — Axum API Service for the Mandi Marketplace
//!
//! HTTP surface over the marketplace: account registration and token
//! login, catalog administration, product listings and the order
//! lifecycle, with role- and ownership-based authorization on every
//! route.
//!
//! ## API Surface
//!
//! | Prefix | Module | Domain |
//! |--------|--------|--------|
//! | `/auth/*` | [`routes::auth`] | Registration, login |
//! | `/users/*` | [`routes::users`] | Account administration |
//! | `/categories/*` | [`routes::categories`] | Catalog taxonomy |
//! | `/products/*` | [`routes::products`] | Product listings |
//! | `/orders/*` | [`routes::orders`] | Order lifecycle |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```
//!
//! The auth middleware resolves the `Authorization` header into an
//! [`mandi_authz::Actor`] extension; handlers consult the authorization
//! engine with it. Requests without a header proceed as
//! `Actor::Anonymous` — which routes an anonymous actor may use is the
//! engine's decision, not the middleware's.
//!
//! ## OpenAPI
//!
//! Auto-generated OpenAPI spec via utoipa derive macros at `/openapi.json`.

pub mod auth;
pub mod bootstrap;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/openapi.json` are mounted outside the
/// auth middleware so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    // Body size limit: 2 MiB. This prevents OOM from oversized request
    // bodies; no marketplace payload comes anywhere near it.
    let api = Router::new()
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::categories::router())
        .merge(routes::products::router())
        .merge(routes::orders::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health", axum::routing::get(health))
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .merge(openapi::router())
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// Plain health endpoint for clients that poll a single path.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks that the in-memory store is accessible and, when configured,
/// that the database connection is healthy. Returns 200 "ready" or 503
/// with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.store.user_count();

    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
