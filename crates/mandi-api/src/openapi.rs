//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Opaque account token from /auth/register or /auth/login. \
                             Sent as `Authorization: Bearer <token>` (the `Token` \
                             prefix is also accepted).",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mandi API — Farm-to-Buyer Marketplace",
        version = "0.3.2",
        description = "HTTP API for the Mandi marketplace: farmers list produce, \
            buyers place orders, staff administer the catalog.\n\n\
            Authentication: opaque token via `Authorization: Bearer <token>`.\n\
            Catalog reads (`/categories`, `/products`) are public; everything \
            else requires a token. Health probes (`/health/*`) are unauthenticated.",
        license(name = "MIT"),
        contact(name = "Mandi", url = "https://github.com/mandi-market/mandi")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_token" = [])
    ),
    paths(
        // ── Auth ─────────────────────────────────────────────────────────
        crate::routes::auth::register,
        crate::routes::auth::login,
        // ── Users ────────────────────────────────────────────────────────
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        // ── Categories ───────────────────────────────────────────────────
        crate::routes::categories::list_categories,
        crate::routes::categories::get_category,
        crate::routes::categories::create_category,
        crate::routes::categories::update_category,
        crate::routes::categories::delete_category,
        // ── Products ─────────────────────────────────────────────────────
        crate::routes::products::list_products,
        crate::routes::products::get_product,
        crate::routes::products::create_product,
        crate::routes::products::update_product,
        crate::routes::products::delete_product,
        // ── Orders ───────────────────────────────────────────────────────
        crate::routes::orders::list_orders,
        crate::routes::orders::get_order,
        crate::routes::orders::create_order,
        crate::routes::orders::update_order,
        crate::routes::orders::delete_order,
    ),
    components(
        schemas(
            // ── Error types ──────────────────────────────────────────────
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            // ── Auth DTOs ────────────────────────────────────────────────
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::AuthResponse,
            // ── User DTOs ────────────────────────────────────────────────
            crate::routes::users::UserResponse,
            crate::routes::users::UsersListResponse,
            crate::routes::users::UpdateUserRequest,
            // ── Category DTOs ────────────────────────────────────────────
            crate::routes::categories::CategoryResponse,
            crate::routes::categories::CategoriesListResponse,
            crate::routes::categories::CreateCategoryRequest,
            crate::routes::categories::UpdateCategoryRequest,
            // ── Product DTOs ─────────────────────────────────────────────
            crate::routes::products::ProductResponse,
            crate::routes::products::ProductsListResponse,
            crate::routes::products::CreateProductRequest,
            crate::routes::products::UpdateProductRequest,
            // ── Order DTOs ───────────────────────────────────────────────
            crate::routes::orders::OrderResponse,
            crate::routes::orders::OrdersListResponse,
            crate::routes::orders::CreateOrderRequest,
            crate::routes::orders::UpdateOrderRequest,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and token login"),
        (name = "users", description = "Account administration — staff list/delete, owners read/update themselves"),
        (name = "categories", description = "Catalog taxonomy — public reads, staff writes"),
        (name = "products", description = "Product listings — public reads, farmer-owned writes"),
        (name = "orders", description = "Order lifecycle — buyers place, staff manage"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates_successfully() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Mandi API — Farm-to-Buyer Marketplace");
    }

    #[test]
    fn test_openapi_spec_has_paths() {
        let spec = ApiDoc::openapi();
        for path in &[
            "/auth/register",
            "/auth/login",
            "/users",
            "/users/{id}",
            "/categories",
            "/categories/{id}",
            "/products",
            "/products/{id}",
            "/orders",
            "/orders/{id}",
        ] {
            assert!(
                spec.paths.paths.contains_key(*path),
                "should contain {path} path"
            );
        }
    }

    #[test]
    fn test_openapi_spec_has_tags() {
        let spec = ApiDoc::openapi();
        let tags = spec.tags.as_ref().expect("spec should have tags");
        let tag_names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        for expected in &["auth", "users", "categories", "products", "orders"] {
            assert!(tag_names.contains(expected), "should contain {expected} tag");
        }
    }

    #[test]
    fn test_openapi_spec_has_components() {
        let spec = ApiDoc::openapi();
        let schemas = &spec.components.as_ref().unwrap().schemas;
        for name in &[
            "ErrorBody",
            "AuthResponse",
            "UserResponse",
            "CategoryResponse",
            "ProductResponse",
            "OrderResponse",
        ] {
            assert!(schemas.contains_key(*name), "should contain {name} schema");
        }
    }

    #[test]
    fn test_openapi_spec_has_security_scheme() {
        let spec = ApiDoc::openapi();
        let components = spec.components.as_ref().unwrap();
        assert!(
            components.security_schemes.contains_key("bearer_token"),
            "should contain bearer_token security scheme"
        );
    }

    #[test]
    fn test_openapi_spec_serializes_to_json() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).expect("spec should serialize");
        assert!(json.contains("openapi"));
        assert!(json.contains("bearer_token"));
    }

    #[test]
    fn test_router_builds_successfully() {
        let _router = router();
    }
}
