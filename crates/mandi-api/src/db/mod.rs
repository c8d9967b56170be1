//! # Database Persistence Layer
//!
//! Postgres persistence for marketplace state via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, every
//! accepted mutation is mirrored to PostgreSQL and the in-memory store is
//! rehydrated from it at startup. When absent, the API operates in
//! in-memory-only mode (suitable for development and testing).
//!
//! All reads are served from the in-memory store; Postgres is written
//! after the store accepts a change and read only during hydration.

pub mod categories;
pub mod orders;
pub mod products;
pub mod tokens;
pub mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};

use mandi_state::MarketStore;

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Rebuild the in-memory store from Postgres at startup.
///
/// Rows are loaded in referential order (users before products, products
/// before orders). A row the store refuses — a dangling reference left by
/// manual surgery on the database — is logged and skipped rather than
/// aborting startup.
pub async fn hydrate(pool: &PgPool, store: &MarketStore) -> Result<(), sqlx::Error> {
    let mut skipped = 0usize;

    for user in users::load_all(pool).await? {
        let id = user.id;
        if let Err(e) = store.insert_user(user) {
            tracing::warn!(user_id = %id, error = %e, "skipping user during hydration");
            skipped += 1;
        }
    }
    for (digest, user_id) in tokens::load_all(pool).await? {
        store.insert_token(digest, user_id);
    }
    for category in categories::load_all(pool).await? {
        let id = category.id;
        if let Err(e) = store.insert_category(category) {
            tracing::warn!(category_id = %id, error = %e, "skipping category during hydration");
            skipped += 1;
        }
    }
    for product in products::load_all(pool).await? {
        let id = product.id;
        if let Err(e) = store.insert_product(product) {
            tracing::warn!(product_id = %id, error = %e, "skipping product during hydration");
            skipped += 1;
        }
    }
    for order in orders::load_all(pool).await? {
        let id = order.id;
        if let Err(e) = store.insert_order(order) {
            tracing::warn!(order_id = %id, error = %e, "skipping order during hydration");
            skipped += 1;
        }
    }

    tracing::info!(
        users = store.user_count(),
        categories = store.category_count(),
        products = store.product_count(),
        orders = store.order_count(),
        skipped,
        "store hydrated from database"
    );
    Ok(())
}
