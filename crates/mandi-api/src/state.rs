//! # Application State
//!
//! Shared state handed to every handler: the in-memory market store and
//! the optional Postgres pool. Cheaply cloneable — the store is an `Arc`
//! internally and the pool is already reference-counted.

use sqlx::PgPool;

use mandi_state::MarketStore;

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to bind. `MANDI_PORT`, default 8080.
    pub port: u16,
}

impl AppConfig {
    /// Resolve configuration from the environment.
    pub fn from_env() -> Self {
        let port = std::env::var("MANDI_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        Self { port }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// In-memory stores for all four resource types plus tokens.
    pub store: MarketStore,
    /// Optional Postgres mirror. `None` means in-memory-only mode.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// In-memory-only state (development and tests).
    pub fn new() -> Self {
        Self {
            store: MarketStore::new(),
            db_pool: None,
        }
    }

    /// State with an optional persistence pool.
    pub fn with_pool(db_pool: Option<PgPool>) -> Self {
        Self {
            store: MarketStore::new(),
            db_pool,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
