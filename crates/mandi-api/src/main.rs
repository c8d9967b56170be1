//! mandi-api server binary.

use mandi_api::state::{AppConfig, AppState};
use mandi_api::{app, bootstrap, db};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env();
    let pool = db::init_pool().await?;
    let state = AppState::with_pool(pool);
    if let Some(ref pool) = state.db_pool {
        db::hydrate(pool, &state.store).await?;
    }
    if let Err(e) = bootstrap::ensure_admin(&state).await {
        tracing::error!(error = %e, "admin bootstrap failed");
        return Err(format!("admin bootstrap failed: {e}").into());
    }

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "mandi-api listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Structured logging: compact human output by default, JSON when
/// `MANDI_LOG_JSON=true`. Level via `RUST_LOG`, default `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("MANDI_LOG_JSON")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
