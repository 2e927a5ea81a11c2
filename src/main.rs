use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::{info, warn};

use kickstash::api::{RateLimitConfig, create_router_with_rate_limit};
use kickstash::app::AppState;
use kickstash::infra::{
    JwtAuthProvider, JwtConfig, PostgresStore, init_metrics_handle, init_tracing,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    init_tracing();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let jwt_config = JwtConfig::from_env().context("JWT configuration is incomplete")?;
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    // Persistence: one store instance plays user store, sneaker store and
    // unit of work
    let store = Arc::new(
        PostgresStore::with_defaults(&database_url)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );
    store
        .run_migrations()
        .await
        .context("Failed to run database migrations")?;

    let auth = Arc::new(JwtAuthProvider::new(jwt_config));

    let users: Arc<dyn kickstash::domain::UserStore> = store.clone();
    let sneakers: Arc<dyn kickstash::domain::SneakerStore> = store.clone();
    let uow: Arc<dyn kickstash::domain::UnitOfWork> = store;
    let mut app_state = AppState::new(users, sneakers, uow, auth);
    match init_metrics_handle() {
        Some(handle) => app_state = app_state.with_metrics(handle),
        None => warn!("Metrics recorder not installed; GET /metrics will 404"),
    }

    let router = create_router_with_rate_limit(Arc::new(app_state), &RateLimitConfig::from_env());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server starting on http://{bind_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
