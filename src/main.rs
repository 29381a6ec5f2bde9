use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use carlot_booking::booking::SystemClock;
use carlot_booking::cache::AppCache;
use carlot_booking::config::Config;
use carlot_booking::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("carlot_booking=info,tower_http=info")),
        )
        .init();

    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    let state = AppState {
        db,
        cache: AppCache::new(config.cache_ttl),
        clock: Arc::new(SystemClock),
        config: Arc::new(config.clone()),
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(
        "Listening on {} (dealer offset {})",
        config.bind_addr, config.dealer_offset
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}
