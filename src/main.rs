//! Assignment Portal - task upload and review API
//! Users upload assignments to admins; admins accept or reject them.

use anyhow::{Context, Result};
use assignment_portal::{
    config::{load_env, DEFAULT_LOG_FILTER},
    router, AppState, Config,
};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let config = Config::parse();

    info!("🚀 Assignment Portal starting");

    let state = AppState::from_config(&config)?;
    info!(
        "🔐 Authentication initialized (token lifetime {}h, bcrypt cost {})",
        config.token_ttl_hours, config.bcrypt_cost
    );

    let app = router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter support
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
