mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod pipeline;
mod routes;
mod services;
mod state;

use anyhow::Context;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use crate::{config::Config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;
    let address = format!("{}:{}", config.server.host, config.server.port);
    let idle = Duration::from_secs(config.workspace.idle_timeout_secs);
    let sweep_every = Duration::from_secs(config.workspace.sweep_interval_secs.max(1));

    let state = AppState::build(config)
        .await
        .context("Failed to open the account store")?;

    // Evict abandoned quote workspaces in the background
    state.workspaces.spawn_sweeper(idle, sweep_every);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server running on {}", address);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server stopped unexpectedly")?;
    Ok(())
}
