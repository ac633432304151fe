// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gist Tracker API Server
//!
//! Lets registered users manage their GitHub Gists with a stored personal
//! access token, caching GitHub responses per account.

use gist_tracker::{config::Config, db::AccountStore, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Gist Tracker API");

    // Open the account database and make sure the schema exists
    let db = AccountStore::connect(&config.database_url).await?;
    db.migrate().await?;

    tracing::info!(
        github_api = %config.github_api_url,
        cache_ttl_secs = config.gist_cache_ttl.as_secs(),
        "GitHub client configured"
    );

    // Build shared state
    let port = config.port;
    let state = Arc::new(AppState::new(config, db)?);

    // Build router
    let app = gist_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gist_tracker=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
