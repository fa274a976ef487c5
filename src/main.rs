//! Guildhall Engine - Backend API for the Guildhall gamification platform
//!
//! The Engine is the backend server that:
//! - Manages players, groups, and scoring in SQLite
//! - Tracks artifact and spell holdings and active spell effects
//! - Serves the platform REST API (profiles, leaderboards, search)

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::state::AppState;
use crate::infrastructure::workers::spell_expiry_worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guildhall_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Guildhall Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Database: {}", config.database_url);

    // Initialize application state
    let state = AppState::new(config).await?;
    let state = Arc::new(state);
    tracing::info!("Application state initialized");

    // Spell-expiry sweep worker (purges effects past their due timestamp)
    let expiry_worker = {
        let repository = state.repository.clone();
        let interval = state.config.expiry_sweep_secs;
        tokio::spawn(async move {
            tracing::info!("Starting spell expiry worker");
            spell_expiry_worker(repository, interval).await;
        })
    };

    // Build the router
    let app = Router::new()
        .route("/", get(http::homepage))
        .route("/health", get(health_check))
        // Merge REST API routes
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    let server = axum::serve(listener, app);

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping workers...");
            expiry_worker.abort();
            tracing::info!("Workers stopped");
        }
    }

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
