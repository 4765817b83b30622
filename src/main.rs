//! Soc Session Server - authoritative server for a physics-driven ball game
//!
//! This is the main entry point. It handles:
//! - WebSocket connections for real-time play
//! - The fixed-rate physics, broadcast and control loops of the session
//! - Serving the static client and a health endpoint

mod app;
mod config;
mod game;
mod http;
mod physics;
mod util;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::Config;
use crate::game::{Session, SessionState};
use crate::http::build_router;
use crate::util::time::{init_server_time, BROADCAST_TPS, SIMULATION_TPS};
use crate::ws::hub::Hub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_json);

    // Initialize server time tracking
    init_server_time();

    info!("Starting Soc Session Server");
    info!("Server address: {}", config.server_addr);

    let seed = config.session_seed.unwrap_or_else(rand::random);
    let session_state = SessionState::new(seed)?.shared();
    info!(
        seed,
        physics_tps = SIMULATION_TPS,
        broadcast_tps = BROADCAST_TPS,
        "Session created"
    );

    let (hub, receivers) = Hub::new();
    let hub = Arc::new(hub);
    let session = Session::spawn(session_state.clone(), hub.clone(), receivers);

    // Build router
    let state = AppState::new(config.clone(), hub, session_state);
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);
    match &config.static_dir {
        Some(dir) => info!("Client files: {}", dir.display()),
        None => info!("No STATIC_DIR set, serving API routes only"),
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
