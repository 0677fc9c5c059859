//! Axum server setup
//!
//! Server skeleton with:
//! - CORS off unless asked for
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use pgleak_core::{ConnectionDescriptor, Connector, DemoConfig};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = no CORS headers)
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_permissive: false,
        }
    }
}

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState<C> {
    pub connector: C,
    /// Database every invocation connects to
    pub descriptor: ConnectionDescriptor,
    /// Default variant and hold for `/`
    pub demo: DemoConfig,
}

/// Build the application router with all routes
pub fn build_router<C>(state: AppState<C>, cors_permissive: bool) -> Router
where
    C: Connector + Clone + 'static,
{
    let app = Router::new()
        .merge(routes::health::router::<C>())
        .merge(routes::invoke::router::<C>())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state));

    if cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
///
/// # Example
///
/// ```ignore
/// let state = AppState { connector: PgConnector, descriptor, demo: DemoConfig::default() };
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server<C>(state: AppState<C>, config: ServerConfig) -> Result<(), ServerError>
where
    C: Connector + Clone + 'static,
{
    tracing::info!(
        target_db = %state.descriptor,
        variant = state.demo.variant().as_str(),
        hold_secs = state.demo.hold.as_secs(),
        "Demonstrator configured"
    );
    let app = build_router(state, config.cors_permissive);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
