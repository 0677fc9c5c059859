//! Liveness plus what `GET /` would do
//!
//! Never touches the database: a health check that opened a session would
//! itself show up in the session count.

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use pgleak_core::Connector;
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// `host:port/dbname`, no credentials
    pub target_db: String,
    /// `safe` or `leaky`
    pub variant: &'static str,
    pub hold_secs: u64,
}

/// GET /health
async fn health<C>(State(state): State<Arc<AppState<C>>>) -> Json<HealthResponse>
where
    C: Connector + Clone + 'static,
{
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        target_db: state.descriptor.to_string(),
        variant: state.demo.variant().as_str(),
        hold_secs: state.demo.hold.as_secs(),
    })
}

pub fn router<C>() -> Router<Arc<AppState<C>>>
where
    C: Connector + Clone + 'static,
{
    Router::new().route("/health", get(health::<C>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgleak_core::{ConnectionDescriptor, DemoConfig, MemoryConnector};
    use std::time::Duration;

    #[tokio::test]
    async fn reports_target_and_variant_without_connecting() {
        let server = MemoryConnector::sample();
        let state = Arc::new(AppState {
            connector: server.clone(),
            descriptor: ConnectionDescriptor::sample(),
            demo: DemoConfig {
                leak: true,
                hold: Duration::from_secs(30),
            },
        });

        let Json(body) = health(State(state)).await;

        assert_eq!(body.status, "ok");
        assert_eq!(body.target_db, "db:5432/coolappdb");
        assert_eq!(body.variant, "leaky");
        assert_eq!(body.hold_secs, 30);
        assert_eq!(server.connects(), 0);
    }
}
