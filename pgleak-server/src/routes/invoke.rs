//! Invocation endpoints
//!
//! - `GET /`      run with the server's configured variant
//! - `GET /leak`  run the leaky variant
//! - `GET /safe`  run the safe variant
//!
//! The body is the status lines as plain text. The outcome goes in the
//! `x-pgleak-outcome` header; a failed connection is still a 200, the same
//! way the page it imitates always rendered.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use pgleak_core::{BufferSink, Connector, DemoConfig, Demonstrator, TracingLog};

use crate::error::ApiError;
use crate::server::AppState;

/// Response header carrying `connected` or `failed`
pub const OUTCOME_HEADER: &str = "x-pgleak-outcome";

/// Invocation routes
pub fn router<C>() -> Router<Arc<AppState<C>>>
where
    C: Connector + Clone + 'static,
{
    Router::new()
        .route("/", get(run_configured::<C>))
        .route("/leak", get(run_leaky::<C>))
        .route("/safe", get(run_safe::<C>))
}

/// GET /
async fn run_configured<C>(State(state): State<Arc<AppState<C>>>) -> Response
where
    C: Connector + Clone + 'static,
{
    let leak = state.demo.leak;
    invoke(state, leak).await
}

/// GET /leak
async fn run_leaky<C>(State(state): State<Arc<AppState<C>>>) -> Response
where
    C: Connector + Clone + 'static,
{
    invoke(state, true).await
}

/// GET /safe
async fn run_safe<C>(State(state): State<Arc<AppState<C>>>) -> Response
where
    C: Connector + Clone + 'static,
{
    invoke(state, false).await
}

async fn invoke<C>(state: Arc<AppState<C>>, leak: bool) -> Response
where
    C: Connector + Clone + 'static,
{
    let demo = Demonstrator::new(
        state.connector.clone(),
        DemoConfig {
            leak,
            ..state.demo
        },
    );
    let descriptor = state.descriptor.clone();

    // Spawned so a client hanging up mid-hold does not cut the hold short.
    let task = tokio::spawn(async move {
        let mut out = BufferSink::new();
        let outcome = demo.run(&descriptor, &mut out, &TracingLog).await;
        (outcome, out)
    });

    match task.await {
        Ok((outcome, out)) => (
            [
                (CONTENT_TYPE, "text/plain; charset=utf-8"),
                (HeaderName::from_static(OUTCOME_HEADER), outcome.as_str()),
            ],
            out.render(),
        )
            .into_response(),
        Err(err) => ApiError::internal(format!("invocation task failed: {}", err)).into_response(),
    }
}
