//! pgleak-server: HTTP trigger for the leak demonstrator
//!
//! Every request to `/`, `/leak` or `/safe` runs one invocation against the
//! configured database and answers with its status lines. Nothing is pooled:
//! N concurrent requests open N sessions.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
