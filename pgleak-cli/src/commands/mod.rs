//! Command implementations for the pgleak CLI

pub mod run;
#[cfg(feature = "server")]
pub mod serve;
pub mod sessions;

pub use run::run_invocations;
#[cfg(feature = "server")]
pub use serve::run_serve;
pub use sessions::run_sessions;
