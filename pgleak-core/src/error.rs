//! Error types for pgleak-core.
//!
//! Descriptor problems are structured so callers can point at the bad field.
//! Connection failures are not: the demonstrator reports one unclassified
//! failure kind, whatever the driver said.

use thiserror::Error;

/// Errors raised while building or parsing a [`ConnectionDescriptor`](crate::ConnectionDescriptor)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// A required field was empty
    #[error("Connection descriptor field '{field}' must not be empty")]
    Empty { field: &'static str },

    /// A keyword in a connection string is not one we understand
    #[error("Unknown connection string keyword '{key}'")]
    UnknownKey { key: String },

    /// A connection string fragment could not be parsed
    #[error("Malformed connection string near '{fragment}': {reason}")]
    Malformed { fragment: String, reason: String },

    /// Port was not a valid u16
    #[error("Invalid port '{value}'")]
    InvalidPort { value: String },
}

impl DescriptorError {
    /// Create a malformed connection string error
    pub fn malformed(fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }
}

/// The connection could not be opened (or closed).
///
/// Carries the driver's message verbatim and nothing else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ConnectionFailure {
    pub reason: String,
}

impl ConnectionFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for ConnectionFailure {
    fn from(err: sqlx::Error) -> Self {
        Self::new(err.to_string())
    }
}
