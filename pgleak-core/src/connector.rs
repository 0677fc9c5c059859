//! Connector seam - how a session is opened and released
//!
//! The demonstrator only knows these two traits. [`PgConnector`] is the real
//! thing: one bare `sqlx::PgConnection` per invocation, no pool.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

use crate::descriptor::ConnectionDescriptor;
use crate::error::ConnectionFailure;

/// `application_name` reported to the server, visible in `pg_stat_activity`
pub const APPLICATION_NAME: &str = "pgleak";

/// Opens sessions
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: Session;

    /// Open one session. No retries, no timeout.
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Self::Session, ConnectionFailure>;
}

/// A live session, owned by whoever opened it
#[async_trait]
pub trait Session: Send + 'static {
    /// Release the session. Consumes it, so it can be released at most once.
    async fn close(self) -> Result<(), ConnectionFailure>;
}

/// Connector backed by sqlx
#[derive(Debug, Default, Clone, Copy)]
pub struct PgConnector;

impl PgConnector {
    /// Driver options for a descriptor
    pub fn connect_options(descriptor: &ConnectionDescriptor) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(descriptor.host())
            .port(descriptor.port())
            .database(descriptor.database())
            .username(descriptor.user())
            .password(descriptor.password())
            .application_name(APPLICATION_NAME)
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<PgSession, ConnectionFailure> {
        tracing::debug!(target_db = %descriptor, "Opening connection");
        let conn = PgConnection::connect_with(&Self::connect_options(descriptor)).await?;
        Ok(PgSession { conn })
    }
}

/// One open PostgreSQL connection.
///
/// Dropping it closes the socket without the protocol goodbye; forgetting it
/// keeps the backend alive until the process exits.
pub struct PgSession {
    conn: PgConnection,
}

impl PgSession {
    /// The underlying connection, for running queries while it is held
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}

#[async_trait]
impl Session for PgSession {
    async fn close(self) -> Result<(), ConnectionFailure> {
        self.conn.close().await?;
        Ok(())
    }
}
