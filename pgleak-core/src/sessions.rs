//! Session inspection - how many backends are holding the database
//!
//! This is the outside view of a leak: every abandoned handle shows up here
//! as one more row in `pg_stat_activity` until the leaking process exits.

use sqlx::postgres::PgConnection;
use sqlx::Connection;

use crate::connector::PgConnector;
use crate::descriptor::ConnectionDescriptor;

const COUNT_SESSIONS: &str = r#"
    SELECT count(*)
    FROM pg_stat_activity
    WHERE datname = $1
      AND pid <> pg_backend_pid()
"#;

/// Count sessions on the descriptor's database, not including our own.
///
/// Opens a connection of its own and closes it before returning.
///
/// # Errors
///
/// Returns an error if connecting or querying fails.
pub async fn count_sessions(descriptor: &ConnectionDescriptor) -> Result<i64, sqlx::Error> {
    let mut conn = PgConnection::connect_with(&PgConnector::connect_options(descriptor)).await?;

    let count: i64 = sqlx::query_scalar(COUNT_SESSIONS)
        .bind(descriptor.database())
        .fetch_one(&mut conn)
        .await?;

    conn.close().await?;
    tracing::debug!(target_db = %descriptor, count, "Counted sessions");
    Ok(count)
}
