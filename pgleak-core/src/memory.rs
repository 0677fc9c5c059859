//! In-memory database stand-in
//!
//! Accepts connections for one host/database pair and counts what happens to
//! them. A session that is closed or dropped stops counting as open; a
//! session that is forgotten stays open forever, which is exactly what a
//! leaked backend looks like from the server's side.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::connector::{Connector, Session};
use crate::descriptor::ConnectionDescriptor;
use crate::error::ConnectionFailure;

#[derive(Debug)]
struct ServerState {
    host: String,
    database: String,
    reachable: AtomicBool,
    close_fails: AtomicBool,
    connects: AtomicUsize,
    closes: AtomicUsize,
    open: AtomicUsize,
}

/// Connector onto an in-memory server. Clones share the same server.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    state: Arc<ServerState>,
}

impl MemoryConnector {
    /// A reachable server at `host` hosting `database`
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            state: Arc::new(ServerState {
                host: host.into(),
                database: database.into(),
                reachable: AtomicBool::new(true),
                close_fails: AtomicBool::new(false),
                connects: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
                open: AtomicUsize::new(0),
            }),
        }
    }

    /// Server matching [`ConnectionDescriptor::sample`]
    pub fn sample() -> Self {
        Self::new("db", "coolappdb")
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Make every later close report an error. The session still goes away,
    /// as a socket does when the goodbye message cannot be sent.
    pub fn set_close_fails(&self, fails: bool) {
        self.state.close_fails.store(fails, Ordering::SeqCst);
    }

    /// Successful connects so far
    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Close attempts so far, failed ones included
    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Sessions the server still considers alive
    pub fn open_sessions(&self) -> usize {
        self.state.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Session = MemorySession;

    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<MemorySession, ConnectionFailure> {
        let state = &self.state;
        if !state.reachable.load(Ordering::SeqCst) || descriptor.host() != state.host {
            return Err(ConnectionFailure::new(format!(
                "could not connect to server at \"{}\" port {}",
                descriptor.host(),
                descriptor.port()
            )));
        }
        if descriptor.database() != state.database {
            return Err(ConnectionFailure::new(format!(
                "database \"{}\" does not exist",
                descriptor.database()
            )));
        }

        state.connects.fetch_add(1, Ordering::SeqCst);
        state.open.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySession {
            state: Arc::clone(state),
            released: false,
        })
    }
}

/// Session on a [`MemoryConnector`]
#[derive(Debug)]
pub struct MemorySession {
    state: Arc<ServerState>,
    released: bool,
}

impl MemorySession {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.state.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn close(mut self) -> Result<(), ConnectionFailure> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        self.release();
        if self.state.close_fails.load(Ordering::SeqCst) {
            return Err(ConnectionFailure::new("broken pipe"));
        }
        Ok(())
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.release();
    }
}
