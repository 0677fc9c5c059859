//! The leak demonstrator
//!
//! One invocation: open a session, hold it, then release it (safe) or
//! abandon it (leaky). Failure to connect is an [`Outcome`], not an error.
//!
//! The sequence is fixed:
//!
//! ```text
//! Attempting to open a connection...
//! Connection Successful!            | ERROR: Could not connect to database.
//! (hold, then close or abandon)     |
//! Script ending
//! ```

use std::time::Duration;

use crate::channels::{DiagnosticLog, Severity, StatusSink};
use crate::connector::{Connector, Session};
use crate::descriptor::ConnectionDescriptor;

/// How long a session is held before it is released or abandoned
pub const DEFAULT_HOLD: Duration = Duration::from_secs(30);

/// Lines written to the status channel
pub mod status {
    pub const ATTEMPTING: &str = "Attempting to open a connection...";
    pub const CONNECTED: &str = "Connection Successful!";
    pub const FAILED: &str = "ERROR: Could not connect to database.";
    pub const ENDING: &str = "Script ending";
}

/// Lines written to the diagnostic channel
pub mod diagnostics {
    pub const RECEIVED: &str = "Request received, attempting to connect...";
    pub const CONNECTED: &str = "Connection successful!";
    pub const FAILED: &str = "ERROR: Could not connect to database";
    pub const LEFT_OPEN: &str = "Connection left open";
    pub const CLOSED: &str = "Connection closed";
    pub const CLOSE_FAILED: &str = "Connection close failed";
    pub const ENDING: &str = "Script ending";
}

/// Result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A session was opened (and then held, released or abandoned)
    Connected,
    /// The session could not be opened
    Failed(String),
}

impl Outcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Failed(_) => "failed",
        }
    }
}

/// Whether a held session is released afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Close the session after the hold
    Safe,
    /// Never close the session
    Leaky,
}

impl Variant {
    pub fn from_leak(leak: bool) -> Self {
        if leak {
            Self::Leaky
        } else {
            Self::Safe
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Leaky => "leaky",
        }
    }
}

/// Demonstrator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoConfig {
    /// Abandon the session instead of closing it
    pub leak: bool,
    /// How long to hold the session
    pub hold: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            leak: false,
            hold: DEFAULT_HOLD,
        }
    }
}

impl DemoConfig {
    pub fn variant(&self) -> Variant {
        Variant::from_leak(self.leak)
    }
}

/// Runs invocations against one connector
#[derive(Debug, Clone)]
pub struct Demonstrator<C> {
    connector: C,
    config: DemoConfig,
}

impl<C: Connector> Demonstrator<C> {
    pub fn new(connector: C, config: DemoConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Run one invocation.
    ///
    /// Every path writes a start and an end status line. The hold is never
    /// cut short: there is no timeout and no cancellation hook.
    #[tracing::instrument(
        name = "invocation",
        skip_all,
        fields(target_db = %descriptor, variant = self.config.variant().as_str())
    )]
    pub async fn run(
        &self,
        descriptor: &ConnectionDescriptor,
        out: &mut dyn StatusSink,
        log: &dyn DiagnosticLog,
    ) -> Outcome {
        log.record(Severity::Info, diagnostics::RECEIVED, None);
        out.line(status::ATTEMPTING);

        let outcome = match self.connector.connect(descriptor).await {
            Ok(session) => {
                log.record(Severity::Info, diagnostics::CONNECTED, None);
                out.line(status::CONNECTED);
                self.hold_then_release(session, log).await;
                Outcome::Connected
            }
            Err(failure) => {
                log.record(Severity::Error, diagnostics::FAILED, Some(&failure.reason));
                out.line(status::FAILED);
                Outcome::Failed(failure.reason)
            }
        };

        log.record(Severity::Info, diagnostics::ENDING, None);
        out.line(status::ENDING);
        outcome
    }

    async fn hold_then_release(&self, session: C::Session, log: &dyn DiagnosticLog) {
        tokio::time::sleep(self.config.hold).await;

        match self.config.variant() {
            Variant::Leaky => {
                // No destructor runs: the backend stays up until the process exits.
                std::mem::forget(session);
                log.record(Severity::Warn, diagnostics::LEFT_OPEN, None);
            }
            Variant::Safe => match session.close().await {
                Ok(()) => log.record(Severity::Info, diagnostics::CLOSED, None),
                Err(failure) => {
                    log.record(Severity::Warn, diagnostics::CLOSE_FAILED, Some(&failure.reason))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{BufferSink, RecordingLog};
    use crate::memory::MemoryConnector;
    use tokio::time::Instant;

    fn demonstrator(server: &MemoryConnector, leak: bool) -> Demonstrator<MemoryConnector> {
        Demonstrator::new(
            server.clone(),
            DemoConfig {
                leak,
                hold: DEFAULT_HOLD,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn safe_variant_connects_holds_and_closes_once() {
        let server = MemoryConnector::sample();
        let mut out = BufferSink::new();
        let log = RecordingLog::new();

        let started = Instant::now();
        let outcome = demonstrator(&server, false)
            .run(&ConnectionDescriptor::sample(), &mut out, &log)
            .await;

        assert_eq!(outcome, Outcome::Connected);
        assert!(started.elapsed() >= DEFAULT_HOLD);
        assert_eq!(
            out.lines(),
            [status::ATTEMPTING, status::CONNECTED, status::ENDING]
        );
        assert_eq!(server.connects(), 1);
        assert_eq!(server.closes(), 1);
        assert_eq!(server.open_sessions(), 0);
        assert!(log.messages().contains(&diagnostics::CLOSED.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn safe_variant_close_failure_is_logged_not_fatal() {
        let server = MemoryConnector::sample();
        server.set_close_fails(true);
        let mut out = BufferSink::new();
        let log = RecordingLog::new();

        let outcome = demonstrator(&server, false)
            .run(&ConnectionDescriptor::sample(), &mut out, &log)
            .await;

        assert_eq!(outcome, Outcome::Connected);
        assert_eq!(
            out.lines(),
            [status::ATTEMPTING, status::CONNECTED, status::ENDING]
        );
        assert_eq!(server.closes(), 1);
        assert!(log
            .records()
            .contains(&(Severity::Warn, diagnostics::CLOSE_FAILED.to_string())));
        assert_eq!(log.detail(diagnostics::CLOSE_FAILED).as_deref(), Some("broken pipe"));
        assert!(!log.messages().contains(&diagnostics::CLOSED.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn leaky_variant_never_releases() {
        let server = MemoryConnector::sample();
        let mut out = BufferSink::new();
        let log = RecordingLog::new();

        let outcome = demonstrator(&server, true)
            .run(&ConnectionDescriptor::sample(), &mut out, &log)
            .await;

        assert_eq!(outcome, Outcome::Connected);
        assert_eq!(
            out.lines(),
            [status::ATTEMPTING, status::CONNECTED, status::ENDING]
        );
        assert_eq!(server.closes(), 0);
        assert_eq!(server.open_sessions(), 1);
        assert!(log
            .records()
            .contains(&(Severity::Warn, diagnostics::LEFT_OPEN.to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_host_fails_without_a_session() {
        let server = MemoryConnector::sample();
        let mut out = BufferSink::new();
        let log = RecordingLog::new();
        let nowhere = ConnectionDescriptor::new("nonexistent", "coolappdb", "thedbuser", "x").unwrap();

        let started = Instant::now();
        let outcome = demonstrator(&server, true).run(&nowhere, &mut out, &log).await;

        assert!(matches!(outcome, Outcome::Failed(ref reason) if reason.contains("nonexistent")));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(
            out.lines(),
            [status::ATTEMPTING, status::FAILED, status::ENDING]
        );
        assert_eq!(server.connects(), 0);
        assert_eq!(server.open_sessions(), 0);
        assert_eq!(
            log.records(),
            vec![
                (Severity::Info, diagnostics::RECEIVED.to_string()),
                (Severity::Error, diagnostics::FAILED.to_string()),
                (Severity::Info, diagnostics::ENDING.to_string()),
            ]
        );
        let reason = log.detail(diagnostics::FAILED).expect("failure reason recorded");
        assert!(reason.contains("nonexistent"));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_leaky_runs_accumulate_sessions() {
        let server = MemoryConnector::sample();
        let demo = demonstrator(&server, true);
        let log = RecordingLog::new();

        for _ in 0..5 {
            let mut out = BufferSink::new();
            let outcome = demo.run(&ConnectionDescriptor::sample(), &mut out, &log).await;
            assert!(outcome.is_connected());
        }

        assert_eq!(server.connects(), 5);
        assert_eq!(server.open_sessions(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_safe_runs_leave_nothing_open() {
        let server = MemoryConnector::sample();
        let demo = demonstrator(&server, false);
        let log = RecordingLog::new();

        for _ in 0..5 {
            let mut out = BufferSink::new();
            assert!(demo
                .run(&ConnectionDescriptor::sample(), &mut out, &log)
                .await
                .is_connected());
        }

        assert_eq!(server.closes(), 5);
        assert_eq!(server.open_sessions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn session_is_held_for_the_whole_interval() {
        let server = MemoryConnector::sample();
        let demo = demonstrator(&server, false);
        let observer = server.clone();

        let handle = tokio::spawn(async move {
            let mut out = BufferSink::new();
            let log = RecordingLog::new();
            demo.run(&ConnectionDescriptor::sample(), &mut out, &log).await
        });

        tokio::time::sleep(DEFAULT_HOLD - Duration::from_secs(1)).await;
        assert_eq!(observer.open_sessions(), 1);
        assert!(!handle.is_finished());

        assert_eq!(handle.await.unwrap(), Outcome::Connected);
        assert_eq!(observer.open_sessions(), 0);
    }

    #[test]
    fn variant_and_outcome_labels() {
        assert_eq!(Variant::from_leak(true), Variant::Leaky);
        assert_eq!(DemoConfig::default().variant(), Variant::Safe);
        assert_eq!(DemoConfig::default().hold, Duration::from_secs(30));
        assert_eq!(Outcome::Connected.as_str(), "connected");
        assert_eq!(Outcome::Failed("x".into()).as_str(), "failed");
    }
}
