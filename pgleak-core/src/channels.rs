//! Output channels for one invocation
//!
//! Two write-only channels, both injected:
//! - [`StatusSink`]: human-readable status lines (the "response")
//! - [`DiagnosticLog`]: diagnostic lines with a severity (the "error log")
//!
//! Writes are fire-and-forget. A sink that fails to write swallows the error;
//! an invocation never fails because its output could not be delivered.

use std::io::Write;

/// Severity of a diagnostic line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Receives status lines in order
pub trait StatusSink: Send {
    fn line(&mut self, line: &str);
}

/// Receives diagnostic lines.
///
/// `detail` carries extra context such as a failure reason, kept apart from
/// the fixed message text.
pub trait DiagnosticLog: Send + Sync {
    fn record(&self, severity: Severity, message: &str, detail: Option<&str>);
}

/// Status sink over any writer (stdout for the CLI)
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> StatusSink for WriterSink<W> {
    fn line(&mut self, line: &str) {
        let written = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush());
        if let Err(err) = written {
            tracing::debug!(error = %err, "Dropped status line");
        }
    }
}

/// Status sink that keeps lines in memory (HTTP responses, tests)
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    lines: Vec<String>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// One line per status line, newline-terminated
    pub fn render(&self) -> String {
        self.lines.iter().map(|line| format!("{}\n", line)).collect()
    }
}

impl StatusSink for BufferSink {
    fn line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Diagnostic log that forwards to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl DiagnosticLog for TracingLog {
    fn record(&self, severity: Severity, message: &str, detail: Option<&str>) {
        match (severity, detail) {
            (Severity::Info, None) => tracing::info!("{}", message),
            (Severity::Info, Some(detail)) => tracing::info!(detail, "{}", message),
            (Severity::Warn, None) => tracing::warn!("{}", message),
            (Severity::Warn, Some(detail)) => tracing::warn!(detail, "{}", message),
            (Severity::Error, None) => tracing::error!("{}", message),
            (Severity::Error, Some(detail)) => tracing::error!(detail, "{}", message),
        }
    }
}

/// Diagnostic log that keeps every record, for assertions
#[cfg(any(test, feature = "memory"))]
#[derive(Debug, Default)]
pub struct RecordingLog {
    records: std::sync::Mutex<Vec<(Severity, String, Option<String>)>>,
}

#[cfg(any(test, feature = "memory"))]
impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Severity and message of every record, in order
    pub fn records(&self) -> Vec<(Severity, String)> {
        self.entries()
            .into_iter()
            .map(|(severity, message, _)| (severity, message))
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|(_, message)| message).collect()
    }

    /// Detail of the first record with this message
    pub fn detail(&self, message: &str) -> Option<String> {
        self.entries()
            .into_iter()
            .find(|(_, recorded, _)| recorded == message)
            .and_then(|(_, _, detail)| detail)
    }

    fn entries(&self) -> Vec<(Severity, String, Option<String>)> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(any(test, feature = "memory"))]
impl DiagnosticLog for RecordingLog {
    fn record(&self, severity: Severity, message: &str, detail: Option<&str>) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((severity, message.to_string(), detail.map(str::to_string)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_sink_writes_one_line_each() {
        let mut sink = WriterSink::new(Vec::new());
        sink.line("Attempting to open a connection...");
        sink.line("Script ending");

        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "Attempting to open a connection...\nScript ending\n");
    }

    #[test]
    fn buffer_sink_renders_lines() {
        let mut sink = BufferSink::new();
        sink.line("a");
        sink.line("b");

        assert_eq!(sink.lines(), ["a", "b"]);
        assert_eq!(sink.render(), "a\nb\n");
    }

    #[test]
    fn recording_log_keeps_severity_and_detail() {
        let log = RecordingLog::new();
        log.record(Severity::Info, "hello", None);
        log.record(Severity::Error, "boom", Some("because"));

        assert_eq!(
            log.records(),
            vec![
                (Severity::Info, "hello".to_string()),
                (Severity::Error, "boom".to_string())
            ]
        );
        assert_eq!(log.detail("boom").as_deref(), Some("because"));
        assert_eq!(log.detail("hello"), None);
        assert_eq!(log.detail("missing"), None);
    }
}
