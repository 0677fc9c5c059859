//! pgleak-core: connection leak demonstrator
//!
//! Opens a PostgreSQL session, holds it, then either closes it or walks away
//! from it. The walking away is the point: repeated leaky invocations pile up
//! backends on the server until something runs out.
//!
//! ```ignore
//! let demo = Demonstrator::new(PgConnector, DemoConfig { leak: true, ..Default::default() });
//! let mut out = WriterSink::new(std::io::stdout());
//! let outcome = demo.run(&ConnectionDescriptor::sample(), &mut out, &TracingLog).await;
//! ```

pub mod channels;
pub mod connector;
pub mod demonstrator;
pub mod descriptor;
pub mod error;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod sessions;

pub use channels::{BufferSink, DiagnosticLog, Severity, StatusSink, TracingLog, WriterSink};
#[cfg(any(test, feature = "memory"))]
pub use channels::RecordingLog;
pub use connector::{Connector, PgConnector, PgSession, Session};
pub use demonstrator::{DemoConfig, Demonstrator, Outcome, Variant, DEFAULT_HOLD};
pub use descriptor::{ConnectionDescriptor, DEFAULT_PORT};
pub use error::{ConnectionFailure, DescriptorError};
#[cfg(any(test, feature = "memory"))]
pub use memory::{MemoryConnector, MemorySession};
pub use sessions::count_sessions;
