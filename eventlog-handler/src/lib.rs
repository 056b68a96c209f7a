// src/lib.rs
// ────────────────────────────────────────────────────────────────────────────
// Public library entry point. A `log` handler that writes records to the
// Windows Application event log; a silent no-op on other platforms.

mod macros;

pub mod backend;
pub mod config;
pub mod error;
pub mod format;
pub mod handler;
pub mod level;
pub mod message_file;
pub mod publisher;
pub mod record;
pub mod registry;

pub use backend::Backend;
pub use config::{HandlerConfig, LoggingProperties};
pub use error::{Diagnostic, ErrorCategory, ErrorReporter};
pub use handler::{EventLogHandler, HandlerBuilder, SharedHandler, init};
pub use level::{EventType, Severity};
pub use record::LogRecord;

#[doc(hidden)]
pub mod __private {
    pub use chrono;
}
