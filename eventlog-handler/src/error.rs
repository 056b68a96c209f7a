// src/error.rs

//! Error taxonomy and the diagnostic channel.
//!
//! Nothing in the handler propagates a failure to the host application. Each
//! component returns a typed error; the handler converts it into a
//! [`Diagnostic`] and passes it to the [`ErrorReporter`] supplied at
//! construction.

use std::{
    error::Error as StdError,
    fmt, io,
    sync::{Arc, Mutex, PoisonError},
};
use thiserror::Error;

use crate::diag_line;

/// Registry bookkeeping failures. Never fatal.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Failed to open registry key: HKEY_LOCAL_MACHINE\\{key}: {source}")]
    Open { key: String, source: io::Error },

    #[error("Failed to create registry key: HKEY_LOCAL_MACHINE\\{key}: {source}")]
    Create { key: String, source: io::Error },

    #[error("Failed to set registry value: HKEY_LOCAL_MACHINE\\{key} {value}: {source}")]
    SetValue {
        key: String,
        value: String,
        source: io::Error,
    },

    #[error("Failed to close registry key: HKEY_LOCAL_MACHINE\\{key}: {source}")]
    Close { key: String, source: io::Error },

    #[error("Failed to delete registry key: HKEY_LOCAL_MACHINE\\{key}: {source}")]
    Delete { key: String, source: io::Error },
}

/// Event source registration failures. The publisher stays inert.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("Failed to register Event Source '{source_name}': {source}")]
    Register { source_name: String, source: io::Error },

    #[error("Event Source '{0}' is already open")]
    AlreadyOpen(String),

    #[error("publisher has been closed")]
    Closed,
}

/// A single native write that did not succeed. Not retried.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to report Event: {0}")]
    Report(#[source] io::Error),
}

/// Payload construction failures. The event is written without data.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Failed to serialize LogRecord: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialized LogRecord is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Deregistration failures. Shutdown continues regardless.
#[derive(Debug, Error)]
pub enum CloseError {
    #[error("Failed to deregister Event Source: {0}")]
    Deregister(#[source] io::Error),
}

/// Loading a properties file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Coarse tag attached to every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Generic,
    Write,
    Flush,
    Close,
    Open,
    Format,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Generic => "generic",
            ErrorCategory::Write => "write",
            ErrorCategory::Flush => "flush",
            ErrorCategory::Close => "close",
            ErrorCategory::Open => "open",
            ErrorCategory::Format => "format",
        };
        f.write_str(name)
    }
}

/// One reported failure.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub cause: Option<Arc<dyn StdError + Send + Sync>>,
    pub category: ErrorCategory,
}

impl Diagnostic {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self { message: message.into(), cause: None, category }
    }

    /// Diagnostic whose message is the error's own text.
    pub fn from_error<E>(category: ErrorCategory, error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            cause: Some(Arc::new(error)),
            category,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.category, self.message)
    }
}

impl From<RegistrationError> for Diagnostic {
    fn from(error: RegistrationError) -> Self {
        let category = match error {
            RegistrationError::Delete { .. } => ErrorCategory::Close,
            _ => ErrorCategory::Open,
        };
        Diagnostic::from_error(category, error)
    }
}

impl From<OpenError> for Diagnostic {
    fn from(error: OpenError) -> Self {
        Diagnostic::from_error(ErrorCategory::Open, error)
    }
}

impl From<PublishError> for Diagnostic {
    fn from(error: PublishError) -> Self {
        Diagnostic::from_error(ErrorCategory::Write, error)
    }
}

impl From<SerializationError> for Diagnostic {
    fn from(error: SerializationError) -> Self {
        Diagnostic::from_error(ErrorCategory::Write, error)
    }
}

impl From<CloseError> for Diagnostic {
    fn from(error: CloseError) -> Self {
        Diagnostic::from_error(ErrorCategory::Close, error)
    }
}

// ───── reporters ────────────────────────────────────────────────────────────

/// Receives every failure the handler swallows.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> ErrorReporter for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Default reporter: one line per diagnostic on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        eprintln!("{}", diag_line!("ERROR", diagnostic.category, "{}", diagnostic.message));
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    seen: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn categories(&self) -> Vec<ErrorCategory> {
        self.diagnostics().iter().map(|d| d.category).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    }
}
