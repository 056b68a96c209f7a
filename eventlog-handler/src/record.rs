// src/record.rs

//! The record handed to the handler by the host logging framework.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
};

use shared::MAX_EVENT_DATA_BYTES;

use crate::{config::Encoding, error::SerializationError, format::ResourceBundle, level::Severity};

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// One log record: level, message (or catalog key), positional parameters,
/// optional localization bundle and call-site metadata.
///
/// Serializes to JSON for the event's binary payload; the bundle is not part
/// of the payload.
#[derive(Clone, Serialize)]
pub struct LogRecord {
    pub level: Severity,
    pub message: String,
    pub parameters: Vec<String>,
    #[serde(skip)]
    pub bundle: Option<Arc<dyn ResourceBundle>>,
    pub timestamp: DateTime<Utc>,
    pub logger_name: Option<String>,
    pub sequence_number: u64,
    pub thread_name: String,
    pub module_path: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl LogRecord {
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        let current = thread::current();
        let thread_name = match current.name() {
            Some(name) => name.to_owned(),
            None => format!("{:?}", current.id()),
        };
        Self {
            level,
            message: message.into(),
            parameters: Vec::new(),
            bundle: None,
            timestamp: Utc::now(),
            logger_name: None,
            sequence_number: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            thread_name,
            module_path: None,
            file: None,
            line: None,
        }
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bundle(mut self, bundle: Arc<dyn ResourceBundle>) -> Self {
        self.bundle = Some(bundle);
        self
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = Some(name.into());
        self
    }

    /// Builds a record from a `log` crate record. The message is already
    /// rendered by `format_args!`, so there are no parameters.
    pub fn from_log(record: &log::Record<'_>) -> Self {
        let mut out = LogRecord::new(record.level().into(), record.args().to_string());
        out.logger_name = Some(record.target().to_owned());
        out.module_path = record.module_path().map(str::to_owned);
        out.file = record.file().map(str::to_owned);
        out.line = record.line();
        out
    }

    /// JSON form of the record in `encoding`, for the event's binary data.
    pub fn to_payload(&self, encoding: Encoding) -> Result<Vec<u8>, SerializationError> {
        let json = serde_json::to_string(self)?;
        let bytes = encoding.encode(&json);
        if bytes.len() > MAX_EVENT_DATA_BYTES {
            return Err(SerializationError::TooLarge { size: bytes.len(), limit: MAX_EVENT_DATA_BYTES });
        }
        Ok(bytes)
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("level", &self.level)
            .field("message", &self.message)
            .field("parameters", &self.parameters)
            .field("bundle", &self.bundle.as_ref().map(|b| b.locale().to_owned()))
            .field("timestamp", &self.timestamp)
            .field("logger_name", &self.logger_name)
            .field("sequence_number", &self.sequence_number)
            .finish_non_exhaustive()
    }
}
