// src/handler.rs

//! # Event log handler
//!
//! Ties the pieces together: resolve configuration, register the event
//! source, open the publisher, then format and publish each record. Every
//! failure is handed to the [`ErrorReporter`]; none reaches the caller.
//!
//! ```no_run
//! use eventlog_handler::{EventLogHandler, LogRecord, Severity};
//!
//! let handler = EventLogHandler::new();
//! handler.publish(&LogRecord::new(Severity::Warning, "disk almost full"));
//! handler.close();
//! ```

use std::{
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    backend::Backend,
    config::{HandlerConfig, NoProperties, PropertySource, SystemProperties},
    error::{Diagnostic, ErrorCategory, ErrorReporter, StderrReporter},
    format::Formatter,
    level::Severity,
    message_file,
    publisher::{EventPublisher, EventRecord, PublisherState},
    record::LogRecord,
    registry::{EventSourceRegistrar, Registration},
};

pub struct EventLogHandler {
    config: HandlerConfig,
    formatter: Box<dyn Formatter>,
    registrar: EventSourceRegistrar,
    publisher: EventPublisher,
    reporter: Arc<dyn ErrorReporter>,
    registration: Option<Registration>,
    message_file: PathBuf,
    closed: AtomicBool,
}

/// Options for [`EventLogHandler`]; anything not set uses its default.
#[derive(Default)]
pub struct HandlerBuilder {
    properties: Option<Box<dyn PropertySource>>,
    process_properties: Option<Box<dyn PropertySource>>,
    config: Option<HandlerConfig>,
    backend: Option<Backend>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    formatter: Option<Box<dyn Formatter>>,
}

impl HandlerBuilder {
    /// Per-handler properties (highest precedence).
    pub fn properties(mut self, properties: impl PropertySource + 'static) -> Self {
        self.properties = Some(Box::new(properties));
        self
    }

    /// Process-wide properties. Defaults to the environment.
    pub fn process_properties(mut self, properties: impl PropertySource + 'static) -> Self {
        self.process_properties = Some(Box::new(properties));
        self
    }

    /// Use `config` as is instead of resolving properties.
    pub fn config(mut self, config: HandlerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Some(Arc::new(reporter));
        self
    }

    pub fn shared_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Replaces the formatter named by the `formatter` property.
    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    pub fn build(self) -> EventLogHandler {
        let config = self.config.unwrap_or_else(|| {
            let handler = self.properties.unwrap_or_else(|| Box::new(NoProperties));
            let process = self.process_properties.unwrap_or_else(|| Box::new(SystemProperties));
            HandlerConfig::resolve(handler.as_ref(), process.as_ref())
        });
        let backend = self.backend.unwrap_or_else(Backend::native);
        let reporter = self.reporter.unwrap_or_else(|| Arc::new(StderrReporter));
        let formatter = self.formatter.unwrap_or_else(|| config.formatter.build());
        EventLogHandler::start(config, backend, reporter, formatter)
    }
}

impl EventLogHandler {
    /// Native backend, environment properties, stderr diagnostics.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> HandlerBuilder {
        HandlerBuilder::default()
    }

    fn start(
        config: HandlerConfig,
        backend: Backend,
        reporter: Arc<dyn ErrorReporter>,
        formatter: Box<dyn Formatter>,
    ) -> Self {
        let message_file = message_file::resolve(config.message_file.as_deref());

        // 1 ─ registry key
        let registrar = EventSourceRegistrar::new(backend.registry.clone());
        let registration = match registrar.ensure_registered(
            &config.source_name,
            &message_file,
            config.auto_create_reg_key,
        ) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                reporter.report(&e.into());
                None
            }
        };

        // 2 ─ native source handle
        let publisher = EventPublisher::new(backend.events.clone());
        if let Err(e) = publisher.open(&config.source_name) {
            reporter.report(&e.into());
        }

        Self {
            config,
            formatter,
            registrar,
            publisher,
            reporter,
            registration,
            message_file,
            closed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Outcome of registry setup; `None` when it failed.
    pub fn registration(&self) -> Option<Registration> {
        self.registration
    }

    /// Message file path written (or that would be written) to the registry.
    pub fn message_file(&self) -> &Path {
        &self.message_file
    }

    pub fn state(&self) -> PublisherState {
        self.publisher.state()
    }

    pub fn level(&self) -> Severity {
        self.config.level
    }

    /// Whether a record at `level` passes this handler's threshold.
    pub fn is_loggable_level(&self, level: Severity) -> bool {
        level != Severity::Off && self.config.level != Severity::Off && level >= self.config.level
    }

    pub fn is_loggable(&self, record: &LogRecord) -> bool {
        self.is_loggable_level(record.level)
    }

    /// Format and write one record. Level filtering is the caller's job; only
    /// `Off` is dropped here.
    pub fn publish(&self, record: &LogRecord) {
        if record.level == Severity::Off || self.publisher.state() != PublisherState::Open {
            return;
        }

        let message = self.format(record);
        let payload = if self.config.payload { self.payload(record) } else { None };

        let event = EventRecord {
            level: record.level,
            message: &message,
            payload: payload.as_deref(),
        };
        if let Err(e) = self.publisher.publish(&event) {
            self.reporter.report(&e.into());
        }
    }

    /// Nothing is buffered.
    pub fn flush(&self) {}

    /// Release the event source and, when configured, delete the registry
    /// key. Only the first call does anything.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = self.publisher.close() {
            self.reporter.report(&e.into());
        }
        if let Err(e) = self
            .registrar
            .maybe_delete(&self.config.source_name, self.config.auto_delete_reg_key)
        {
            self.reporter.report(&e.into());
        }
    }

    fn format(&self, record: &LogRecord) -> String {
        match panic::catch_unwind(AssertUnwindSafe(|| self.formatter.format(record))) {
            Ok(text) => text,
            Err(_) => {
                self.reporter.report(&Diagnostic::new(
                    ErrorCategory::Format,
                    "Formatter panicked; publishing the raw message",
                ));
                record.message.clone()
            }
        }
    }

    fn payload(&self, record: &LogRecord) -> Option<Vec<u8>> {
        match record.to_payload(self.config.encoding) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                metrics::counter!("eventlog_payload_dropped_total").increment(1);
                self.reporter.report(&e.into());
                None
            }
        }
    }
}

impl Default for EventLogHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventLogHandler {
    fn drop(&mut self) {
        self.close();
    }
}

// ───── `log` facade ─────────────────────────────────────────────────────────

impl log::Log for EventLogHandler {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.is_loggable_level(metadata.level().into())
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            self.publish(&LogRecord::from_log(record));
        }
    }

    fn flush(&self) {}
}

/// `log::Log` over a shared handler, for `log::set_boxed_logger` or a
/// `fern` chain. The caller keeps its own `Arc` to close the handler.
pub struct SharedHandler(pub Arc<EventLogHandler>);

impl log::Log for SharedHandler {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        log::Log::enabled(self.0.as_ref(), metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        log::Log::log(self.0.as_ref(), record)
    }

    fn flush(&self) {}
}

/// Install `handler` as the global `log` logger with a max level matching its
/// threshold.
pub fn init(handler: Arc<EventLogHandler>) -> Result<(), log::SetLoggerError> {
    let max = handler.level().to_level_filter();
    log::set_boxed_logger(Box::new(SharedHandler(handler)))?;
    log::set_max_level(max);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{MemoryEventLog, Operation},
        error::CollectingReporter,
        format::FormatterKind,
    };

    fn handler_on(store: &Arc<MemoryEventLog>, config: HandlerConfig) -> (EventLogHandler, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        let handler = EventLogHandler::builder()
            .config(config)
            .backend(Backend::memory(store.clone()))
            .shared_reporter(reporter.clone())
            .build();
        (handler, reporter)
    }

    #[test]
    fn threshold_filtering() {
        let store = Arc::new(MemoryEventLog::new());
        let (handler, _) = handler_on(&store, HandlerConfig { level: Severity::Warning, ..Default::default() });
        assert!(handler.is_loggable_level(Severity::Severe));
        assert!(handler.is_loggable_level(Severity::Warning));
        assert!(!handler.is_loggable_level(Severity::Info));
        assert!(!handler.is_loggable_level(Severity::Off));
    }

    #[test]
    fn off_threshold_disables_everything() {
        let store = Arc::new(MemoryEventLog::new());
        let (handler, _) = handler_on(&store, HandlerConfig { level: Severity::Off, ..Default::default() });
        assert!(!handler.is_loggable_level(Severity::Severe));
    }

    #[test]
    fn panicking_formatter_falls_back_to_raw_message() {
        let store = Arc::new(MemoryEventLog::new());
        let reporter = Arc::new(CollectingReporter::new());
        let handler = EventLogHandler::builder()
            .config(HandlerConfig::default())
            .backend(Backend::memory(store.clone()))
            .shared_reporter(reporter.clone())
            .formatter(|_: &LogRecord| -> String { panic!("bad formatter") })
            .build();
        handler.publish(&LogRecord::new(Severity::Info, "raw"));
        assert_eq!(store.events()[0].strings, vec!["raw".to_string()]);
        assert_eq!(reporter.categories(), vec![ErrorCategory::Format]);
    }

    #[test]
    fn simple_formatter_from_config() {
        let store = Arc::new(MemoryEventLog::new());
        let config = HandlerConfig { formatter: FormatterKind::Simple, ..Default::default() };
        let (handler, _) = handler_on(&store, config);
        handler.publish(&LogRecord::new(Severity::Info, "hello").with_logger_name("svc"));
        assert!(store.events()[0].strings[0].ends_with("[INFO][svc] hello"));
    }

    #[test]
    fn payload_can_be_disabled() {
        let store = Arc::new(MemoryEventLog::new());
        let (handler, _) = handler_on(&store, HandlerConfig { payload: false, ..Default::default() });
        handler.publish(&LogRecord::new(Severity::Info, "x"));
        assert_eq!(store.events()[0].data, None);
    }

    #[test]
    fn drop_closes_once() {
        let store = Arc::new(MemoryEventLog::new());
        let (handler, reporter) = handler_on(&store, HandlerConfig::default());
        handler.close();
        drop(handler);
        assert_eq!(store.attempts(Operation::Deregister), 1);
        assert!(reporter.is_empty());
    }

    #[test]
    fn log_facade_respects_threshold() {
        let store = Arc::new(MemoryEventLog::new());
        let (handler, _) = handler_on(&store, HandlerConfig::default());
        log::Log::log(
            &handler,
            &log::Record::builder()
                .args(format_args!("dropped"))
                .level(log::Level::Debug)
                .build(),
        );
        log::Log::log(
            &handler,
            &log::Record::builder()
                .args(format_args!("kept {}", 1))
                .level(log::Level::Error)
                .target("app")
                .build(),
        );
        let events = store.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].strings, vec!["kept 1".to_string()]);
    }
}
