// src/publisher.rs

//! # Event publisher
//!
//! Owns the native event source handle and turns one formatted record into
//! one native write.
//!
//! Lifecycle: `Uninitialized → Open → Closed`. Publishing holds a read lease
//! on the state for the duration of the native call; `open` and `close` take
//! the write lease, so a handle is never released while a write using it is
//! in flight.

use std::sync::{Arc, PoisonError, RwLock};

use crate::{
    backend::{EventSink, NativeEvent, SourceHandle},
    error::{CloseError, OpenError, PublishError},
    level::Severity,
};

/// What `publish` receives: level, the already formatted text, and optional
/// binary data.
#[derive(Debug, Clone, Copy)]
pub struct EventRecord<'a> {
    pub level: Severity,
    pub message: &'a str,
    pub payload: Option<&'a [u8]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publication {
    Written,
    /// Level `Off`, or no open source. Not an error.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    Uninitialized,
    Open,
    Closed,
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Open { handle: SourceHandle },
    Closed,
}

pub struct EventPublisher {
    sink: Arc<dyn EventSink>,
    state: RwLock<State>,
}

impl EventPublisher {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink, state: RwLock::new(State::Uninitialized) }
    }

    /// Register as writer for `source_name`. On failure the publisher stays
    /// `Uninitialized` and every publish is suppressed.
    pub fn open(&self, source_name: &str) -> Result<(), OpenError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match *state {
            State::Uninitialized => {
                let handle = self.sink.register_source(source_name)?;
                *state = State::Open { handle };
                Ok(())
            }
            State::Open { .. } => Err(OpenError::AlreadyOpen(source_name.into())),
            State::Closed => Err(OpenError::Closed),
        }
    }

    /// Write one event. Failures are returned once and never retried.
    pub fn publish(&self, record: &EventRecord<'_>) -> Result<Publication, PublishError> {
        if record.level == Severity::Off {
            metrics::counter!("eventlog_events_suppressed_total").increment(1);
            return Ok(Publication::Suppressed);
        }

        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let State::Open { handle } = *state else {
            metrics::counter!("eventlog_events_suppressed_total").increment(1);
            return Ok(Publication::Suppressed);
        };

        let strings = [record.message];
        let event = NativeEvent {
            event_type: record.level.event_type(),
            category: 0,
            event_id: record.level.message_id(),
            strings: &strings,
            data: record.payload,
        };
        match self.sink.report_event(handle, &event) {
            Ok(()) => {
                metrics::counter!("eventlog_events_written_total").increment(1);
                Ok(Publication::Written)
            }
            Err(e) => {
                metrics::counter!("eventlog_events_failed_total").increment(1);
                Err(e)
            }
        }
    }

    /// Release the handle. Safe to call any number of times; only the first
    /// call on an open publisher touches the OS.
    pub fn close(&self) -> Result<(), CloseError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *state, State::Closed) {
            State::Open { handle } => self.sink.deregister_source(handle),
            State::Uninitialized | State::Closed => Ok(()),
        }
    }

    pub fn state(&self) -> PublisherState {
        match *self.state.read().unwrap_or_else(PoisonError::into_inner) {
            State::Uninitialized => PublisherState::Uninitialized,
            State::Open { .. } => PublisherState::Open,
            State::Closed => PublisherState::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{MemoryEventLog, Operation},
        level::EventType,
    };
    use shared::{MESSAGE_ID_ERROR, MESSAGE_ID_SUCCESS};

    fn record(level: Severity, message: &str) -> EventRecord<'_> {
        EventRecord { level, message, payload: None }
    }

    #[test]
    fn writes_one_event_with_one_string() {
        let log = Arc::new(MemoryEventLog::new());
        let publisher = EventPublisher::new(log.clone());
        publisher.open("app").unwrap();

        let outcome = publisher
            .publish(&EventRecord { level: Severity::Severe, message: "boom", payload: Some(&b"{}"[..]) })
            .unwrap();
        assert_eq!(outcome, Publication::Written);

        let events = log.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, "app");
        assert_eq!(events[0].event_type, EventType::Error);
        assert_eq!(events[0].event_id, MESSAGE_ID_ERROR);
        assert_eq!(events[0].category, 0);
        assert_eq!(events[0].strings, vec!["boom".to_string()]);
        assert_eq!(events[0].data.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn off_and_unopened_are_suppressed() {
        let log = Arc::new(MemoryEventLog::new());
        let publisher = EventPublisher::new(log.clone());
        assert_eq!(publisher.publish(&record(Severity::Info, "x")).unwrap(), Publication::Suppressed);
        publisher.open("app").unwrap();
        assert_eq!(publisher.publish(&record(Severity::Off, "x")).unwrap(), Publication::Suppressed);
        assert!(log.events().is_empty());
        assert_eq!(log.attempts(Operation::Report), 0);
    }

    #[test]
    fn failed_open_leaves_publisher_inert() {
        let log = Arc::new(MemoryEventLog::new());
        log.fail(Operation::Register);
        let publisher = EventPublisher::new(log.clone());
        assert!(matches!(publisher.open("app"), Err(OpenError::Register { .. })));
        assert_eq!(publisher.state(), PublisherState::Uninitialized);
        assert_eq!(publisher.publish(&record(Severity::Fine, "x")).unwrap(), Publication::Suppressed);
    }

    #[test]
    fn failed_write_is_not_retried() {
        let log = Arc::new(MemoryEventLog::new());
        let publisher = EventPublisher::new(log.clone());
        publisher.open("app").unwrap();
        log.fail(Operation::Report);
        assert!(publisher.publish(&record(Severity::Finest, "x")).is_err());
        assert_eq!(log.attempts(Operation::Report), 1);
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let log = Arc::new(MemoryEventLog::new());
        let publisher = EventPublisher::new(log.clone());
        publisher.open("app").unwrap();
        publisher.close().unwrap();
        publisher.close().unwrap();
        assert_eq!(log.attempts(Operation::Deregister), 1);
        assert_eq!(publisher.state(), PublisherState::Closed);
        assert_eq!(publisher.publish(&record(Severity::All, "x")).unwrap(), Publication::Suppressed);
        assert!(matches!(publisher.open("app"), Err(OpenError::Closed)));
        assert_eq!(log.open_sources(), 0);
    }

    #[test]
    fn second_open_is_rejected() {
        let log = Arc::new(MemoryEventLog::new());
        let publisher = EventPublisher::new(log.clone());
        publisher.open("app").unwrap();
        assert!(matches!(publisher.open("app"), Err(OpenError::AlreadyOpen(_))));
        assert_eq!(log.open_sources(), 1);
    }

    #[test]
    fn fine_levels_use_success_id() {
        let log = Arc::new(MemoryEventLog::new());
        let publisher = EventPublisher::new(log.clone());
        publisher.open("app").unwrap();
        publisher.publish(&record(Severity::Fine, "f")).unwrap();
        assert_eq!(log.events()[0].event_id, MESSAGE_ID_SUCCESS);
    }
}
