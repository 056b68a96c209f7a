// src/backend/memory.rs

//! In-process stand-in for the registry and the Application event log.
//!
//! Several handlers may share one `MemoryEventLog` the same way several
//! processes share the real registry. Any operation can be made to fail with
//! [`MemoryEventLog::fail`].

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    io,
    sync::{Mutex, MutexGuard, PoisonError},
};

use super::{EventSink, NativeEvent, RegistryStore, SourceHandle};
use crate::{
    error::{CloseError, OpenError, PublishError, RegistrationError},
    level::EventType,
};

/// Operations that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    OpenKey,
    CreateKey,
    DeleteKey,
    Register,
    Report,
    Deregister,
}

/// One event as the native call received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub source: String,
    pub event_type: EventType,
    pub category: u16,
    pub event_id: u32,
    pub strings: Vec<String>,
    pub data: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct Inner {
    keys: BTreeMap<String, BTreeMap<String, String>>,
    open_sources: HashMap<usize, String>,
    next_handle: usize,
    events: Vec<RecordedEvent>,
    failing: HashSet<Operation>,
    attempts: HashMap<Operation, usize>,
}

#[derive(Debug, Default)]
pub struct MemoryEventLog {
    inner: Mutex<Inner>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every later `op` fail until [`MemoryEventLog::recover`].
    pub fn fail(&self, op: Operation) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: Operation) {
        self.lock().failing.remove(&op);
    }

    /// How many times `op` was invoked, successful or not.
    pub fn attempts(&self, op: Operation) -> usize {
        self.lock().attempts.get(&op).copied().unwrap_or(0)
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.lock().events.clone()
    }

    pub fn events_from(&self, source: &str) -> Vec<RecordedEvent> {
        self.lock().events.iter().filter(|e| e.source == source).cloned().collect()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lock().keys.contains_key(key)
    }

    pub fn key_value(&self, key: &str, value_name: &str) -> Option<String> {
        self.lock().keys.get(key)?.get(value_name).cloned()
    }

    /// Number of keys, to check nothing was written twice.
    pub fn key_count(&self) -> usize {
        self.lock().keys.len()
    }

    /// Handles registered and not yet deregistered.
    pub fn open_sources(&self) -> usize {
        self.lock().open_sources.len()
    }
}

impl Inner {
    /// Count the attempt; error out if `op` is armed to fail.
    fn attempt(&mut self, op: Operation) -> io::Result<()> {
        *self.attempts.entry(op).or_default() += 1;
        if self.failing.contains(&op) {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, format!("injected {op:?} failure")))
        } else {
            Ok(())
        }
    }
}

impl RegistryStore for MemoryEventLog {
    fn key_exists(&self, key: &str) -> Result<bool, RegistrationError> {
        let mut inner = self.lock();
        inner
            .attempt(Operation::OpenKey)
            .map_err(|source| RegistrationError::Open { key: key.into(), source })?;
        Ok(inner.keys.contains_key(key))
    }

    fn create_key(&self, key: &str, value_name: &str, value: &str) -> Result<(), RegistrationError> {
        let mut inner = self.lock();
        inner
            .attempt(Operation::CreateKey)
            .map_err(|source| RegistrationError::Create { key: key.into(), source })?;
        inner
            .keys
            .entry(key.to_owned())
            .or_default()
            .insert(value_name.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete_key(&self, key: &str) -> Result<(), RegistrationError> {
        let mut inner = self.lock();
        inner
            .attempt(Operation::DeleteKey)
            .map_err(|source| RegistrationError::Delete { key: key.into(), source })?;
        inner.keys.remove(key);
        Ok(())
    }
}

impl EventSink for MemoryEventLog {
    fn register_source(&self, source_name: &str) -> Result<SourceHandle, OpenError> {
        let mut inner = self.lock();
        inner.attempt(Operation::Register).map_err(|source| OpenError::Register {
            source_name: source_name.into(),
            source,
        })?;
        inner.next_handle += 1;
        let raw = inner.next_handle;
        inner.open_sources.insert(raw, source_name.to_owned());
        Ok(SourceHandle::from_raw(raw))
    }

    fn report_event(&self, handle: SourceHandle, event: &NativeEvent<'_>) -> Result<(), PublishError> {
        let mut inner = self.lock();
        inner.attempt(Operation::Report).map_err(PublishError::Report)?;
        let Some(source) = inner.open_sources.get(&handle.as_raw()).cloned() else {
            return Err(PublishError::Report(invalid_handle()));
        };
        inner.events.push(RecordedEvent {
            source,
            event_type: event.event_type,
            category: event.category,
            event_id: event.event_id,
            strings: event.strings.iter().map(|s| s.to_string()).collect(),
            data: event.data.map(<[u8]>::to_vec),
        });
        Ok(())
    }

    fn deregister_source(&self, handle: SourceHandle) -> Result<(), CloseError> {
        let mut inner = self.lock();
        inner.attempt(Operation::Deregister).map_err(CloseError::Deregister)?;
        match inner.open_sources.remove(&handle.as_raw()) {
            Some(_) => Ok(()),
            None => Err(CloseError::Deregister(invalid_handle())),
        }
    }
}

fn invalid_handle() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "The handle is invalid.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event<'a>(strings: &'a [&'a str]) -> NativeEvent<'a> {
        NativeEvent {
            event_type: EventType::Information,
            category: 0,
            event_id: 1,
            strings,
            data: None,
        }
    }

    #[test]
    fn report_after_deregister_is_rejected() {
        let log = MemoryEventLog::new();
        let handle = log.register_source("app").unwrap();
        log.report_event(handle, &event(&["one"])).unwrap();
        log.deregister_source(handle).unwrap();
        assert!(log.report_event(handle, &event(&["two"])).is_err());
        assert!(log.deregister_source(handle).is_err());
        assert_eq!(log.events().len(), 1);
    }

    #[test]
    fn injected_failures_are_counted() {
        let log = MemoryEventLog::new();
        log.fail(Operation::CreateKey);
        assert!(log.create_key("k", "v", "x").is_err());
        assert!(!log.has_key("k"));
        log.recover(Operation::CreateKey);
        log.create_key("k", "v", "x").unwrap();
        assert_eq!(log.key_value("k", "v").as_deref(), Some("x"));
        assert_eq!(log.attempts(Operation::CreateKey), 2);
    }

    #[test]
    fn deleting_absent_key_succeeds() {
        let log = MemoryEventLog::new();
        log.delete_key("nothing").unwrap();
    }
}
