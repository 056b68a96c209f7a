//! Native capability behind the handler.
//!
//! The registrar and the publisher only talk to [`RegistryStore`] and
//! [`EventSink`]. Which implementation sits behind them is decided once, when
//! the handler is built:
//!
//! - `windows`: real `advapi32` registry and event log calls;
//! - `null`: every call succeeds and does nothing (non-Windows hosts);
//! - `memory`: in-process registry and event store, with failure injection.

pub mod memory;
pub mod null;
#[cfg(windows)]
pub mod windows;

use std::{fmt, sync::Arc};

use crate::{
    error::{CloseError, OpenError, PublishError, RegistrationError},
    level::EventType,
};

pub use memory::{MemoryEventLog, Operation, RecordedEvent};
pub use null::NullEventLog;

/// Opaque registration of this process as an event writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(usize);

impl SourceHandle {
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> usize {
        self.0
    }
}

/// Arguments of one native write.
#[derive(Debug, Clone, Copy)]
pub struct NativeEvent<'a> {
    pub event_type: EventType,
    pub category: u16,
    pub event_id: u32,
    pub strings: &'a [&'a str],
    pub data: Option<&'a [u8]>,
}

/// Persistent per-source configuration keys (relative to HKLM).
pub trait RegistryStore: Send + Sync {
    fn key_exists(&self, key: &str) -> Result<bool, RegistrationError>;

    /// Create `key` and write one string value under it.
    fn create_key(&self, key: &str, value_name: &str, value: &str) -> Result<(), RegistrationError>;

    /// Delete `key`. A key that does not exist is not an error.
    fn delete_key(&self, key: &str) -> Result<(), RegistrationError>;
}

/// Native event source registration and writes.
pub trait EventSink: Send + Sync {
    fn register_source(&self, source_name: &str) -> Result<SourceHandle, OpenError>;
    fn report_event(&self, handle: SourceHandle, event: &NativeEvent<'_>) -> Result<(), PublishError>;
    fn deregister_source(&self, handle: SourceHandle) -> Result<(), CloseError>;
}

/// The registry + event sink pair a handler runs on.
#[derive(Clone)]
pub struct Backend {
    pub registry: Arc<dyn RegistryStore>,
    pub events: Arc<dyn EventSink>,
    native: bool,
}

impl Backend {
    /// Real event log on Windows, [`Backend::null`] everywhere else.
    pub fn native() -> Self {
        #[cfg(windows)]
        {
            let win = Arc::new(windows::WindowsEventLog);
            Self { registry: win.clone(), events: win, native: true }
        }
        #[cfg(not(windows))]
        {
            Self::null()
        }
    }

    pub fn null() -> Self {
        let null = Arc::new(NullEventLog);
        Self { registry: null.clone(), events: null, native: false }
    }

    pub fn memory(store: Arc<MemoryEventLog>) -> Self {
        Self { registry: store.clone(), events: store, native: false }
    }

    pub fn from_parts(registry: Arc<dyn RegistryStore>, events: Arc<dyn EventSink>) -> Self {
        Self { registry, events, native: false }
    }

    /// True only for the real OS implementation.
    pub fn is_native(&self) -> bool {
        self.native
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend").field("native", &self.native).finish_non_exhaustive()
    }
}
