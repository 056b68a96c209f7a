// src/backend/null.rs

use super::{EventSink, NativeEvent, RegistryStore, SourceHandle};
use crate::error::{CloseError, OpenError, PublishError, RegistrationError};

/// Inactive backend for hosts without an event log. Every call succeeds and
/// has no effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventLog;

impl RegistryStore for NullEventLog {
    fn key_exists(&self, _key: &str) -> Result<bool, RegistrationError> {
        Ok(false)
    }

    fn create_key(&self, _key: &str, _value_name: &str, _value: &str) -> Result<(), RegistrationError> {
        Ok(())
    }

    fn delete_key(&self, _key: &str) -> Result<(), RegistrationError> {
        Ok(())
    }
}

impl EventSink for NullEventLog {
    fn register_source(&self, _source_name: &str) -> Result<SourceHandle, OpenError> {
        Ok(SourceHandle::from_raw(0))
    }

    fn report_event(&self, _handle: SourceHandle, _event: &NativeEvent<'_>) -> Result<(), PublishError> {
        Ok(())
    }

    fn deregister_source(&self, _handle: SourceHandle) -> Result<(), CloseError> {
        Ok(())
    }
}
