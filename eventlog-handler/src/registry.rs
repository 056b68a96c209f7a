// src/registry.rs

//! # Event source registration
//!
//! Makes a source name known to the event viewer by creating
//! `HKLM\SYSTEM\CurrentControlSet\Services\EventLog\Application\<source>`
//! with a `ParameterMessageFile` value, and optionally removes that key again
//! when the handler shuts down.
//!
//! The key outlives the process. Registration is idempotent so any number of
//! handlers and processes can share a source name.

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use shared::{EVENT_LOG_REG_KEY, PARAMETER_MESSAGE_FILE_VALUE};

use crate::{backend::RegistryStore, error::RegistrationError};

/// What `ensure_registered` found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The key was already there; nothing written.
    AlreadyPresent,
    /// The key was created with the message file path.
    Created,
    /// The key is missing and creation is disabled.
    Missing,
}

/// Registry key for `source_name`, relative to HKLM.
pub fn source_key(source_name: &str) -> String {
    format!(r"{EVENT_LOG_REG_KEY}\{source_name}")
}

pub struct EventSourceRegistrar {
    registry: Arc<dyn RegistryStore>,
    /// Claimed by the first delete attempt so one instance never deletes
    /// twice; put back when that attempt fails. Per instance: other handlers on the same source are unaffected.
    delete_armed: AtomicBool,
}

impl EventSourceRegistrar {
    pub fn new(registry: Arc<dyn RegistryStore>) -> Self {
        Self { registry, delete_armed: AtomicBool::new(true) }
    }

    pub fn ensure_registered(
        &self,
        source_name: &str,
        message_file: &Path,
        auto_create: bool,
    ) -> Result<Registration, RegistrationError> {
        let key = source_key(source_name);
        if self.registry.key_exists(&key)? {
            return Ok(Registration::AlreadyPresent);
        }
        if !auto_create {
            return Ok(Registration::Missing);
        }
        self.registry.create_key(
            &key,
            PARAMETER_MESSAGE_FILE_VALUE,
            &message_file.to_string_lossy(),
        )?;
        Ok(Registration::Created)
    }

    /// Delete the source key when `auto_delete` is set. Returns `Ok(false)`
    /// when nothing was attempted (disabled, or this instance already
    /// deleted it).
    pub fn maybe_delete(&self, source_name: &str, auto_delete: bool) -> Result<bool, RegistrationError> {
        if !auto_delete
            || self
                .delete_armed
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return Ok(false);
        }
        if let Err(e) = self.registry.delete_key(&source_key(source_name)) {
            // re-arm so a later call can retry
            self.delete_armed.store(true, Ordering::Release);
            return Err(e);
        }
        Ok(true)
    }
}
