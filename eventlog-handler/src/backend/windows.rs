// src/backend/windows.rs

//! `advapi32` registry and event log calls.
//!
//! Keys are opened under `HKEY_LOCAL_MACHINE`; writing them needs an elevated
//! process. Strings cross the FFI boundary as NUL-terminated UTF-16.

use std::{ffi::c_void, io, ptr};

use shared::MAX_EVENT_STRING_UNITS;
use windows_sys::Win32::{
    Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, HANDLE},
    System::{
        EventLog::{DeregisterEventSource, RegisterEventSourceW, ReportEventW},
        Registry::{
            HKEY, HKEY_LOCAL_MACHINE, KEY_ALL_ACCESS, KEY_READ, REG_OPTION_NON_VOLATILE, REG_SZ,
            RegCloseKey, RegCreateKeyExW, RegDeleteKeyW, RegOpenKeyExW, RegSetValueExW,
        },
    },
};

use super::{EventSink, NativeEvent, RegistryStore, SourceHandle};
use crate::error::{CloseError, OpenError, PublishError, RegistrationError};

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsEventLog;

/// NUL-terminated UTF-16, cut to `max_units` before the terminator.
fn to_wide(s: &str, max_units: usize) -> Vec<u16> {
    let mut wide: Vec<u16> = s.encode_utf16().take(max_units).collect();
    wide.push(0);
    wide
}

fn wide(s: &str) -> Vec<u16> {
    to_wide(s, usize::MAX)
}

fn os_error(rc: u32) -> io::Error {
    io::Error::from_raw_os_error(rc as i32)
}

impl RegistryStore for WindowsEventLog {
    fn key_exists(&self, key: &str) -> Result<bool, RegistrationError> {
        let path = wide(key);
        let mut hkey: HKEY = ptr::null_mut();
        let rc = unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, path.as_ptr(), 0, KEY_READ, &mut hkey) };
        match rc {
            ERROR_SUCCESS => {
                let rc = unsafe { RegCloseKey(hkey) };
                if rc != ERROR_SUCCESS {
                    return Err(RegistrationError::Close { key: key.into(), source: os_error(rc) });
                }
                Ok(true)
            }
            ERROR_FILE_NOT_FOUND => Ok(false),
            rc => Err(RegistrationError::Open { key: key.into(), source: os_error(rc) }),
        }
    }

    fn create_key(&self, key: &str, value_name: &str, value: &str) -> Result<(), RegistrationError> {
        let path = wide(key);
        let mut hkey: HKEY = ptr::null_mut();
        let rc = unsafe {
            RegCreateKeyExW(
                HKEY_LOCAL_MACHINE,
                path.as_ptr(),
                0,
                ptr::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_ALL_ACCESS,
                ptr::null(),
                &mut hkey,
                ptr::null_mut(),
            )
        };
        if rc != ERROR_SUCCESS {
            return Err(RegistrationError::Create { key: key.into(), source: os_error(rc) });
        }

        // REG_SZ data is the UTF-16 text including its terminator, in bytes.
        let name = wide(value_name);
        let data = wide(value);
        let set_rc = unsafe {
            RegSetValueExW(
                hkey,
                name.as_ptr(),
                0,
                REG_SZ,
                data.as_ptr().cast::<u8>(),
                (data.len() * size_of::<u16>()) as u32,
            )
        };
        let close_rc = unsafe { RegCloseKey(hkey) };

        if set_rc != ERROR_SUCCESS {
            return Err(RegistrationError::SetValue {
                key: key.into(),
                value: value_name.into(),
                source: os_error(set_rc),
            });
        }
        if close_rc != ERROR_SUCCESS {
            return Err(RegistrationError::Close { key: key.into(), source: os_error(close_rc) });
        }
        Ok(())
    }

    fn delete_key(&self, key: &str) -> Result<(), RegistrationError> {
        let path = wide(key);
        match unsafe { RegDeleteKeyW(HKEY_LOCAL_MACHINE, path.as_ptr()) } {
            ERROR_SUCCESS | ERROR_FILE_NOT_FOUND => Ok(()),
            rc => Err(RegistrationError::Delete { key: key.into(), source: os_error(rc) }),
        }
    }
}

impl EventSink for WindowsEventLog {
    fn register_source(&self, source_name: &str) -> Result<SourceHandle, OpenError> {
        let name = wide(source_name);
        let handle: HANDLE = unsafe { RegisterEventSourceW(ptr::null(), name.as_ptr()) };
        if handle.is_null() {
            return Err(OpenError::Register {
                source_name: source_name.into(),
                source: io::Error::last_os_error(),
            });
        }
        Ok(SourceHandle::from_raw(handle as usize))
    }

    fn report_event(&self, handle: SourceHandle, event: &NativeEvent<'_>) -> Result<(), PublishError> {
        let strings: Vec<Vec<u16>> = event
            .strings
            .iter()
            .map(|s| to_wide(s, MAX_EVENT_STRING_UNITS))
            .collect();
        let pointers: Vec<*const u16> = strings.iter().map(|s| s.as_ptr()).collect();
        let (data_len, data_ptr) = match event.data {
            Some(bytes) => (bytes.len() as u32, bytes.as_ptr().cast::<c_void>()),
            None => (0, ptr::null()),
        };

        let ok = unsafe {
            ReportEventW(
                handle.as_raw() as HANDLE,
                event.event_type.native(),
                event.category,
                event.event_id,
                ptr::null_mut(),
                pointers.len() as u16,
                data_len,
                pointers.as_ptr(),
                data_ptr,
            )
        };
        if ok == 0 {
            return Err(PublishError::Report(io::Error::last_os_error()));
        }
        Ok(())
    }

    fn deregister_source(&self, handle: SourceHandle) -> Result<(), CloseError> {
        if unsafe { DeregisterEventSource(handle.as_raw() as HANDLE) } == 0 {
            return Err(CloseError::Deregister(io::Error::last_os_error()));
        }
        Ok(())
    }
}
