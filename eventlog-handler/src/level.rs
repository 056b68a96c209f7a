// src/level.rs

//! Severity levels and their translation into native event log fields.
//!
//! `Severity` is the ordered level set the handler works with. Two fixed
//! tables map every publishable level onto an [`EventType`] (the category the
//! event viewer shows) and onto a message identifier compiled into the
//! message-resource file.

use serde::Serialize;
use shared::{MESSAGE_ID_ERROR, MESSAGE_ID_INFO, MESSAGE_ID_SUCCESS, MESSAGE_ID_WARNING};
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error;

/// Ordered severity of a record. `Off` sits above everything and is never
/// published; `All` sits below everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Off,
    Severe,
    Warning,
    Info,
    Config,
    Fine,
    Finer,
    Finest,
    All,
}

/// Native event category (`EVENTLOG_*_TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Error,
    Warning,
    Information,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown severity level '{0}'")]
pub struct ParseSeverityError(pub String);

impl Severity {
    /// Every level, from most to least severe.
    pub const ALL_LEVELS: [Severity; 9] = [
        Severity::Off,
        Severity::Severe,
        Severity::Warning,
        Severity::Info,
        Severity::Config,
        Severity::Fine,
        Severity::Finer,
        Severity::Finest,
        Severity::All,
    ];

    pub const fn value(self) -> i32 {
        match self {
            Severity::Off => i32::MAX,
            Severity::Severe => 1000,
            Severity::Warning => 900,
            Severity::Info => 800,
            Severity::Config => 700,
            Severity::Fine => 500,
            Severity::Finer => 400,
            Severity::Finest => 300,
            Severity::All => i32::MIN,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Severity::Off => "OFF",
            Severity::Severe => "SEVERE",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Config => "CONFIG",
            Severity::Fine => "FINE",
            Severity::Finer => "FINER",
            Severity::Finest => "FINEST",
            Severity::All => "ALL",
        }
    }

    /// Level → event type table. `None` only for `Off`.
    pub const fn mapped_event_type(self) -> Option<EventType> {
        match self {
            Severity::Off => None,
            Severity::Severe => Some(EventType::Error),
            Severity::Warning => Some(EventType::Warning),
            Severity::Info
            | Severity::Config
            | Severity::Fine
            | Severity::Finer
            | Severity::Finest
            | Severity::All => Some(EventType::Information),
        }
    }

    /// Level → message id table. `None` only for `Off`.
    pub const fn mapped_message_id(self) -> Option<u32> {
        match self {
            Severity::Off => None,
            Severity::Severe => Some(MESSAGE_ID_ERROR),
            Severity::Warning => Some(MESSAGE_ID_WARNING),
            Severity::Info | Severity::Config => Some(MESSAGE_ID_INFO),
            Severity::Fine | Severity::Finer | Severity::Finest | Severity::All => {
                Some(MESSAGE_ID_SUCCESS)
            }
        }
    }

    /// Event type with the Information fallback for unmapped levels.
    pub fn event_type(self) -> EventType {
        self.mapped_event_type().unwrap_or(EventType::Information)
    }

    /// Message id with the success-id fallback for unmapped levels.
    pub fn message_id(self) -> u32 {
        self.mapped_message_id().unwrap_or(MESSAGE_ID_SUCCESS)
    }
}

impl EventType {
    /// `EVENTLOG_ERROR_TYPE`, `EVENTLOG_WARNING_TYPE`, `EVENTLOG_INFORMATION_TYPE`.
    pub const fn native(self) -> u16 {
        match self {
            EventType::Error => 0x0001,
            EventType::Warning => 0x0002,
            EventType::Information => 0x0004,
        }
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Accepts a level name in any case, or its numeric value.
impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i32>() {
            return Severity::ALL_LEVELS
                .into_iter()
                .find(|level| level.value() == value)
                .ok_or_else(|| ParseSeverityError(s.into()));
        }
        Severity::ALL_LEVELS
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseSeverityError(s.into()))
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Severe,
            log::Level::Warn => Severity::Warning,
            log::Level::Info => Severity::Info,
            log::Level::Debug => Severity::Fine,
            log::Level::Trace => Severity::Finest,
        }
    }
}

impl Severity {
    /// Most permissive `log` filter that still lets `self` through.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Severity::Off => log::LevelFilter::Off,
            Severity::Severe => log::LevelFilter::Error,
            Severity::Warning => log::LevelFilter::Warn,
            Severity::Info | Severity::Config => log::LevelFilter::Info,
            Severity::Fine => log::LevelFilter::Debug,
            Severity::Finer | Severity::Finest | Severity::All => log::LevelFilter::Trace,
        }
    }
}
