// src/config/loader.rs

//! # Property sources
//!
//! Handler options are looked up by name in two places: the per-handler
//! properties (a TOML file, keys under `[eventlog_handler]`) and the
//! process-wide properties (environment variables named
//! `EVENTLOG_HANDLER_<SCREAMING_SNAKE_NAME>`).

use shared::PROPERTY_PREFIX;
use std::{collections::HashMap, fs, path::Path};

use crate::error::ConfigError;

/// Anything that can answer "what is property `name`?".
pub trait PropertySource {
    fn property(&self, name: &str) -> Option<String>;
}

/// Flat `key → value` view of a TOML properties file. Nested tables become
/// dotted keys, scalars become their string form.
#[derive(Debug, Default, Clone)]
pub struct LoggingProperties {
    values: HashMap<String, String>,
}

impl LoggingProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(text)?;
        let mut values = HashMap::new();
        flatten("", &table, &mut values);
        Ok(Self { values })
    }

    /// Read and parse the properties file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let txt = fs::read_to_string(path)?;
        Self::from_toml_str(&txt)
    }

    /// Set a handler property (`name` without prefix).
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(prefixed(name), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl PropertySource for LoggingProperties {
    fn property(&self, name: &str) -> Option<String> {
        self.values.get(&prefixed(name)).cloned()
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
        match value {
            toml::Value::Table(inner) => flatten(&full, inner, out),
            toml::Value::String(s) => {
                out.insert(full, s.clone());
            }
            other => {
                out.insert(full, other.to_string());
            }
        }
    }
}

fn prefixed(name: &str) -> String {
    format!("{PROPERTY_PREFIX}.{name}")
}

/// Process-wide properties taken from the environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProperties;

impl PropertySource for SystemProperties {
    fn property(&self, name: &str) -> Option<String> {
        std::env::var(env_key(name)).ok()
    }
}

/// `sourceName` → `EVENTLOG_HANDLER_SOURCE_NAME`
pub fn env_key(name: &str) -> String {
    let mut key = PROPERTY_PREFIX.to_uppercase();
    key.push('_');
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            key.push('_');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        if c == '.' || c == '-' {
            key.push('_');
        } else {
            key.push(c.to_ascii_uppercase());
        }
    }
    key
}

/// No properties at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProperties;

impl PropertySource for NoProperties {
    fn property(&self, _name: &str) -> Option<String> {
        None
    }
}
