// src/config/model.rs

use std::{path::PathBuf, str::FromStr};
use shared::DEFAULT_SOURCE_NAME;
use thiserror::Error;

use super::loader::PropertySource;
use crate::{format::FormatterKind, level::Severity};

/// Fully resolved handler options. Immutable once the handler is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub level: Severity,
    pub source_name: String,
    pub auto_create_reg_key: bool,
    pub auto_delete_reg_key: bool,
    pub encoding: Encoding,
    pub formatter: FormatterKind,
    /// Overrides the process-wide message file path.
    pub message_file: Option<PathBuf>,
    /// Attach the serialized record as event data.
    pub payload: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            level: Severity::Info,
            source_name: DEFAULT_SOURCE_NAME.into(),
            auto_create_reg_key: true,
            auto_delete_reg_key: false,
            encoding: Encoding::default(),
            formatter: FormatterKind::default(),
            message_file: None,
            payload: true,
        }
    }
}

/// Character encoding of the binary payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
}

impl Encoding {
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported encoding '{0}'")]
pub struct UnknownEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('_', "-").as_str() {
            "UTF-8" | "UTF8" => Ok(Encoding::Utf8),
            "UTF-16LE" | "UTF-16" | "UTF16" | "UTF16LE" | "UNICODE" => Ok(Encoding::Utf16Le),
            _ => Err(UnknownEncoding(s.trim().into())),
        }
    }
}

// ───── property names ───────────────────────────────────────────────────────

pub const LEVEL: &str = "level";
pub const SOURCE_NAME: &str = "sourceName";
pub const AUTO_CREATE_REG_KEY: &str = "autoCreateRegKey";
pub const AUTO_DELETE_REG_KEY: &str = "autoDeleteRegKey";
pub const ENCODING: &str = "encoding";
pub const FORMATTER: &str = "formatter";
pub const MESSAGE_FILE: &str = "messageFile";
pub const PAYLOAD: &str = "payload";

impl HandlerConfig {
    /// Resolve every option: per-handler property, then process-wide
    /// property, then the default. Empty or unparsable values count as absent.
    pub fn resolve(handler: &dyn PropertySource, process: &dyn PropertySource) -> Self {
        let lookup = |name: &str| {
            handler
                .property(name)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| process.property(name).filter(|v| !v.trim().is_empty()))
        };
        let flag = |name: &str| lookup(name).and_then(|v| parse_bool(&v));

        let defaults = Self::default();
        Self {
            level: parse_value(lookup(LEVEL)).unwrap_or(defaults.level),
            source_name: lookup(SOURCE_NAME)
                .map(|s| s.trim().to_owned())
                .unwrap_or(defaults.source_name),
            auto_create_reg_key: flag(AUTO_CREATE_REG_KEY).unwrap_or(defaults.auto_create_reg_key),
            auto_delete_reg_key: flag(AUTO_DELETE_REG_KEY).unwrap_or(defaults.auto_delete_reg_key),
            encoding: parse_value(lookup(ENCODING)).unwrap_or(defaults.encoding),
            formatter: parse_value(lookup(FORMATTER)).unwrap_or(defaults.formatter),
            message_file: lookup(MESSAGE_FILE).map(PathBuf::from),
            payload: flag(PAYLOAD).unwrap_or(defaults.payload),
        }
    }
}

fn parse_value<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
