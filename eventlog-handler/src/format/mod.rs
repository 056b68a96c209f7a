//! Turning a [`LogRecord`] into the single string written to the event log.

pub mod catalog;

use std::str::FromStr;

use chrono::{Local, SecondsFormat};
use thiserror::Error;

use crate::record::LogRecord;

pub use catalog::{MessageCatalog, ResourceBundle};

/// Renders a record as the event's insertion string.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn format(&self, record: &LogRecord) -> String {
        self(record)
    }
}

/// Default formatter: the localized, parameter-substituted message and
/// nothing else (the event viewer already shows level and time).
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageFormatter;

impl Formatter for MessageFormatter {
    fn format(&self, record: &LogRecord) -> String {
        format_message(record)
    }
}

/// `[timestamp][LEVEL][logger] message`
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleFormatter;

impl Formatter for SimpleFormatter {
    fn format(&self, record: &LogRecord) -> String {
        format!(
            "[{}][{}][{}] {}",
            record
                .timestamp
                .with_timezone(&Local)
                .to_rfc3339_opts(SecondsFormat::Millis, false),
            record.level,
            record.logger_name.as_deref().unwrap_or(""),
            format_message(record)
        )
    }
}

/// Formatter choice as written in configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FormatterKind {
    #[default]
    Message,
    Simple,
}

impl FormatterKind {
    pub fn build(self) -> Box<dyn Formatter> {
        match self {
            FormatterKind::Message => Box::new(MessageFormatter),
            FormatterKind::Simple => Box::new(SimpleFormatter),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown formatter '{0}'")]
pub struct UnknownFormatter(pub String);

impl FromStr for FormatterKind {
    type Err = UnknownFormatter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "message" => Ok(FormatterKind::Message),
            "simple" => Ok(FormatterKind::Simple),
            other => Err(UnknownFormatter(other.into())),
        }
    }
}

/// Localizes the record's message through its bundle, then substitutes
/// parameters when the template actually references one of the first four.
pub fn format_message(record: &LogRecord) -> String {
    let template = record
        .bundle
        .as_ref()
        .and_then(|bundle| bundle.get_string(&record.message))
        .unwrap_or(&record.message);

    if record.parameters.is_empty() {
        return template.to_owned();
    }
    if ["{0", "{1", "{2", "{3"].iter().any(|marker| template.contains(marker)) {
        substitute(template, &record.parameters)
    } else {
        template.to_owned()
    }
}

/// Positional `{n}` substitution with single-quote escaping: `''` is a quote,
/// text between single quotes is copied verbatim. An argument index without
/// a parameter, or a malformed placeholder, is copied as written.
pub fn substitute(template: &str, parameters: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\'');
            }
            '\'' => quoted = !quoted,
            '{' if !quoted => {
                let mut inner = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    inner.push(next);
                }
                let index = inner.split(',').next().unwrap_or("").trim();
                match index.parse::<usize>().ok().filter(|_| closed) {
                    Some(i) if i < parameters.len() => out.push_str(&parameters[i]),
                    Some(i) => {
                        out.push('{');
                        out.push_str(&i.to_string());
                        out.push('}');
                    }
                    None => {
                        out.push('{');
                        out.push_str(&inner);
                        if closed {
                            out.push('}');
                        }
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}
