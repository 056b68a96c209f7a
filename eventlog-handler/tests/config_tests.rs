//! # Configuration Tests
//!
//! Option resolution: per-handler properties win over process-wide ones,
//! which win over built-in defaults. Empty or invalid values count as unset.

use std::{collections::HashMap, fs, path::PathBuf, sync::Arc};

use eventlog_handler::{
    Backend, EventLogHandler, HandlerConfig, LoggingProperties, Severity,
    backend::MemoryEventLog,
    config::{Encoding, NoProperties, PropertySource},
    error::CollectingReporter,
    format::FormatterKind,
};
use tempfile::tempdir;

/// Stand-in for the process-wide properties.
#[derive(Default)]
struct MapProperties(HashMap<&'static str, &'static str>);

impl MapProperties {
    fn with(mut self, name: &'static str, value: &'static str) -> Self {
        self.0.insert(name, value);
        self
    }
}

impl PropertySource for MapProperties {
    fn property(&self, name: &str) -> Option<String> {
        self.0.get(name).map(|v| v.to_string())
    }
}

#[test]
fn defaults_when_nothing_is_set() {
    let config = HandlerConfig::resolve(&NoProperties, &NoProperties);
    assert_eq!(config, HandlerConfig::default());
    assert_eq!(config.level, Severity::Info);
    assert_eq!(config.source_name, "EventLogHandler");
    assert!(config.auto_create_reg_key);
    assert!(!config.auto_delete_reg_key);
    assert_eq!(config.encoding, Encoding::Utf8);
    assert_eq!(config.formatter, FormatterKind::Message);
    assert_eq!(config.message_file, None);
    assert!(config.payload);
}

#[test]
fn handler_properties_override_process_properties() {
    let mut handler = LoggingProperties::new();
    handler.set("sourceName", "From Handler").set("level", "SEVERE");
    let process = MapProperties::default()
        .with("sourceName", "From Process")
        .with("autoDeleteRegKey", "true")
        .with("level", "FINE");

    let config = HandlerConfig::resolve(&handler, &process);
    assert_eq!(config.source_name, "From Handler");
    assert_eq!(config.level, Severity::Severe);
    assert!(config.auto_delete_reg_key);
}

#[test]
fn empty_and_invalid_values_fall_back() {
    let mut handler = LoggingProperties::new();
    handler
        .set("sourceName", "   ")
        .set("level", "LOUD")
        .set("autoCreateRegKey", "perhaps")
        .set("encoding", "EBCDIC");
    let process = MapProperties::default().with("sourceName", "Process Source");

    let config = HandlerConfig::resolve(&handler, &process);
    assert_eq!(config.source_name, "Process Source");
    assert_eq!(config.level, Severity::Info);
    assert!(config.auto_create_reg_key);
    assert_eq!(config.encoding, Encoding::Utf8);
}

#[test]
fn numeric_levels_are_accepted() {
    let process = MapProperties::default().with("level", "900");
    assert_eq!(HandlerConfig::resolve(&NoProperties, &process).level, Severity::Warning);
}

#[test]
fn properties_file_drives_the_handler() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eventlog.toml");
    fs::write(
        &path,
        r#"
        [eventlog_handler]
        level = "WARNING"
        sourceName = "My Application"
        autoDeleteRegKey = true
        encoding = "UTF-16LE"
        formatter = "simple"
        messageFile = "C:/svc/eventlog_messages.dll"
        payload = false
        "#,
    )
    .unwrap();

    let props = LoggingProperties::load(&path).unwrap();
    let config = HandlerConfig::resolve(&props, &NoProperties);
    assert_eq!(config.level, Severity::Warning);
    assert_eq!(config.source_name, "My Application");
    assert!(config.auto_delete_reg_key);
    assert_eq!(config.encoding, Encoding::Utf16Le);
    assert_eq!(config.formatter, FormatterKind::Simple);
    assert_eq!(config.message_file, Some(PathBuf::from("C:/svc/eventlog_messages.dll")));
    assert!(!config.payload);

    let store = Arc::new(MemoryEventLog::new());
    let handler = EventLogHandler::builder()
        .properties(props)
        .process_properties(NoProperties)
        .backend(Backend::memory(Arc::clone(&store)))
        .reporter(CollectingReporter::new())
        .build();
    assert_eq!(handler.config(), &config);
    assert!(!handler.is_loggable_level(Severity::Info));
    assert!(handler.message_file().ends_with("eventlog_messages.dll"));

    handler.close();
    assert_eq!(store.key_count(), 0);
}

#[test]
fn malformed_properties_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[eventlog_handler\nlevel = ").unwrap();
    assert!(LoggingProperties::load(&path).is_err());
    assert!(LoggingProperties::load(&dir.path().join("missing.toml")).is_err());
}
