//! # Localization Tests
//!
//! Records carry a catalog key plus parameters; the handler resolves the key
//! through the record's bundle and writes the localized text.

use std::sync::Arc;

use eventlog_handler::{
    Backend, EventLogHandler, EventType, HandlerConfig, LogRecord, Severity,
    backend::MemoryEventLog,
    error::CollectingReporter,
    format::{MessageCatalog, SimpleFormatter},
};

const CATALOG: &str = r#"
[default]
message1 = "Message with {0}"

[en]
message1 = "Message with {0}"

[ru]
message1 = "Сообщение с {0}"
"#;

fn catalog() -> Arc<MessageCatalog> {
    Arc::new(MessageCatalog::from_toml_str(CATALOG).expect("catalog parses"))
}

fn handler(store: &Arc<MemoryEventLog>) -> EventLogHandler {
    EventLogHandler::builder()
        .config(HandlerConfig { source_name: "My Application".into(), ..Default::default() })
        .backend(Backend::memory(Arc::clone(store)))
        .reporter(CollectingReporter::new())
        .build()
}

#[test]
fn english_bundle() {
    let store = Arc::new(MemoryEventLog::new());
    let handler = handler(&store);
    handler.publish(
        &LogRecord::new(Severity::Info, "message1")
            .with_parameters(["parameter"])
            .with_bundle(catalog().bundle("en")),
    );

    let events = store.events();
    assert_eq!(events[0].strings, vec!["Message with parameter".to_string()]);
    assert_eq!(events[0].event_type, EventType::Information);
}

#[test]
fn russian_bundle() {
    let store = Arc::new(MemoryEventLog::new());
    let handler = handler(&store);
    handler.publish(
        &LogRecord::new(Severity::Info, "message1")
            .with_parameters(["параметром"])
            .with_bundle(catalog().bundle("ru")),
    );
    assert_eq!(store.events()[0].strings, vec!["Сообщение с параметром".to_string()]);
}

#[test]
fn region_falls_back_to_language_then_default() {
    let store = Arc::new(MemoryEventLog::new());
    let handler = handler(&store);
    let catalog = catalog();

    handler.publish(
        &LogRecord::new(Severity::Info, "message1")
            .with_parameters(["x"])
            .with_bundle(catalog.bundle("ru_RU")),
    );
    handler.publish(
        &LogRecord::new(Severity::Info, "message1")
            .with_parameters(["y"])
            .with_bundle(catalog.bundle("de_DE")),
    );

    let strings: Vec<_> = store.events().into_iter().map(|e| e.strings[0].clone()).collect();
    assert_eq!(strings, ["Сообщение с x", "Message with y"]);
}

#[test]
fn unknown_key_is_written_verbatim() {
    let store = Arc::new(MemoryEventLog::new());
    let handler = handler(&store);
    handler.publish(
        &LogRecord::new(Severity::Warning, "not-in-catalog")
            .with_bundle(catalog().bundle("en")),
    );
    assert_eq!(store.events()[0].strings, vec!["not-in-catalog".to_string()]);
}

#[test]
fn simple_formatter_localizes_too() {
    let store = Arc::new(MemoryEventLog::new());
    let handler = EventLogHandler::builder()
        .config(HandlerConfig::default())
        .backend(Backend::memory(Arc::clone(&store)))
        .reporter(CollectingReporter::new())
        .formatter(SimpleFormatter)
        .build();
    handler.publish(
        &LogRecord::new(Severity::Info, "message1")
            .with_parameters(["параметром"])
            .with_bundle(catalog().bundle("ru"))
            .with_logger_name("app"),
    );
    assert!(store.events()[0].strings[0].ends_with("[INFO][app] Сообщение с параметром"));
}
