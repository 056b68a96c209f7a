// src/format/catalog.rs
//! Localized message templates.
//!
//! A catalog is a TOML document with one table per locale plus an optional
//! `default` table used when no locale-specific template exists:
//!
//! ```toml
//! [default]
//! message1 = "Message with {0}"
//!
//! [ru]
//! message1 = "Сообщение с {0}"
//! ```

use std::{collections::HashMap, fs, path::Path, sync::Arc};

use crate::error::ConfigError;

/// Locale-bound key → template lookup attached to a record.
pub trait ResourceBundle: Send + Sync {
    fn locale(&self) -> &str;
    fn get_string(&self, key: &str) -> Option<&str>;
}

/// Name of the fallback table.
pub const DEFAULT_LOCALE: &str = "default";

#[derive(Debug, Default, Clone)]
pub struct MessageCatalog {
    tables: HashMap<String, HashMap<String, String>>,
}

impl MessageCatalog {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let tables: HashMap<String, HashMap<String, String>> = toml::from_str(text)?;
        Ok(Self { tables })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn insert(&mut self, locale: &str, key: &str, template: &str) {
        self.tables
            .entry(locale.to_owned())
            .or_default()
            .insert(key.to_owned(), template.to_owned());
    }

    /// Template for `key`, walking `ll_CC → ll → default`.
    pub fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        candidates(locale)
            .iter()
            .filter_map(|loc| self.tables.get(loc.as_str()))
            .find_map(|table| table.get(key))
            .map(String::as_str)
    }

    /// Bundle bound to `locale`, ready to attach to records.
    pub fn bundle(self: &Arc<Self>, locale: &str) -> Arc<dyn ResourceBundle> {
        Arc::new(LocalizedBundle {
            catalog: Arc::clone(self),
            locale: locale.to_owned(),
        })
    }
}

struct LocalizedBundle {
    catalog: Arc<MessageCatalog>,
    locale: String,
}

impl ResourceBundle for LocalizedBundle {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn get_string(&self, key: &str) -> Option<&str> {
        self.catalog.lookup(&self.locale, key)
    }
}

fn candidates(locale: &str) -> Vec<String> {
    let normalized = locale.replace('-', "_");
    let mut out = Vec::with_capacity(3);
    let mut current = normalized.as_str();
    while !current.is_empty() {
        out.push(current.to_owned());
        match current.rfind('_') {
            Some(idx) => current = &current[..idx],
            None => break,
        }
    }
    out.push(DEFAULT_LOCALE.to_owned());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
        [default]
        message1 = "Message with {0}"
        only_default = "fallback"

        [ru]
        message1 = "Сообщение с {0}"
    "#;

    #[test]
    fn candidates_strip_region() {
        assert_eq!(candidates("ru_RU"), ["ru_RU", "ru", "default"]);
        assert_eq!(candidates("en-GB"), ["en_GB", "en", "default"]);
        assert_eq!(candidates(""), ["default"]);
    }

    #[test]
    fn lookup_walks_fallback_chain() {
        let catalog = MessageCatalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.lookup("ru_RU", "message1"), Some("Сообщение с {0}"));
        assert_eq!(catalog.lookup("en", "message1"), Some("Message with {0}"));
        assert_eq!(catalog.lookup("ru", "only_default"), Some("fallback"));
        assert_eq!(catalog.lookup("ru", "missing"), None);
    }

    #[test]
    fn bundle_is_bound_to_locale() {
        let catalog = Arc::new(MessageCatalog::from_toml_str(CATALOG).unwrap());
        let bundle = catalog.bundle("ru");
        assert_eq!(bundle.locale(), "ru");
        assert_eq!(bundle.get_string("message1"), Some("Сообщение с {0}"));
    }

    #[test]
    fn rejects_non_string_templates() {
        assert!(MessageCatalog::from_toml_str("[en]\nmessage1 = 3\n").is_err());
    }
}
