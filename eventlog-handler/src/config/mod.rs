//! Public API for configuration

pub mod loader;
pub mod model;

// Re-export the main entrypoints:
pub use loader::{LoggingProperties, NoProperties, PropertySource, SystemProperties};
pub use model::{Encoding, HandlerConfig, UnknownEncoding};
