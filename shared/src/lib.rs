//! Values that must agree between the handler and the compiled
//! message-resource file (`resources/messages.mc`).

pub mod constants;

pub use constants::*;
