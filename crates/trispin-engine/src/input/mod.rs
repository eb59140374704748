//! Input subsystem.
//!
//! The application only sees [`Event`]s. Platform code translates window system
//! events into them and the application dispatches them synchronously.

mod types;
pub(crate) mod platform;

pub use types::{Event, Key, KeyAction};
