//! winit + wgpu implementation of [`Platform`](crate::core::Platform).
//!
//! The application drives the loop itself: each poll pumps the shared winit
//! event loop once without blocking.

mod config;
mod context;
mod events;
mod platform;

pub use config::{WindowConfig, DEFAULT_HEIGHT, DEFAULT_TITLE, DEFAULT_WIDTH};
pub use context::WinitContext;
pub use platform::WinitPlatform;
