//! Trispin engine crate.
//!
//! Opens a window, compiles a two-stage shader program and draws a triangle
//! spinning about the (1, 1, 1) axis until the window is closed or Escape is
//! pressed.

pub mod core;
pub mod device;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod shader;
pub mod time;
pub mod transform;
pub mod window;

pub use crate::core::{Application, LoopStatus};
pub use error::AppError;
