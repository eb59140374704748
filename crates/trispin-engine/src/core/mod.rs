//! Application lifecycle and the seam between it and the window system.
//!
//! [`Application`] only talks to a [`GraphicsContext`]; the winit/wgpu
//! implementation lives in [`crate::window`].

mod app;
mod context;
mod resources;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{Application, LoopStatus, CLEAR_COLOR};
pub use context::{GeometryHandle, GraphicsContext, Platform, ProgramHandle};
pub use resources::RenderResources;
