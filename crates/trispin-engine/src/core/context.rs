use glam::Mat4;

use crate::error::AppError;
use crate::geometry::{Vertex, VertexLayout};
use crate::input::Event;
use crate::shader::ShaderProgram;
use crate::transform::Viewport;
use crate::window::WindowConfig;

slotmap::new_key_type! {
    /// A GPU program created by [`GraphicsContext::create_program`].
    pub struct ProgramHandle;

    /// A vertex buffer created by [`GraphicsContext::create_geometry`].
    pub struct GeometryHandle;
}

/// A window together with the graphics API bound to it.
///
/// Dropping the context closes the window and releases anything still alive.
pub trait GraphicsContext {
    /// Processes pending window system events without blocking.
    fn poll_events(&mut self) -> Result<Vec<Event>, AppError>;

    /// Framebuffer size in physical pixels. May differ from the requested window
    /// size on high-density displays.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Seconds since the context was created.
    fn elapsed(&self) -> f32;

    fn create_program(&mut self, program: &ShaderProgram) -> Result<ProgramHandle, AppError>;

    fn create_geometry(
        &mut self,
        vertices: &[Vertex],
        layout: &VertexLayout,
    ) -> Result<GeometryHandle, AppError>;

    /// Builds whatever drawing `geometry` with `program` needs, so that
    /// incompatibilities surface here instead of at the first [`draw`](Self::draw).
    fn prepare_draw(
        &mut self,
        program: ProgramHandle,
        geometry: GeometryHandle,
    ) -> Result<(), AppError>;

    fn set_viewport(&mut self, viewport: Viewport);

    /// Uploads the `MVP` uniform of `program`.
    fn set_mvp(&mut self, program: ProgramHandle, mvp: &Mat4);

    /// Clears the color buffer of the current frame.
    fn clear(&mut self, color: wgpu::Color) -> Result<(), AppError>;

    /// Draws the first `vertex_count` vertices of `geometry` as triangles.
    fn draw(
        &mut self,
        program: ProgramHandle,
        geometry: GeometryHandle,
        vertex_count: u32,
    ) -> Result<(), AppError>;

    /// Presents the current frame.
    fn swap_buffers(&mut self) -> Result<(), AppError>;

    fn delete_geometry(&mut self, geometry: GeometryHandle);

    fn delete_program(&mut self, program: ProgramHandle);
}

/// Creates graphics contexts.
pub trait Platform {
    type Context: GraphicsContext;

    fn create_context(&mut self, config: &WindowConfig) -> Result<Self::Context, AppError>;
}
