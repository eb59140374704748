use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use glam::Mat4;
use slotmap::SlotMap;
use winit::dpi::PhysicalSize;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::Window;

use crate::core::{GeometryHandle, GraphicsContext, ProgramHandle};
use crate::device::{Gpu, GpuFrame, GpuGeometry, GpuProgram, SurfaceErrorAction};
use crate::error::AppError;
use crate::geometry::{Vertex, VertexLayout};
use crate::input::Event;
use crate::shader::ShaderProgram;
use crate::time::ContextClock;
use crate::transform::Viewport;

use super::events::EventCollector;
use super::platform::SharedEventLoop;

/// A winit window with a wgpu device and surface.
///
/// Fields drop in declaration order: GPU objects go first, the window last.
pub struct WinitContext {
    frame: Option<GpuFrame>,
    pending_clear: Option<wgpu::Color>,
    pipelines: HashMap<(ProgramHandle, GeometryHandle), wgpu::RenderPipeline>,
    geometries: SlotMap<GeometryHandle, GpuGeometry>,
    programs: SlotMap<ProgramHandle, GpuProgram>,
    gpu: Gpu,
    window: Arc<Window>,
    event_loop: SharedEventLoop,
    clock: ContextClock,
    viewport: Viewport,
}

impl WinitContext {
    pub(super) fn new(window: Arc<Window>, gpu: Gpu, event_loop: SharedEventLoop) -> Self {
        let size = gpu.size();
        Self {
            frame: None,
            pending_clear: None,
            pipelines: HashMap::new(),
            geometries: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            gpu,
            window,
            event_loop,
            clock: ContextClock::new(),
            viewport: Viewport::full(size.width, size.height),
        }
    }

    /// Makes sure a surface texture is held for the current frame.
    ///
    /// Returns `false` when this frame has to be skipped.
    fn acquire_frame(&mut self) -> Result<bool, AppError> {
        if self.frame.is_some() {
            return Ok(true);
        }

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(false);
        }

        match self.gpu.begin_frame() {
            Ok(frame) => {
                self.frame = Some(frame);
                Ok(true)
            }
            Err(err) => {
                let message = err.to_string();
                match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        log::debug!("skipping frame: {message}");
                        Ok(false)
                    }
                    SurfaceErrorAction::Fatal => Err(AppError::Present(message)),
                }
            }
        }
    }

    /// Builds and caches the pipeline for a (program, geometry) pair.
    ///
    /// A pipeline the device rejects is a link failure: the shader interface
    /// does not fit the program layout.
    fn ensure_pipeline(
        &mut self,
        program: ProgramHandle,
        geometry: GeometryHandle,
    ) -> Result<(), AppError> {
        if self.pipelines.contains_key(&(program, geometry)) {
            return Ok(());
        }

        let (Some(gpu_program), Some(gpu_geometry)) =
            (self.programs.get(program), self.geometries.get(geometry))
        else {
            return Err(AppError::Platform(
                "pipeline requested for a deleted program or geometry".to_string(),
            ));
        };

        log::debug!("building render pipeline for {program:?} / {geometry:?}");
        let format = self.gpu.surface_format();
        let pipeline = self
            .gpu
            .validated(|device| gpu_program.build_pipeline(device, format, gpu_geometry.layout()))
            .map_err(|e| AppError::link(format!("render pipeline rejected: {e}")))?;

        self.pipelines.insert((program, geometry), pipeline);
        Ok(())
    }
}

impl GraphicsContext for WinitContext {
    fn poll_events(&mut self) -> Result<Vec<Event>, AppError> {
        let mut collector = EventCollector::new(self.window.id());
        let status = self
            .event_loop
            .borrow_mut()
            .pump_app_events(Some(Duration::ZERO), &mut collector);

        if let PumpStatus::Exit(code) = status {
            if code != 0 {
                return Err(AppError::Platform(format!("event loop exited with code {code}")));
            }
            collector.push(Event::Close);
        }

        if let Some(size) = collector.resized() {
            self.gpu.resize(size);
        }

        Ok(collector.into_events())
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn elapsed(&self) -> f32 {
        self.clock.elapsed_secs()
    }

    fn create_program(&mut self, program: &ShaderProgram) -> Result<ProgramHandle, AppError> {
        let program = self
            .gpu
            .validated(|device| GpuProgram::new(device, program))
            .map_err(|e| AppError::link(format!("GPU program rejected: {e}")))?;
        Ok(self.programs.insert(program))
    }

    fn create_geometry(
        &mut self,
        vertices: &[Vertex],
        layout: &VertexLayout,
    ) -> Result<GeometryHandle, AppError> {
        let geometry = self
            .gpu
            .validated(|device| GpuGeometry::new(device, vertices, layout))
            .map_err(|e| AppError::Platform(format!("vertex buffer rejected: {e}")))?;
        Ok(self.geometries.insert(geometry))
    }

    fn prepare_draw(
        &mut self,
        program: ProgramHandle,
        geometry: GeometryHandle,
    ) -> Result<(), AppError> {
        self.ensure_pipeline(program, geometry)
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn set_mvp(&mut self, program: ProgramHandle, mvp: &Mat4) {
        match self.programs.get(program) {
            Some(program) => program.write_mvp(self.gpu.queue(), mvp),
            None => log::warn!("MVP upload to a deleted program ignored"),
        }
    }

    fn clear(&mut self, color: wgpu::Color) -> Result<(), AppError> {
        if self.acquire_frame()? {
            self.pending_clear = Some(color);
        }
        Ok(())
    }

    fn draw(
        &mut self,
        program: ProgramHandle,
        geometry: GeometryHandle,
        vertex_count: u32,
    ) -> Result<(), AppError> {
        if !self.acquire_frame()? {
            return Ok(());
        }

        let Some(viewport) = clamp_viewport(self.viewport, self.gpu.size()) else {
            return Ok(());
        };

        self.ensure_pipeline(program, geometry)?;

        let (Some(gpu_program), Some(gpu_geometry), Some(pipeline)) = (
            self.programs.get(program),
            self.geometries.get(geometry),
            self.pipelines.get(&(program, geometry)),
        ) else {
            return Err(AppError::Platform(
                "draw with a deleted program or geometry".to_string(),
            ));
        };

        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };

        let load = match self.pending_clear.take() {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("trispin triangle pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(
            viewport.x as f32,
            viewport.y as f32,
            viewport.width as f32,
            viewport.height as f32,
            0.0,
            1.0,
        );
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, gpu_program.bind_group(), &[]);
        rpass.set_vertex_buffer(0, gpu_geometry.buffer().slice(..));
        rpass.draw(0..vertex_count.min(gpu_geometry.vertex_count()), 0..1);

        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), AppError> {
        let Some(mut frame) = self.frame.take() else {
            self.pending_clear = None;
            return Ok(());
        };

        if let Some(color) = self.pending_clear.take() {
            frame.encode_clear(color);
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        let ft = self.clock.tick();
        log::trace!(
            "presented frame {} at {:.3}s (dt {:.2} ms)",
            ft.frame_index,
            ft.elapsed,
            ft.dt * 1000.0
        );

        Ok(())
    }

    fn delete_geometry(&mut self, geometry: GeometryHandle) {
        if self.geometries.remove(geometry).is_some() {
            self.pipelines.retain(|(_, g), _| *g != geometry);
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(program).is_some() {
            self.pipelines.retain(|(p, _), _| *p != program);
        }
    }
}

/// Clips `viewport` to the surface. `None` if nothing of it is visible.
fn clamp_viewport(viewport: Viewport, surface: PhysicalSize<u32>) -> Option<Viewport> {
    if viewport.x >= surface.width || viewport.y >= surface.height {
        return None;
    }

    let clamped = Viewport {
        x: viewport.x,
        y: viewport.y,
        width: viewport.width.min(surface.width - viewport.x),
        height: viewport.height.min(surface.height - viewport.y),
    };
    clamped.is_valid().then_some(clamped)
}
