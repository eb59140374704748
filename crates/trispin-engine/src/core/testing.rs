//! In-memory platform that records every call, for lifecycle and loop tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Mat4;
use slotmap::SlotMap;

use crate::error::AppError;
use crate::geometry::{Vertex, VertexLayout};
use crate::input::Event;
use crate::shader::{ProgramLocations, ShaderProgram};
use crate::transform::Viewport;
use crate::window::WindowConfig;

use super::context::{GeometryHandle, GraphicsContext, Platform, ProgramHandle};

#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub contexts_created: usize,
    pub contexts_dropped: usize,
    pub titles: Vec<String>,
    pub polls: usize,
    pub clears: usize,
    pub draws: Vec<u32>,
    pub swaps: usize,
    pub viewports: Vec<Viewport>,
    pub mvps: Vec<Mat4>,
    pub programs_created: usize,
    pub geometries_created: usize,
    pub prepared: usize,
    pub live_programs: usize,
    pub live_geometries: usize,
    pub uploaded: Vec<Vertex>,
    pub layouts: Vec<VertexLayout>,
}

/// Handles a test keeps after moving the platform into an application.
#[derive(Clone)]
pub(crate) struct Probe {
    pub calls: Rc<RefCell<Calls>>,
    script: Rc<RefCell<VecDeque<Vec<Event>>>>,
}

impl Probe {
    /// Queues the events returned by one future poll.
    pub fn push_poll(&self, events: Vec<Event>) {
        self.script.borrow_mut().push_back(events);
    }

    pub fn calls(&self) -> std::cell::Ref<'_, Calls> {
        self.calls.borrow()
    }
}

pub(crate) struct RecordingPlatform {
    probe: Probe,
    size: (u32, u32),
    elapsed: f32,
    fail_create: bool,
    reject_pipelines: bool,
}

impl RecordingPlatform {
    pub fn new(size: (u32, u32)) -> (Self, Probe) {
        let probe = Probe {
            calls: Rc::default(),
            script: Rc::default(),
        };
        let platform = Self {
            probe: probe.clone(),
            size,
            elapsed: 0.0,
            fail_create: false,
            reject_pipelines: false,
        };
        (platform, probe)
    }

    /// Every context reports this many elapsed seconds.
    pub fn with_elapsed(mut self, elapsed: f32) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Contexts refuse to build pipelines, as a GPU that rejects the layout would.
    pub fn rejecting_pipelines(mut self) -> Self {
        self.reject_pipelines = true;
        self
    }
}

impl Platform for RecordingPlatform {
    type Context = RecordingContext;

    fn create_context(&mut self, config: &WindowConfig) -> Result<RecordingContext, AppError> {
        if self.fail_create {
            return Err(AppError::PlatformInit("no display available".to_string()));
        }

        {
            let mut calls = self.probe.calls.borrow_mut();
            calls.contexts_created += 1;
            calls.titles.push(config.title.clone());
        }

        Ok(RecordingContext {
            probe: self.probe.clone(),
            size: self.size,
            elapsed: self.elapsed,
            reject_pipelines: self.reject_pipelines,
            programs: SlotMap::with_key(),
            geometries: SlotMap::with_key(),
        })
    }
}

pub(crate) struct RecordingContext {
    probe: Probe,
    size: (u32, u32),
    elapsed: f32,
    reject_pipelines: bool,
    programs: SlotMap<ProgramHandle, ProgramLocations>,
    geometries: SlotMap<GeometryHandle, u32>,
}

impl RecordingContext {
    fn calls(&self) -> std::cell::RefMut<'_, Calls> {
        self.probe.calls.borrow_mut()
    }
}

impl GraphicsContext for RecordingContext {
    fn poll_events(&mut self) -> Result<Vec<Event>, AppError> {
        self.calls().polls += 1;
        let events = self.probe.script.borrow_mut().pop_front().unwrap_or_default();

        // A real window reports its new framebuffer size before the event arrives.
        for event in &events {
            if let Event::Resize { width, height } = *event {
                self.size = (width, height);
            }
        }

        Ok(events)
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn create_program(&mut self, program: &ShaderProgram) -> Result<ProgramHandle, AppError> {
        let handle = self.programs.insert(program.locations());
        let mut calls = self.calls();
        calls.programs_created += 1;
        calls.live_programs += 1;
        Ok(handle)
    }

    fn create_geometry(
        &mut self,
        vertices: &[Vertex],
        layout: &VertexLayout,
    ) -> Result<GeometryHandle, AppError> {
        let handle = self.geometries.insert(vertices.len() as u32);
        let mut calls = self.calls();
        calls.geometries_created += 1;
        calls.live_geometries += 1;
        calls.uploaded.extend_from_slice(vertices);
        calls.layouts.push(*layout);
        Ok(handle)
    }

    fn prepare_draw(
        &mut self,
        program: ProgramHandle,
        geometry: GeometryHandle,
    ) -> Result<(), AppError> {
        assert!(self.programs.contains_key(program), "prepare with a deleted program");
        assert!(self.geometries.contains_key(geometry), "prepare with a deleted geometry");
        if self.reject_pipelines {
            return Err(AppError::link("pipeline layout does not match the shader"));
        }
        self.calls().prepared += 1;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.calls().viewports.push(viewport);
    }

    fn set_mvp(&mut self, program: ProgramHandle, mvp: &Mat4) {
        assert!(self.programs.contains_key(program), "MVP upload to a deleted program");
        self.calls().mvps.push(*mvp);
    }

    fn clear(&mut self, _color: wgpu::Color) -> Result<(), AppError> {
        self.calls().clears += 1;
        Ok(())
    }

    fn draw(
        &mut self,
        program: ProgramHandle,
        geometry: GeometryHandle,
        vertex_count: u32,
    ) -> Result<(), AppError> {
        assert!(self.programs.contains_key(program), "draw with a deleted program");
        let available = self.geometries[geometry];
        assert!(vertex_count <= available, "draw past the end of the vertex buffer");
        self.calls().draws.push(vertex_count);
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), AppError> {
        self.calls().swaps += 1;
        Ok(())
    }

    fn delete_geometry(&mut self, geometry: GeometryHandle) {
        if self.geometries.remove(geometry).is_some() {
            self.calls().live_geometries -= 1;
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(program).is_some() {
            self.calls().live_programs -= 1;
        }
    }
}

impl Drop for RecordingContext {
    fn drop(&mut self) {
        self.calls().contexts_dropped += 1;
    }
}
