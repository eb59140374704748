use crate::error::AppError;
use crate::input::Event;
use crate::shader::ShaderSources;
use crate::transform::TransformState;
use crate::window::WindowConfig;

use super::context::{GraphicsContext, Platform};
use super::resources::RenderResources;

/// Background color of every frame.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Outcome of a single loop iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopStatus {
    Continue,
    /// The close flag was set; nothing was polled or drawn.
    Closed,
}

/// The spinning triangle: owns the platform, and while initialized the window,
/// GPU resources and transform state.
///
/// Dropping an initialized application tears it down.
pub struct Application<P: Platform> {
    platform: P,
    window: WindowConfig,
    shaders: ShaderSources,
    running: Option<Running<P::Context>>,
}

impl<P: Platform> Application<P> {
    pub fn new(platform: P, window: WindowConfig) -> Self {
        Self {
            platform,
            window,
            shaders: ShaderSources::default(),
            running: None,
        }
    }

    /// Replaces the built-in shader sources used by the next [`initialize`](Self::initialize).
    pub fn with_shaders(mut self, shaders: ShaderSources) -> Self {
        self.shaders = shaders;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.running.is_some()
    }

    pub fn close_requested(&self) -> bool {
        self.running.as_ref().is_some_and(|r| r.close_requested)
    }

    /// Sets the close flag; the next [`step`](Self::step) returns [`LoopStatus::Closed`].
    pub fn request_close(&mut self) {
        if let Some(running) = &mut self.running {
            running.close_requested = true;
        }
    }

    pub fn transform(&self) -> Option<&TransformState> {
        self.running.as_ref().map(|r| &r.transform)
    }

    /// Opens the window, builds the shader program and uploads the triangle.
    ///
    /// Does nothing when already initialized. On failure the application stays
    /// uninitialized and everything created so far is released.
    pub fn initialize(&mut self) -> Result<(), AppError> {
        if self.running.is_some() {
            return Ok(());
        }

        let mut context = self.platform.create_context(&self.window)?;
        let resources = RenderResources::create(&mut context, &self.shaders)?;

        let mut running = Running {
            context,
            resources,
            transform: TransformState::new(),
            close_requested: false,
        };
        running.resize();

        log::debug!("shader locations: {:?}", running.resources.locations());
        log::info!("created triangle application");

        self.running = Some(running);
        Ok(())
    }

    /// Initializes if needed and steps until the close flag is observed.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.initialize()?;
        while self.step()? == LoopStatus::Continue {}
        Ok(())
    }

    /// Runs one iteration: poll, dispatch, update, render, present.
    ///
    /// An uninitialized application has nothing to drive and reports
    /// [`LoopStatus::Closed`].
    pub fn step(&mut self) -> Result<LoopStatus, AppError> {
        match &mut self.running {
            Some(running) => running.step(),
            None => Ok(LoopStatus::Closed),
        }
    }

    /// Deletes the geometry and program, then closes the window.
    ///
    /// Safe to call any number of times, initialized or not.
    pub fn teardown(&mut self) {
        let Some(Running {
            mut context,
            resources,
            ..
        }) = self.running.take()
        else {
            return;
        };

        resources.release(&mut context);
        drop(context);

        log::info!("destroyed triangle application");
    }
}

impl<P: Platform> Drop for Application<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct Running<C: GraphicsContext> {
    context: C,
    resources: RenderResources,
    transform: TransformState,
    close_requested: bool,
}

impl<C: GraphicsContext> Running<C> {
    fn step(&mut self) -> Result<LoopStatus, AppError> {
        if self.close_requested {
            return Ok(LoopStatus::Closed);
        }

        for event in self.context.poll_events()? {
            self.dispatch(event);
        }

        self.update();
        self.render()?;
        self.context.swap_buffers()?;

        Ok(LoopStatus::Continue)
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::Close => self.close_requested = true,
            Event::Resize { .. } => self.resize(),
            ev if ev.is_escape_press() => self.close_requested = true,
            Event::Key { .. } => {}
        }
    }

    /// Sizes everything to the context's framebuffer, not the event payload.
    fn resize(&mut self) {
        let (width, height) = self.context.framebuffer_size();
        if self.transform.resize(width, height) {
            self.context.set_viewport(self.transform.viewport());
        } else {
            log::debug!("ignoring resize to {width}x{height}");
        }
    }

    fn update(&mut self) {
        let mvp = self.transform.update(self.context.elapsed());
        self.resources.upload_mvp(&mut self.context, &mvp);
    }

    fn render(&mut self) -> Result<(), AppError> {
        self.context.clear(CLEAR_COLOR)?;
        self.resources.draw(&mut self.context)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use glam::Mat4;

    use super::*;
    use crate::core::testing::{Probe, RecordingPlatform};
    use crate::geometry::TRIANGLE;
    use crate::input::{Key, KeyAction};
    use crate::transform::Viewport;

    fn app(size: (u32, u32)) -> (Application<RecordingPlatform>, Probe) {
        let (platform, probe) = RecordingPlatform::new(size);
        (Application::new(platform, WindowConfig::default()), probe)
    }

    fn key(key: Key, action: KeyAction) -> Event {
        Event::Key { key, action }
    }

    #[test]
    fn teardown_before_initialize_is_a_no_op() {
        let (mut app, probe) = app((500, 500));
        app.teardown();
        app.teardown();

        assert!(!app.is_initialized());
        assert_eq!(probe.calls().contexts_created, 0);
        assert_eq!(probe.calls().contexts_dropped, 0);
    }

    #[test]
    fn initialize_twice_creates_one_context() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();
        app.initialize().unwrap();

        let calls = probe.calls();
        assert_eq!(calls.contexts_created, 1);
        assert_eq!(calls.programs_created, 1);
        assert_eq!(calls.geometries_created, 1);
        assert_eq!(calls.titles, vec!["Triangle Test (wgpu)".to_string()]);
        assert_eq!(calls.prepared, 1);
    }

    #[test]
    fn initialize_uploads_triangle_and_sets_first_viewport() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();

        let calls = probe.calls();
        assert_eq!(calls.uploaded, TRIANGLE.to_vec());
        assert_eq!(calls.layouts[0].attributes[0].shader_location, 0);
        assert_eq!(calls.layouts[0].attributes[1].shader_location, 1);
        assert_eq!(calls.viewports, vec![Viewport::full(500, 500)]);
        drop(calls);

        let transform = app.transform().unwrap();
        assert!((transform.aspect_ratio() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn teardown_twice_releases_once() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();
        app.teardown();
        app.teardown();

        let calls = probe.calls();
        assert_eq!(calls.contexts_dropped, 1);
        assert_eq!(calls.live_programs, 0);
        assert_eq!(calls.live_geometries, 0);
        drop(calls);
        assert!(!app.is_initialized());
    }

    #[test]
    fn reinitialize_after_teardown_recreates_everything() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();
        app.teardown();
        app.initialize().unwrap();

        let calls = probe.calls();
        assert_eq!(calls.contexts_created, 2);
        assert_eq!(calls.programs_created, 2);
        assert_eq!(calls.live_programs, 1);
        assert_eq!(calls.live_geometries, 1);
    }

    #[test]
    fn resize_then_one_frame() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();

        probe.push_poll(vec![Event::Resize { width: 800, height: 600 }]);
        assert_eq!(app.step().unwrap(), LoopStatus::Continue);

        let transform = app.transform().unwrap();
        assert!((transform.aspect_ratio() - 800.0 / 600.0).abs() < 1e-5);
        assert_eq!(transform.viewport(), Viewport::full(800, 600));

        let calls = probe.calls();
        assert_eq!(calls.viewports.last(), Some(&Viewport::full(800, 600)));
        assert_eq!(calls.clears, 1);
        assert_eq!(calls.draws, vec![3]);
        assert_eq!(calls.swaps, 1);
        drop(calls);
        assert!(!app.close_requested());
    }

    #[test]
    fn zero_sized_resize_keeps_viewport() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();

        probe.push_poll(vec![Event::Resize { width: 0, height: 0 }]);
        app.step().unwrap();

        assert_eq!(probe.calls().viewports, vec![Viewport::full(500, 500)]);
        assert_eq!(app.transform().unwrap().size(), (500, 500));
    }

    #[test]
    fn escape_press_stops_the_loop_before_next_poll() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();

        probe.push_poll(vec![key(Key::Escape, KeyAction::Press)]);
        assert_eq!(app.step().unwrap(), LoopStatus::Continue);
        assert!(app.close_requested());

        assert_eq!(app.step().unwrap(), LoopStatus::Closed);
        let calls = probe.calls();
        assert_eq!(calls.polls, 1);
        assert_eq!(calls.swaps, 1);
    }

    #[test]
    fn close_event_stops_the_loop() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();

        probe.push_poll(vec![Event::Close]);
        app.step().unwrap();
        assert_eq!(app.step().unwrap(), LoopStatus::Closed);
    }

    #[test]
    fn escape_release_and_repeat_do_not_close() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();

        probe.push_poll(vec![
            key(Key::Escape, KeyAction::Release),
            key(Key::Escape, KeyAction::Repeat),
            key(Key::Other(30), KeyAction::Press),
        ]);
        assert_eq!(app.step().unwrap(), LoopStatus::Continue);
        assert_eq!(app.step().unwrap(), LoopStatus::Continue);
        assert!(!app.close_requested());
    }

    #[test]
    fn run_returns_once_escape_is_pressed() {
        let (mut app, probe) = app((500, 500));
        probe.push_poll(vec![]);
        probe.push_poll(vec![key(Key::Escape, KeyAction::Press)]);

        app.run().unwrap();

        let calls = probe.calls();
        assert_eq!(calls.polls, 2);
        assert_eq!(calls.swaps, 2);
        assert_eq!(calls.contexts_dropped, 0);
    }

    #[test]
    fn mvp_is_uploaded_once_per_frame() {
        let (platform, probe) = RecordingPlatform::new((800, 600));
        let mut app = Application::new(platform.with_elapsed(1.5), WindowConfig::default());
        app.initialize().unwrap();

        for _ in 0..3 {
            app.step().unwrap();
        }

        let calls = probe.calls();
        assert_eq!(calls.mvps.len(), 3);

        let t = app.transform().unwrap();
        let expected = t.projection() * t.view() * t.model();
        assert!(calls.mvps[2].abs_diff_eq(expected, 1e-5));
        assert!(!calls.mvps[2].abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }

    #[test]
    fn step_without_initialize_reports_closed() {
        let (mut app, probe) = app((500, 500));
        assert_eq!(app.step().unwrap(), LoopStatus::Closed);
        assert_eq!(probe.calls().polls, 0);
    }

    #[test]
    fn shader_compile_failure_leaves_app_uninitialized() {
        let (platform, probe) = RecordingPlatform::new((500, 500));
        let broken = ShaderSources {
            vertex: Cow::Borrowed("@vertex fn vs_main( -> {"),
            ..ShaderSources::default()
        };
        let mut app = Application::new(platform, WindowConfig::default()).with_shaders(broken);

        let err = app.initialize().unwrap_err();
        assert!(matches!(err, AppError::ShaderCompile { .. }));
        assert!(!app.is_initialized());

        let calls = probe.calls();
        assert_eq!(calls.contexts_created, 1);
        assert_eq!(calls.contexts_dropped, 1);
        assert_eq!(calls.programs_created, 0);
    }

    #[test]
    fn platform_failure_is_reported() {
        let (platform, probe) = RecordingPlatform::new((500, 500));
        let mut app = Application::new(platform.failing(), WindowConfig::default());

        assert!(matches!(app.initialize(), Err(AppError::PlatformInit(_))));
        assert!(!app.is_initialized());
        assert_eq!(probe.calls().contexts_created, 0);
    }

    #[test]
    fn drop_tears_down() {
        let (mut app, probe) = app((500, 500));
        app.initialize().unwrap();
        drop(app);

        let calls = probe.calls();
        assert_eq!(calls.contexts_dropped, 1);
        assert_eq!(calls.live_programs, 0);
        assert_eq!(calls.live_geometries, 0);
    }

    #[test]
    fn request_close_stops_the_next_step() {
        let (mut app, probe) = app((500, 500));
        app.request_close();
        assert!(!app.close_requested());

        app.initialize().unwrap();
        app.request_close();
        assert!(app.close_requested());
        assert_eq!(app.step().unwrap(), LoopStatus::Closed);
        assert_eq!(probe.calls().polls, 0);
    }

    #[test]
    fn fragment_stage_reading_mvp_is_a_link_error() {
        let (platform, probe) = RecordingPlatform::new((500, 500));
        let shaders = ShaderSources {
            fragment: Cow::Borrowed(
                "@group(0) @binding(0) var<uniform> MVP: mat4x4<f32>;
                 @fragment fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
                     return MVP * vec4<f32>(color, 1.0);
                 }",
            ),
            ..ShaderSources::default()
        };
        let mut app = Application::new(platform, WindowConfig::default()).with_shaders(shaders);

        let err = app.initialize().unwrap_err();
        assert!(matches!(err, AppError::ShaderLink { .. }));
        assert!(!app.is_initialized());
        assert_eq!(probe.calls().programs_created, 0);
        assert_eq!(probe.calls().contexts_dropped, 1);
    }

    #[test]
    fn rejected_pipeline_fails_initialize_and_releases_resources() {
        let (platform, probe) = RecordingPlatform::new((500, 500));
        let mut app = Application::new(platform.rejecting_pipelines(), WindowConfig::default());

        let err = app.initialize().unwrap_err();
        assert!(matches!(err, AppError::ShaderLink { .. }));
        assert!(!app.is_initialized());

        let calls = probe.calls();
        assert_eq!(calls.programs_created, 1);
        assert_eq!(calls.geometries_created, 1);
        assert_eq!(calls.live_programs, 0);
        assert_eq!(calls.live_geometries, 0);
        assert_eq!(calls.contexts_dropped, 1);
        assert!(calls.draws.is_empty());
    }
}
