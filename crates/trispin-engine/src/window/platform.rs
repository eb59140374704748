use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::core::Platform;
use crate::device::{Gpu, GpuInit};
use crate::error::AppError;

use super::{WindowConfig, WinitContext};

/// Pumps allowed for the window system to hand out an active event loop.
const MAX_BOOTSTRAP_PUMPS: usize = 100;

pub(super) type SharedEventLoop = Rc<RefCell<EventLoop<()>>>;

/// Opens winit windows with a wgpu surface.
///
/// winit allows one event loop per process, so it is created lazily by the
/// first context and kept for every context after it.
pub struct WinitPlatform {
    gpu_init: GpuInit,
    event_loop: Option<SharedEventLoop>,
}

impl WinitPlatform {
    pub fn new(gpu_init: GpuInit) -> Self {
        Self {
            gpu_init,
            event_loop: None,
        }
    }

    fn event_loop(&mut self) -> Result<SharedEventLoop, AppError> {
        if let Some(event_loop) = &self.event_loop {
            return Ok(Rc::clone(event_loop));
        }

        let event_loop = EventLoop::new()
            .map_err(|e| AppError::PlatformInit(format!("failed to create event loop: {e}")))?;
        let event_loop = Rc::new(RefCell::new(event_loop));
        self.event_loop = Some(Rc::clone(&event_loop));
        Ok(event_loop)
    }
}

impl Default for WinitPlatform {
    fn default() -> Self {
        Self::new(GpuInit::default())
    }
}

impl Platform for WinitPlatform {
    type Context = WinitContext;

    fn create_context(&mut self, config: &WindowConfig) -> Result<WinitContext, AppError> {
        let event_loop = self.event_loop()?;
        let window = open_window(&mut event_loop.borrow_mut(), config)?;

        let gpu = pollster::block_on(Gpu::new(Arc::clone(&window), self.gpu_init.clone()))
            .map_err(|e| AppError::PlatformInit(format!("{e:#}")))?;

        log::debug!(
            "opened \"{}\" with a {}x{} framebuffer",
            config.title,
            gpu.size().width,
            gpu.size().height
        );

        Ok(WinitContext::new(window, gpu, event_loop))
    }
}

/// Windows can only be created from inside an event loop callback.
fn open_window(
    event_loop: &mut EventLoop<()>,
    config: &WindowConfig,
) -> Result<Arc<Window>, AppError> {
    let mut bootstrap = WindowBootstrap {
        attributes: Some(config.attributes()),
        result: None,
    };

    for _ in 0..MAX_BOOTSTRAP_PUMPS {
        if let PumpStatus::Exit(code) =
            event_loop.pump_app_events(Some(Duration::ZERO), &mut bootstrap)
        {
            return Err(AppError::PlatformInit(format!(
                "event loop exited with code {code} before the window opened"
            )));
        }

        if let Some(result) = bootstrap.result.take() {
            return result
                .map_err(|e| AppError::PlatformInit(format!("failed to create window: {e}")));
        }
    }

    Err(AppError::PlatformInit(
        "event loop never became active".to_string(),
    ))
}

struct WindowBootstrap {
    attributes: Option<WindowAttributes>,
    result: Option<Result<Arc<Window>, OsError>>,
}

impl WindowBootstrap {
    fn create(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attributes) = self.attributes.take() {
            self.result = Some(event_loop.create_window(attributes).map(Arc::new));
        }
    }
}

impl ApplicationHandler for WindowBootstrap {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create(event_loop);
    }

    // `resumed` only fires once per event loop; later contexts open here.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.create(event_loop);
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}
