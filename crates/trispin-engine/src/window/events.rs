use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::WindowId;

use crate::input::platform::translate_window_event;
use crate::input::Event;

/// Gathers the events of one window during a single pump of the event loop.
pub(super) struct EventCollector {
    window_id: WindowId,
    events: Vec<Event>,
    resized: Option<PhysicalSize<u32>>,
}

impl EventCollector {
    pub fn new(window_id: WindowId) -> Self {
        Self {
            window_id,
            events: Vec::new(),
            resized: None,
        }
    }

    /// Last size reported during the pump, if the window was resized.
    pub fn resized(&self) -> Option<PhysicalSize<u32>> {
        self.resized
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl ApplicationHandler for EventCollector {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if window_id != self.window_id {
            return;
        }

        if let WindowEvent::Resized(size) = event {
            self.resized = Some(size);
        }

        if let Some(ev) = translate_window_event(&event) {
            self.events.push(ev);
        }
    }
}
