use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::{Event, Key, KeyAction};

/// Translates a winit `WindowEvent` into an [`Event`].
///
/// Returns `None` for events the application does not handle.
pub(crate) fn translate_window_event(event: &WindowEvent) -> Option<Event> {
    match event {
        WindowEvent::CloseRequested => Some(Event::Close),

        WindowEvent::Resized(size) => Some(Event::Resize {
            width: size.width,
            height: size.height,
        }),

        WindowEvent::KeyboardInput { event, .. } => Some(map_key_event(event)),

        _ => None,
    }
}

fn map_key_event(event: &KeyEvent) -> Event {
    let action = match (event.state, event.repeat) {
        (ElementState::Pressed, false) => KeyAction::Press,
        (ElementState::Pressed, true) => KeyAction::Repeat,
        (ElementState::Released, _) => KeyAction::Release,
    };

    Event::Key {
        key: map_key(event.physical_key),
        action,
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        PhysicalKey::Code(code) => Key::Other(code as u32),
        // NativeKeyCode has no stable numeric form in winit 0.30.
        PhysicalKey::Unidentified(_) => Key::Other(0),
    }
}
