/// Keyboard key identifier.
///
/// Only keys the application reacts to get their own variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,

    /// Any other key, carrying a platform key code when one is available.
    Other(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyAction {
    Press,
    /// Auto-repeat while held.
    Repeat,
    Release,
}

/// Platform events delivered to the application once per poll.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Event {
    Key { key: Key, action: KeyAction },

    /// Framebuffer resized; dimensions are physical pixels.
    Resize { width: u32, height: u32 },

    /// The window system asked the window to close.
    Close,
}

impl Event {
    /// True for the event that requests shutdown from the keyboard.
    pub fn is_escape_press(&self) -> bool {
        matches!(
            self,
            Event::Key {
                key: Key::Escape,
                action: KeyAction::Press,
            }
        )
    }
}
