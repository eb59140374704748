use winit::dpi::LogicalSize;
use winit::window::{Window, WindowAttributes};

pub const DEFAULT_TITLE: &str = "Triangle Test (wgpu)";
pub const DEFAULT_WIDTH: u32 = 500;
pub const DEFAULT_HEIGHT: u32 = 500;

/// Window the graphics context is created for.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    /// Requested client area in logical pixels.
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn attributes(&self) -> WindowAttributes {
        Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.width as f64, self.height as f64))
            .with_resizable(self.resizable)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            resizable: true,
        }
    }
}
