use thiserror::Error;

use crate::shader::ShaderStage;

/// Errors that abort the application.
///
/// None of these are recovered from internally; they propagate to the caller of
/// [`Application::initialize`](crate::core::Application::initialize) or
/// [`Application::run`](crate::core::Application::run).
#[derive(Debug, Error)]
pub enum AppError {
    /// Event loop, window, surface, adapter or device creation failed.
    #[error("platform error: failed to create window or graphics context: {0}")]
    PlatformInit(String),

    /// The platform layer failed after the window was created.
    #[error("platform error: {0}")]
    Platform(String),

    /// A single shader stage failed to parse or validate.
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// The two stages could not be combined into a program.
    #[error("failed to link shader program: {log}")]
    ShaderLink { log: String },

    /// The surface could not present a frame and cannot be recovered.
    #[error("failed to present frame: {0}")]
    Present(String),
}

impl AppError {
    pub(crate) fn link(log: impl Into<String>) -> Self {
        Self::ShaderLink { log: log.into() }
    }
}
