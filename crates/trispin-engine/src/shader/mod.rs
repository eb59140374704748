//! Shader sources, compilation and linking.
//!
//! Stages are WGSL. Each stage is parsed and validated on its own by naga
//! (`compile_stage`), then the two stages are checked against each other and
//! the named locations the renderer needs are resolved (`link`).
//!
//! Nothing here touches the GPU; the result is consumed by
//! [`GraphicsContext::create_program`](crate::core::GraphicsContext::create_program).

mod compile;
mod link;
mod source;

pub use compile::{compile_stage, CompiledStage, ShaderStage};
pub use link::{
    link, AttributeLocation, ProgramLocations, ShaderProgram, UniformBinding, COLOR_ATTRIBUTE,
    MVP_UNIFORM, POSITION_ATTRIBUTE,
};
pub use source::{ShaderSources, FRAGMENT_SHADER, VERTEX_SHADER};
