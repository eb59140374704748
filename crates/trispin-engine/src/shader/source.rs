use std::borrow::Cow;

/// Built-in vertex stage: transforms `vPos` by `MVP` and forwards `vCol`.
pub const VERTEX_SHADER: &str = include_str!("shaders/triangle_vertex.wgsl");

/// Built-in fragment stage: emits the interpolated color as opaque RGBA.
pub const FRAGMENT_SHADER: &str = include_str!("shaders/triangle_fragment.wgsl");

/// WGSL text for both stages of the program.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<Cow<'static, str>>, fragment: impl Into<Cow<'static, str>>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self::new(VERTEX_SHADER, FRAGMENT_SHADER)
    }
}
