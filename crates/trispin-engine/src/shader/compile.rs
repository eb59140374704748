use std::fmt;

use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};
use naga::{GlobalVariable, Handle};

use crate::error::AppError;

/// Pipeline stage a shader module is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A parsed and validated shader stage.
///
/// Holds on to its source text so the GPU layer can build a module from the
/// exact text that was validated here.
#[derive(Debug)]
pub struct CompiledStage {
    stage: ShaderStage,
    source: String,
    module: naga::Module,
    info: ModuleInfo,
    entry_index: usize,
}

impl CompiledStage {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    /// Entry point selected for this stage.
    pub fn entry(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }

    pub fn entry_point(&self) -> &str {
        &self.entry().name
    }

    /// True if the entry point reads or writes `global`, directly or through a call.
    pub fn uses_global(&self, global: Handle<GlobalVariable>) -> bool {
        !self.info.get_entry_point(self.entry_index)[global].is_empty()
    }
}

/// Parses and validates `source` as a single `stage`.
///
/// The first entry point declared for `stage` is used. On failure the error
/// carries naga's rendered diagnostic, including the offending source line.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<CompiledStage, AppError> {
    let fail = |log: String| AppError::ShaderCompile { stage, log };

    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| fail(e.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    let info = validator
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(source)))?;

    let entry_index = module
        .entry_points
        .iter()
        .position(|ep| ep.stage == stage.to_naga())
        .ok_or_else(|| fail(format!("module declares no @{stage} entry point")))?;

    log::debug!(
        "compiled {stage} shader (entry point `{}`)",
        module.entry_points[entry_index].name
    );

    Ok(CompiledStage {
        stage,
        source: source.to_owned(),
        module,
        info,
        entry_index,
    })
}
