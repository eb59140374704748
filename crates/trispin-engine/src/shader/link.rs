use naga::{AddressSpace, Binding, Handle, Module, ScalarKind, Type, TypeInner, VectorSize};

use crate::error::AppError;

use super::compile::{compile_stage, CompiledStage, ShaderStage};
use super::source::ShaderSources;

/// Name of the model-view-projection uniform.
pub const MVP_UNIFORM: &str = "MVP";
/// Name of the per-vertex position attribute.
pub const POSITION_ATTRIBUTE: &str = "vPos";
/// Name of the per-vertex color attribute.
pub const COLOR_ATTRIBUTE: &str = "vCol";

/// Bind group slot of a uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformBinding {
    pub group: u32,
    pub binding: u32,
}

/// Shader location of a vertex attribute and the number of `f32` components it reads.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttributeLocation {
    pub location: u32,
    pub components: u32,
}

/// Locations resolved at link time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramLocations {
    pub mvp: UniformBinding,
    pub position: AttributeLocation,
    pub color: AttributeLocation,
}

/// A vertex stage and a fragment stage that have been checked against each other.
#[derive(Debug)]
pub struct ShaderProgram {
    vertex: CompiledStage,
    fragment: CompiledStage,
    locations: ProgramLocations,
}

impl ShaderProgram {
    /// Compiles the vertex stage, then the fragment stage, then links them.
    pub fn build(sources: &ShaderSources) -> Result<Self, AppError> {
        let vertex = compile_stage(ShaderStage::Vertex, &sources.vertex)?;
        let fragment = compile_stage(ShaderStage::Fragment, &sources.fragment)?;
        link(vertex, fragment)
    }

    pub fn vertex(&self) -> &CompiledStage {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledStage {
        &self.fragment
    }

    pub fn locations(&self) -> ProgramLocations {
        self.locations
    }
}

/// Links two compiled stages into a program.
///
/// Fails when the stages are swapped, when a fragment input has no vertex output
/// of the same type at its location, when `MVP`, `vPos` or `vCol` cannot be
/// resolved, or when an entry point uses a resource other than the vertex
/// stage's `MVP`.
pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> Result<ShaderProgram, AppError> {
    for (stage, expected) in [(&vertex, ShaderStage::Vertex), (&fragment, ShaderStage::Fragment)] {
        if stage.stage() != expected {
            return Err(AppError::link(format!(
                "expected a {expected} stage, got a {} stage",
                stage.stage()
            )));
        }
    }

    check_interface(&vertex, &fragment)?;

    let locations = ProgramLocations {
        mvp: resolve_uniform(&vertex, MVP_UNIFORM)?,
        position: resolve_attribute(&vertex, POSITION_ATTRIBUTE)?,
        color: resolve_attribute(&vertex, COLOR_ATTRIBUTE)?,
    };

    check_resources(&vertex)?;
    check_resources(&fragment)?;

    log::debug!("linked shader program: {locations:?}");

    Ok(ShaderProgram {
        vertex,
        fragment,
        locations,
    })
}

/// A user-defined `@location` input or output of an entry point.
struct Varying<'m> {
    name: String,
    location: u32,
    ty: &'m TypeInner,
}

fn collect_locations<'m>(
    module: &'m Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying<'m>>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            name: name.unwrap_or("<unnamed>").to_owned(),
            location: *location,
            ty: &module.types[ty].inner,
        }),
        Some(_) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}

fn entry_inputs(stage: &CompiledStage) -> Vec<Varying<'_>> {
    let mut out = Vec::new();
    for arg in &stage.entry().function.arguments {
        collect_locations(
            stage.module(),
            arg.name.as_deref(),
            arg.ty,
            arg.binding.as_ref(),
            &mut out,
        );
    }
    out
}

fn entry_outputs(stage: &CompiledStage) -> Vec<Varying<'_>> {
    let mut out = Vec::new();
    if let Some(result) = &stage.entry().function.result {
        collect_locations(stage.module(), None, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

fn check_interface(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<(), AppError> {
    let outputs = entry_outputs(vertex);

    for input in entry_inputs(fragment) {
        let Some(output) = outputs.iter().find(|o| o.location == input.location) else {
            return Err(AppError::link(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            )));
        };

        if output.ty != input.ty {
            return Err(AppError::link(format!(
                "type mismatch at location {}: vertex output `{}` is {}, fragment input `{}` is {}",
                input.location,
                output.name,
                describe(output.ty),
                input.name,
                describe(input.ty)
            )));
        }
    }

    Ok(())
}

fn resolve_uniform(vertex: &CompiledStage, name: &str) -> Result<UniformBinding, AppError> {
    let module = vertex.module();
    let var = module
        .global_variables
        .iter()
        .map(|(_, var)| var)
        .find(|var| var.name.as_deref() == Some(name))
        .ok_or_else(|| AppError::link(format!("active uniform `{name}` not found")))?;

    if var.space != AddressSpace::Uniform {
        return Err(AppError::link(format!("`{name}` is not a uniform")));
    }

    let Some(rb) = &var.binding else {
        return Err(AppError::link(format!("uniform `{name}` has no binding")));
    };

    let inner = &module.types[var.ty].inner;
    if !is_mat4_f32(inner) {
        return Err(AppError::link(format!(
            "uniform `{name}` must be mat4x4<f32>, found {}",
            describe(inner)
        )));
    }

    if rb.group != 0 {
        return Err(AppError::link(format!(
            "uniform `{name}` must live in bind group 0, found group {}",
            rb.group
        )));
    }

    Ok(UniformBinding {
        group: rb.group,
        binding: rb.binding,
    })
}

/// The program layout has a single slot: `MVP`, visible to the vertex stage.
/// Any other bound resource an entry point touches cannot be bound.
fn check_resources(stage: &CompiledStage) -> Result<(), AppError> {
    let module = stage.module();

    for (handle, var) in module.global_variables.iter() {
        let Some(rb) = &var.binding else {
            continue;
        };
        if !stage.uses_global(handle) {
            continue;
        }

        let name = var.name.as_deref().unwrap_or("<unnamed>");
        if name == MVP_UNIFORM {
            if stage.stage() == ShaderStage::Vertex {
                continue;
            }
            return Err(AppError::link(format!(
                "uniform `{name}` is read by the {} stage but is only bound for the vertex stage",
                stage.stage()
            )));
        }

        return Err(AppError::link(format!(
            "{} stage uses `{name}` at ({}, {}), which has no slot in the program layout",
            stage.stage(),
            rb.group,
            rb.binding
        )));
    }

    Ok(())
}

fn resolve_attribute(vertex: &CompiledStage, name: &str) -> Result<AttributeLocation, AppError> {
    let inputs = entry_inputs(vertex);
    let input = inputs.iter().find(|v| v.name == name).ok_or_else(|| {
        AppError::link(format!("active attribute `{name}` not found in vertex stage"))
    })?;

    let components = match input.ty {
        TypeInner::Scalar(s) if is_f32(*s) => 1,
        TypeInner::Vector { size, scalar } if is_f32(*scalar) => *size as u32,
        other => {
            return Err(AppError::link(format!(
                "attribute `{name}` must be f32 or a vector of f32, found {}",
                describe(other)
            )));
        }
    };

    Ok(AttributeLocation {
        location: input.location,
        components,
    })
}

fn is_f32(scalar: naga::Scalar) -> bool {
    scalar.kind == ScalarKind::Float && scalar.width == 4
}

fn is_mat4_f32(inner: &TypeInner) -> bool {
    matches!(
        inner,
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar,
        } if is_f32(*scalar)
    )
}

fn describe(inner: &TypeInner) -> String {
    match inner {
        TypeInner::Scalar(s) => scalar_name(*s),
        TypeInner::Vector { size, scalar } => format!("vec{}<{}>", *size as u8, scalar_name(*scalar)),
        TypeInner::Matrix {
            columns,
            rows,
            scalar,
        } => format!("mat{}x{}<{}>", *columns as u8, *rows as u8, scalar_name(*scalar)),
        other => format!("{other:?}"),
    }
}

fn scalar_name(scalar: naga::Scalar) -> String {
    let prefix = match scalar.kind {
        ScalarKind::Float => "f",
        ScalarKind::Sint => "i",
        ScalarKind::Uint => "u",
        ScalarKind::Bool => return "bool".to_string(),
        other => return format!("{other:?}"),
    };
    format!("{prefix}{}", u32::from(scalar.width) * 8)
}
