//! The triangle's vertex table and its buffer layout.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::error::AppError;
use crate::shader::{AttributeLocation, ProgramLocations, COLOR_ATTRIBUTE, POSITION_ATTRIBUTE};

/// Interleaved 2D position + RGB color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

pub const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [-0.6, -0.4],
        color: [1.0, 0.0, 0.0],
    },
    Vertex {
        position: [0.6, -0.4],
        color: [0.0, 1.0, 0.0],
    },
    Vertex {
        position: [0.0, 0.6],
        color: [0.0, 0.0, 1.0],
    },
];

/// Attribute layout of a [`Vertex`] buffer, bound to the locations a program resolved.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: [wgpu::VertexAttribute; 2],
}

impl VertexLayout {
    /// Describes `position` and `color` at the program's `vPos` and `vCol` locations.
    ///
    /// Fails if an attribute reads a different number of components than the
    /// vertex provides.
    pub fn for_program(locations: &ProgramLocations) -> Result<Self, AppError> {
        check_components(POSITION_ATTRIBUTE, locations.position, 2)?;
        check_components(COLOR_ATTRIBUTE, locations.color, 3)?;

        Ok(Self {
            stride: size_of::<Vertex>() as u64,
            attributes: [
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: offset_of!(Vertex, position) as u64,
                    shader_location: locations.position.location,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: offset_of!(Vertex, color) as u64,
                    shader_location: locations.color.location,
                },
            ],
        })
    }

    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

fn check_components(name: &str, attr: AttributeLocation, provided: u32) -> Result<(), AppError> {
    if attr.components != provided {
        return Err(AppError::link(format!(
            "attribute `{name}` reads {} components but the vertex provides {provided}",
            attr.components
        )));
    }
    Ok(())
}
