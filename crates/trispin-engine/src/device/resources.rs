use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::geometry::{Vertex, VertexLayout};
use crate::shader::ShaderProgram;

const MVP_SIZE: u64 = std::mem::size_of::<Mat4>() as u64;

/// GPU side of a linked [`ShaderProgram`]: both shader modules, the `MVP`
/// uniform buffer and its bind group.
///
/// Render pipelines also depend on the vertex layout, so they are built per
/// (program, geometry) pair through [`GpuProgram::build_pipeline`].
pub struct GpuProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,

    pipeline_layout: wgpu::PipelineLayout,
    mvp_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuProgram {
    pub fn new(device: &wgpu::Device, program: &ShaderProgram) -> Self {
        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trispin vertex shader"),
            source: wgpu::ShaderSource::Wgsl(program.vertex().source().into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trispin fragment shader"),
            source: wgpu::ShaderSource::Wgsl(program.fragment().source().into()),
        });

        let mvp = program.locations().mvp;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("trispin mvp bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: mvp.binding,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(MVP_SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trispin pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let mvp_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trispin mvp ubo"),
            contents: bytemuck::bytes_of(&Mat4::IDENTITY),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trispin mvp bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: mvp.binding,
                resource: mvp_buffer.as_entire_binding(),
            }],
        });

        Self {
            vertex,
            fragment,
            vertex_entry: program.vertex().entry_point().to_owned(),
            fragment_entry: program.fragment().entry_point().to_owned(),
            pipeline_layout,
            mvp_buffer,
            bind_group,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn write_mvp(&self, queue: &wgpu::Queue, mvp: &Mat4) {
        queue.write_buffer(&self.mvp_buffer, 0, bytemuck::bytes_of(mvp));
    }

    /// Builds the render pipeline that draws `layout`-shaped vertices into `format`.
    pub fn build_pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layout: &VertexLayout,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("trispin pipeline"),
            layout: Some(&self.pipeline_layout),

            vertex: wgpu::VertexState {
                module: &self.vertex,
                entry_point: Some(self.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &[layout.buffer_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.fragment,
                entry_point: Some(self.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            // Both faces stay visible while the triangle spins.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

/// Static vertex buffer plus the layout it was uploaded with.
pub struct GpuGeometry {
    buffer: wgpu::Buffer,
    layout: VertexLayout,
    vertex_count: u32,
}

impl GpuGeometry {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], layout: &VertexLayout) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trispin vertex buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            buffer,
            layout: *layout,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}
