use glam::Mat4;

use crate::error::AppError;
use crate::geometry::{VertexLayout, TRIANGLE};
use crate::shader::{ProgramLocations, ShaderProgram, ShaderSources};

use super::context::{GeometryHandle, GraphicsContext, ProgramHandle};

/// The shader program and the triangle geometry, created in that order.
#[derive(Debug)]
pub struct RenderResources {
    program: ProgramHandle,
    geometry: GeometryHandle,
    locations: ProgramLocations,
    vertex_count: u32,
}

impl RenderResources {
    /// Compiles and links `sources`, uploads [`TRIANGLE`] with a layout built
    /// from the program's attribute locations, and prepares the pair for drawing.
    ///
    /// On failure nothing created here is left alive.
    pub fn create<C: GraphicsContext>(
        ctx: &mut C,
        sources: &ShaderSources,
    ) -> Result<Self, AppError> {
        let shader = ShaderProgram::build(sources)?;
        let locations = shader.locations();
        let program = ctx.create_program(&shader)?;

        let geometry = match VertexLayout::for_program(&locations)
            .and_then(|layout| ctx.create_geometry(&TRIANGLE, &layout))
        {
            Ok(geometry) => geometry,
            Err(e) => {
                ctx.delete_program(program);
                return Err(e);
            }
        };

        if let Err(e) = ctx.prepare_draw(program, geometry) {
            ctx.delete_geometry(geometry);
            ctx.delete_program(program);
            return Err(e);
        }

        Ok(Self {
            program,
            geometry,
            locations,
            vertex_count: TRIANGLE.len() as u32,
        })
    }

    pub fn locations(&self) -> ProgramLocations {
        self.locations
    }

    pub fn upload_mvp<C: GraphicsContext>(&self, ctx: &mut C, mvp: &Mat4) {
        ctx.set_mvp(self.program, mvp);
    }

    pub fn draw<C: GraphicsContext>(&self, ctx: &mut C) -> Result<(), AppError> {
        ctx.draw(self.program, self.geometry, self.vertex_count)
    }

    /// Deletes the geometry, then the program.
    pub fn release<C: GraphicsContext>(self, ctx: &mut C) {
        ctx.delete_geometry(self.geometry);
        ctx.delete_program(self.program);
    }
}
