//! wgpu device, surface and the GPU objects behind context handles.
//!
//! - [`Gpu`] creates the adapter, device and queue and owns the configured surface
//! - [`GpuFrame`] is one acquired surface texture plus its encoder
//! - [`GpuProgram`] and [`GpuGeometry`] back `ProgramHandle` and `GeometryHandle`

mod frame;
mod gpu;
mod init;
mod resources;
mod surface;

pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use resources::{GpuGeometry, GpuProgram};
pub use surface::SurfaceErrorAction;
