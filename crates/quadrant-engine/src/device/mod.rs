//! GPU device + surface management (the rendering context).
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue bound to a window surface
//! - refusing software rasterisers unless explicitly allowed
//! - configuring the Surface and acquiring frames for rendering

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::ContextError;
pub use frame::{GpuFrame, SurfaceErrorAction};
pub use gpu::Gpu;
pub use init::GpuInit;
