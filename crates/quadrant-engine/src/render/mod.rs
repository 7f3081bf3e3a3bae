//! Frame rendering.
//!
//! The renderer consumes a linked program and the position buffer and issues
//! GPU commands via wgpu. It owns the uniform buffers it writes.

mod ctx;
mod frame;
mod transform;

pub use ctx::{RenderCtx, RenderTarget};
pub use frame::FrameRenderer;
pub use transform::Transforms;
