//! Shader loading, compilation and linking.
//!
//! WGSL is validated and reflected with naga before any GPU object exists,
//! so compile and link failures carry a readable log and never reach wgpu's
//! error handler.

mod program;
mod reflect;
mod source;
mod stage;

pub use program::{
    AttribLocations, BuildError, LinkError, ProgramInfo, ShaderProgram, UniformLocations,
    build_program, check_sources, link,
};
pub use reflect::{
    MODEL_VIEW_MATRIX_UNIFORM, PROJECTION_MATRIX_UNIFORM, ProgramInterface, UniformLocation,
    UniformSlot, VERTEX_POSITION_ATTRIBUTE,
};
pub use source::{LoadError, ShaderPaths, ShaderSource};
pub use stage::{CompileError, Shader, ShaderKind, compile};
