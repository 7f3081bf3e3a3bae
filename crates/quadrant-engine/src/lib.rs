//! Quadrant engine crate.
//!
//! Brings up a GPU context on a window, builds a shader program from two
//! WGSL files, uploads a square and draws it once.

pub mod core;
pub mod device;
pub mod geometry;
pub mod lifecycle;
pub mod logging;
pub mod notify;
pub mod paint;
pub mod render;
pub mod shader;
pub mod startup;
pub mod window;
