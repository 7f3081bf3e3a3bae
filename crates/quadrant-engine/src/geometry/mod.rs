//! Static geometry uploaded once at startup.

mod position;

pub use position::{PositionBuffer, PositionVertex, SQUARE_POSITIONS, SQUARE_VERTICES};
