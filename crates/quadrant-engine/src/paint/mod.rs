//! Color representation (linear, premultiplied alpha).

mod color;

pub use color::Color;
