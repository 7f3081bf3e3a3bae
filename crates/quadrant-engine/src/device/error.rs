use std::fmt;

/// Reasons a rendering context could not be acquired for a surface.
///
/// Every variant is fatal for the session; nothing retries or falls back to a
/// different context type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The window reported a zero-sized drawable area.
    ZeroSizedSurface,
    /// wgpu refused to create a surface for the window.
    SurfaceCreation(String),
    /// No adapter can present to the surface.
    NoAdapter(String),
    /// Only a software rasteriser is available.
    NotAccelerated { adapter: String },
    /// The adapter refused to open a logical device.
    DeviceRequest(String),
    /// The surface reports no usable texture formats.
    NoSurfaceFormat,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSizedSurface => write!(f, "surface has zero size"),
            Self::SurfaceCreation(e) => write!(f, "failed to create surface: {e}"),
            Self::NoAdapter(e) => write!(f, "no suitable GPU adapter: {e}"),
            Self::NotAccelerated { adapter } => {
                write!(f, "adapter `{adapter}` is not hardware accelerated")
            }
            Self::DeviceRequest(e) => write!(f, "failed to create GPU device: {e}"),
            Self::NoSurfaceFormat => write!(f, "surface supports no texture formats"),
        }
    }
}

impl std::error::Error for ContextError {}
