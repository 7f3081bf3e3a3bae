use quadrant_engine::device::GpuInit;
use quadrant_engine::logging::LoggingConfig;
use quadrant_engine::paint::Color;
use quadrant_engine::shader::ShaderPaths;
use quadrant_engine::window::RuntimeConfig;

/// Shipped vertex stage.
pub const VERTEX_SHADER_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/square.vert.wgsl");
/// Shipped fragment stage.
pub const FRAGMENT_SHADER_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/square.frag.wgsl");

/// Everything the binary can be configured with.
#[derive(Debug, Clone)]
pub struct SquareConfig {
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub logging: LoggingConfig,
    pub shader_paths: ShaderPaths,
    pub background: Color,
}

impl Default for SquareConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            gpu: GpuInit::default(),
            logging: LoggingConfig::default(),
            shader_paths: ShaderPaths::new(VERTEX_SHADER_PATH, FRAGMENT_SHADER_PATH),
            background: Color::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shader_paths_exist() {
        let cfg = SquareConfig::default();
        assert!(cfg.shader_paths.vertex.is_file());
        assert!(cfg.shader_paths.fragment.is_file());
    }

    #[test]
    fn surface_is_named_glcanvas() {
        assert_eq!(SquareConfig::default().runtime.title, "glcanvas");
    }

    #[test]
    fn hardware_context_required_by_default() {
        assert!(!SquareConfig::default().gpu.allow_software);
    }
}
