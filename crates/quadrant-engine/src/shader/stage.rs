use std::fmt;

use crate::render::RenderCtx;

/// Pipeline stage a shader source targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Vertex => "quadrant vertex shader",
            Self::Fragment => "quadrant fragment shader",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// A stage failed to compile. `log` is the compiler diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub kind: ShaderKind,
    pub log: String,
}

impl CompileError {
    pub(crate) fn new(kind: ShaderKind, log: impl Into<String>) -> Self {
        Self { kind, log: log.into() }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} shader compilation failed:\n{}", self.kind, self.log.trim_end())
    }
}

impl std::error::Error for CompileError {}

/// Front-end result for one stage: the validated IR plus its entry point.
#[derive(Debug)]
pub(crate) struct ValidatedStage {
    pub module: naga::Module,
    pub entry_point: String,
}

/// Parses and validates WGSL for `kind` without touching the GPU.
pub(crate) fn validate_stage(
    kind: ShaderKind,
    source: &str,
) -> Result<ValidatedStage, CompileError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| CompileError::new(kind, e.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| CompileError::new(kind, e.emit_to_string(source)))?;

    let mut entries = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == kind.naga_stage());

    let Some(entry) = entries.next() else {
        return Err(CompileError::new(kind, format!("no @{kind} entry point declared")));
    };
    let entry_point = entry.name.clone();

    if entries.next().is_some() {
        log::debug!("{kind} source declares several entry points; using `{entry_point}`");
    }

    Ok(ValidatedStage {
        module,
        entry_point,
    })
}

/// A compiled stage: validated IR (kept for linking) and the GPU module.
///
/// Owned by the caller until [`link`](super::link) consumes it; dropping it
/// releases the GPU module.
pub struct Shader {
    kind: ShaderKind,
    pub(crate) entry_point: String,
    pub(crate) module: naga::Module,
    pub(crate) gpu: wgpu::ShaderModule,
}

impl Shader {
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        log::trace!("released {} shader `{}`", self.kind, self.entry_point);
    }
}

/// Compiles one stage.
///
/// The source is validated first; the GPU module is only created for
/// sources that compiled. Anything the device still rejects is returned as
/// a compile error and the module is dropped.
pub fn compile(
    ctx: &RenderCtx<'_>,
    kind: ShaderKind,
    source: &str,
) -> Result<Shader, CompileError> {
    let ValidatedStage {
        module,
        entry_point,
    } = validate_stage(kind, source)?;

    let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let gpu = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(kind.label()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(scope.pop()) {
        return Err(CompileError::new(kind, err.to_string()));
    }

    log::debug!("compiled {kind} shader (entry `{entry_point}`)");

    Ok(Shader {
        kind,
        entry_point,
        module,
        gpu,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "
        @vertex
        fn vs(@location(0) aVertexPosition: vec2<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(aVertexPosition, 0.0, 1.0);
        }
    ";

    const FRAGMENT: &str = "
        @fragment
        fn fs() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0);
        }
    ";

    #[test]
    fn valid_vertex_source_compiles() {
        let stage = validate_stage(ShaderKind::Vertex, VERTEX).unwrap();
        assert_eq!(stage.entry_point, "vs");
    }

    #[test]
    fn syntax_error_reports_stage_and_log() {
        let err = validate_stage(ShaderKind::Fragment, "@fragment fn fs( {").unwrap_err();
        assert_eq!(err.kind, ShaderKind::Fragment);
        assert!(!err.log.is_empty());
        assert!(err.to_string().starts_with("fragment shader compilation failed"));
    }

    #[test]
    fn type_error_is_a_compile_failure() {
        let src = "
            @fragment
            fn fs() -> @location(0) vec4<f32> {
                let x: f32 = vec2<f32>(1.0, 2.0);
                return vec4<f32>(x);
            }
        ";
        let err = validate_stage(ShaderKind::Fragment, src).unwrap_err();
        assert_eq!(err.kind, ShaderKind::Fragment);
    }

    #[test]
    fn wrong_stage_entry_point_is_rejected() {
        let err = validate_stage(ShaderKind::Vertex, FRAGMENT).unwrap_err();
        assert_eq!(err.kind, ShaderKind::Vertex);
        assert!(err.log.contains("no @vertex entry point"));
    }

    #[test]
    fn first_matching_entry_point_wins() {
        let other = "@fragment fn other() -> @location(0) vec4<f32> { return vec4<f32>(0.0); }";
        let src = format!("{FRAGMENT}\n{other}");
        let stage = validate_stage(ShaderKind::Fragment, &src).unwrap();
        assert_eq!(stage.entry_point, "fs");
    }
}
