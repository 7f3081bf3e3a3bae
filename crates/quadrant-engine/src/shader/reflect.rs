//! Stage interface resolution.
//!
//! Works on validated naga modules so every check here runs without a GPU.
//! Problems are collected into one log, the way a driver reports a failed link.

use std::collections::BTreeMap;

use super::LinkError;

/// Vertex input fed from the position buffer.
pub const VERTEX_POSITION_ATTRIBUTE: &str = "aVertexPosition";
/// Projection matrix uniform.
pub const PROJECTION_MATRIX_UNIFORM: &str = "uProjectionMatrix";
/// Model-view matrix uniform.
pub const MODEL_VIEW_MATRIX_UNIFORM: &str = "uModelViewMatrix";

const KNOWN_UNIFORMS: [&str; 2] = [PROJECTION_MATRIX_UNIFORM, MODEL_VIEW_MATRIX_UNIFORM];

/// Resource slot of a uniform: `@group(group) @binding(binding)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

/// A uniform declared by at least one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSlot {
    pub name: String,
    pub location: UniformLocation,
    pub visibility: wgpu::ShaderStages,
}

/// What a program is linked against: the color target and device limits.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct LinkTarget {
    pub max_bind_groups: u32,
    /// Scalar kind the fragment color output must have.
    pub color_kind: naga::ScalarKind,
}

impl LinkTarget {
    pub fn new(format: wgpu::TextureFormat, limits: &wgpu::Limits) -> Self {
        let color_kind = match format.sample_type(None, None) {
            Some(wgpu::TextureSampleType::Uint) => naga::ScalarKind::Uint,
            Some(wgpu::TextureSampleType::Sint) => naga::ScalarKind::Sint,
            _ => naga::ScalarKind::Float,
        };
        Self {
            max_bind_groups: limits.max_bind_groups,
            color_kind,
        }
    }
}

impl Default for LinkTarget {
    /// An sRGB surface on a device with default limits.
    fn default() -> Self {
        Self::new(wgpu::TextureFormat::Bgra8UnormSrgb, &wgpu::Limits::default())
    }
}

/// Everything the pipeline and renderer need to know about a linked program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInterface {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Shader location of `aVertexPosition`.
    pub vertex_position: u32,
    /// Sorted by location.
    pub uniforms: Vec<UniformSlot>,
}

impl ProgramInterface {
    pub fn uniform(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.location)
    }

    /// Number of bind groups the pipeline layout needs (`max group + 1`).
    pub fn group_count(&self) -> u32 {
        self.uniforms
            .iter()
            .map(|u| u.location.group + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn uniforms_in_group(&self, group: u32) -> impl Iterator<Item = &UniformSlot> {
        self.uniforms.iter().filter(move |u| u.location.group == group)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum IoBinding {
    Location(u32),
    BuiltIn(naga::BuiltIn),
}

#[derive(Debug, Clone)]
struct Io {
    name: Option<String>,
    binding: IoBinding,
    ty: naga::TypeInner,
}

/// Flattens an argument or result into its bound members.
fn collect_io(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<Io>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(Io {
            name: name.map(str::to_string),
            binding: IoBinding::Location(*location),
            ty: inner.clone(),
        }),
        Some(naga::Binding::BuiltIn(b)) => out.push(Io {
            name: name.map(str::to_string),
            binding: IoBinding::BuiltIn(*b),
            ty: inner.clone(),
        }),
        None => {
            if let naga::TypeInner::Struct { members, .. } = inner {
                for m in members {
                    collect_io(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn entry<'m>(module: &'m naga::Module, name: &str) -> Option<&'m naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.name == name)
}

fn inputs(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<Io> {
    let mut out = Vec::new();
    for arg in &ep.function.arguments {
        collect_io(module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

fn outputs(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<Io> {
    let mut out = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_io(module, None, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

fn is_vec2_f32(ty: &naga::TypeInner) -> bool {
    matches!(
        ty,
        naga::TypeInner::Vector {
            size: naga::VectorSize::Bi,
            scalar,
        } if *scalar == naga::Scalar::F32
    )
}

fn scalar_kind(ty: &naga::TypeInner) -> Option<naga::ScalarKind> {
    match ty {
        naga::TypeInner::Scalar(scalar) | naga::TypeInner::Vector { scalar, .. } => {
            Some(scalar.kind)
        }
        _ => None,
    }
}

fn is_mat4_f32(ty: &naga::TypeInner) -> bool {
    matches!(
        ty,
        naga::TypeInner::Matrix {
            columns: naga::VectorSize::Quad,
            rows: naga::VectorSize::Quad,
            scalar,
        } if *scalar == naga::Scalar::F32
    )
}

/// Resolves the interface between a vertex and a fragment stage.
pub(crate) fn resolve_interface(
    vertex: &naga::Module,
    vertex_entry: &str,
    fragment: &naga::Module,
    fragment_entry: &str,
    target: &LinkTarget,
) -> Result<ProgramInterface, LinkError> {
    let (Some(vs), Some(fs)) = (entry(vertex, vertex_entry), entry(fragment, fragment_entry)) else {
        return Err(LinkError::new("entry point missing from compiled stage"));
    };

    let mut problems = Vec::new();

    // ── vertex inputs ─────────────────────────────────────────────────────

    let mut vertex_position = None;
    for io in inputs(vertex, vs) {
        let IoBinding::Location(location) = io.binding else { continue };
        match io.name.as_deref() {
            Some(VERTEX_POSITION_ATTRIBUTE) if is_vec2_f32(&io.ty) => {
                vertex_position = Some(location)
            }
            Some(VERTEX_POSITION_ATTRIBUTE) => problems.push(format!(
                "attribute `{VERTEX_POSITION_ATTRIBUTE}` must be vec2<f32>"
            )),
            other => problems.push(format!(
                "vertex input `{}` at location {location} is not fed by any buffer",
                other.unwrap_or("<unnamed>")
            )),
        }
    }
    let position_reported = problems
        .iter()
        .any(|p| p.contains(VERTEX_POSITION_ATTRIBUTE));
    if vertex_position.is_none() && !position_reported {
        problems.push(format!(
            "vertex stage does not declare attribute `{VERTEX_POSITION_ATTRIBUTE}`"
        ));
    }

    // ── stage interface ───────────────────────────────────────────────────

    let vs_out = outputs(vertex, vs);
    if !vs_out
        .iter()
        .any(|io| matches!(io.binding, IoBinding::BuiltIn(naga::BuiltIn::Position { .. })))
    {
        problems.push("vertex stage does not write @builtin(position)".to_string());
    }

    let varyings: BTreeMap<u32, &naga::TypeInner> = vs_out
        .iter()
        .filter_map(|io| match io.binding {
            IoBinding::Location(l) => Some((l, &io.ty)),
            IoBinding::BuiltIn(_) => None,
        })
        .collect();

    for io in inputs(fragment, fs) {
        let IoBinding::Location(location) = io.binding else { continue };
        match varyings.get(&location) {
            Some(ty) if **ty == io.ty => {}
            Some(_) => problems.push(format!(
                "fragment input at location {location} does not match the vertex output type"
            )),
            None => problems.push(format!(
                "fragment input at location {location} is not written by the vertex stage"
            )),
        }
    }

    let mut writes_color = false;
    for io in outputs(fragment, fs) {
        match io.binding {
            IoBinding::Location(0) => {
                writes_color = true;
                if scalar_kind(&io.ty) != Some(target.color_kind) {
                    problems.push(format!(
                        "fragment output at location 0 must be {:?}, matching the color target",
                        target.color_kind
                    ));
                }
            }
            IoBinding::Location(location) => problems.push(format!(
                "fragment output at location {location} has no color target"
            )),
            IoBinding::BuiltIn(_) => {}
        }
    }
    if !writes_color {
        problems.push("fragment stage does not write a color to @location(0)".to_string());
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    let mut uniforms: Vec<UniformSlot> = Vec::new();
    let stages = [
        (vertex, wgpu::ShaderStages::VERTEX),
        (fragment, wgpu::ShaderStages::FRAGMENT),
    ];
    for (module, stage) in stages {
        for (_, var) in module.global_variables.iter() {
            let Some(rb) = &var.binding else { continue };
            let name = var.name.as_deref().unwrap_or("<unnamed>");
            let location = UniformLocation {
                group: rb.group,
                binding: rb.binding,
            };

            let is_uniform = matches!(var.space, naga::AddressSpace::Uniform);
            if !is_uniform || !KNOWN_UNIFORMS.contains(&name) {
                problems.push(format!(
                    "unsupported resource `{name}` at group {} binding {}",
                    location.group, location.binding
                ));
                continue;
            }
            if location.group >= target.max_bind_groups {
                problems.push(format!(
                    "uniform `{name}` uses group {}, but the device allows {} bind group(s)",
                    location.group, target.max_bind_groups
                ));
                continue;
            }
            if !is_mat4_f32(&module.types[var.ty].inner) {
                problems.push(format!("uniform `{name}` must be mat4x4<f32>"));
                continue;
            }

            if let Some(existing) = uniforms.iter_mut().find(|u| u.name == name) {
                if existing.location == location {
                    existing.visibility |= stage;
                } else {
                    problems.push(format!("uniform `{name}` is bound differently in each stage"));
                }
            } else if let Some(other) = uniforms.iter().find(|u| u.location == location) {
                problems.push(format!(
                    "uniforms `{}` and `{name}` share group {} binding {}",
                    other.name, location.group, location.binding
                ));
            } else {
                uniforms.push(UniformSlot {
                    name: name.to_string(),
                    location,
                    visibility: stage,
                });
            }
        }
    }
    uniforms.sort_by_key(|u| u.location);

    match vertex_position {
        Some(vertex_position) if problems.is_empty() => Ok(ProgramInterface {
            vertex_entry: vertex_entry.to_string(),
            fragment_entry: fragment_entry.to_string(),
            vertex_position,
            uniforms,
        }),
        _ => Err(LinkError::new(problems.join("\n"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::stage::{ShaderKind, validate_stage};

    const VERTEX: &str = "
        @group(0) @binding(0) var<uniform> uProjectionMatrix: mat4x4<f32>;
        @group(0) @binding(1) var<uniform> uModelViewMatrix: mat4x4<f32>;

        @vertex
        fn vs(@location(0) aVertexPosition: vec2<f32>) -> @builtin(position) vec4<f32> {
            return uProjectionMatrix * uModelViewMatrix * vec4<f32>(aVertexPosition, 0.0, 1.0);
        }
    ";

    const FRAGMENT: &str = "
        @fragment
        fn fs() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 1.0, 1.0, 1.0);
        }
    ";

    fn resolve(vs_src: &str, fs_src: &str) -> Result<ProgramInterface, LinkError> {
        resolve_for(vs_src, fs_src, LinkTarget::default())
    }

    // ── attribute ─────────────────────────────────────────────────────────

    #[test]
    fn resolves_attribute_and_uniforms() {
        let iface = resolve(VERTEX, FRAGMENT).unwrap();
        assert_eq!(iface.vertex_position, 0);
        assert_eq!(iface.vertex_entry, "vs");
        assert_eq!(iface.fragment_entry, "fs");
        assert_eq!(
            iface.uniform(PROJECTION_MATRIX_UNIFORM),
            Some(UniformLocation { group: 0, binding: 0 })
        );
        assert_eq!(
            iface.uniform(MODEL_VIEW_MATRIX_UNIFORM),
            Some(UniformLocation { group: 0, binding: 1 })
        );
        assert_eq!(iface.group_count(), 1);
    }

    #[test]
    fn attribute_location_follows_declaration() {
        let vs = "
            @vertex
            fn vs(@location(3) aVertexPosition: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(aVertexPosition, 0.0, 1.0);
            }
        ";
        let iface = resolve(vs, FRAGMENT).unwrap();
        assert_eq!(iface.vertex_position, 3);
        assert!(iface.uniforms.is_empty());
        assert_eq!(iface.group_count(), 0);
    }

    #[test]
    fn attribute_inside_struct_is_found() {
        let vs = "
            struct In { @location(1) aVertexPosition: vec2<f32> };
            @vertex
            fn vs(v: In) -> @builtin(position) vec4<f32> {
                return vec4<f32>(v.aVertexPosition, 0.0, 1.0);
            }
        ";
        assert_eq!(resolve(vs, FRAGMENT).unwrap().vertex_position, 1);
    }

    #[test]
    fn missing_attribute_fails_link() {
        let vs = "
            @vertex
            fn vs(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(pos, 0.0, 1.0);
            }
        ";
        let err = resolve(vs, FRAGMENT).unwrap_err();
        assert!(err.log.contains("`pos`"));
        assert!(err.log.contains("does not declare attribute `aVertexPosition`"));
    }

    #[test]
    fn attribute_of_wrong_type_fails_link() {
        let vs = "
            @vertex
            fn vs(@location(0) aVertexPosition: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(aVertexPosition, 1.0);
            }
        ";
        let err = resolve(vs, FRAGMENT).unwrap_err();
        assert!(err.log.contains("must be vec2<f32>"));
    }

    // ── varyings ──────────────────────────────────────────────────────────

    #[test]
    fn unmatched_fragment_input_fails_link() {
        let fs = "
            @fragment
            fn fs(@location(2) tint: vec4<f32>) -> @location(0) vec4<f32> {
                return tint;
            }
        ";
        let err = resolve(VERTEX, fs).unwrap_err();
        assert!(err.log.contains("location 2 is not written"));
    }

    #[test]
    fn matching_varying_links() {
        let vs = "
            struct Out {
                @builtin(position) pos: vec4<f32>,
                @location(0) uv: vec2<f32>,
            };
            @vertex
            fn vs(@location(0) aVertexPosition: vec2<f32>) -> Out {
                var o: Out;
                o.pos = vec4<f32>(aVertexPosition, 0.0, 1.0);
                o.uv = aVertexPosition;
                return o;
            }
        ";
        let fs = "
            @fragment
            fn fs(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(uv, 0.0, 1.0);
            }
        ";
        assert!(resolve(vs, fs).is_ok());
    }

    #[test]
    fn varying_type_mismatch_fails_link() {
        let vs = "
            struct Out {
                @builtin(position) pos: vec4<f32>,
                @location(0) uv: vec2<f32>,
            };
            @vertex
            fn vs(@location(0) aVertexPosition: vec2<f32>) -> Out {
                var o: Out;
                o.pos = vec4<f32>(aVertexPosition, 0.0, 1.0);
                o.uv = aVertexPosition;
                return o;
            }
        ";
        let fs = "
            @fragment
            fn fs(@location(0) uv: vec4<f32>) -> @location(0) vec4<f32> {
                return uv;
            }
        ";
        let err = resolve(vs, fs).unwrap_err();
        assert!(err.log.contains("does not match"));
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn uniform_shared_by_both_stages_widens_visibility() {
        let fs = "
            @group(0) @binding(1) var<uniform> uModelViewMatrix: mat4x4<f32>;
            @fragment
            fn fs() -> @location(0) vec4<f32> {
                return uModelViewMatrix[0];
            }
        ";
        let iface = resolve(VERTEX, fs).unwrap();
        let slot = iface
            .uniforms
            .iter()
            .find(|u| u.name == MODEL_VIEW_MATRIX_UNIFORM)
            .unwrap();
        assert_eq!(
            slot.visibility,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT
        );
    }

    #[test]
    fn conflicting_uniform_bindings_fail_link() {
        let fs = "
            @group(0) @binding(5) var<uniform> uModelViewMatrix: mat4x4<f32>;
            @fragment
            fn fs() -> @location(0) vec4<f32> {
                return uModelViewMatrix[0];
            }
        ";
        let err = resolve(VERTEX, fs).unwrap_err();
        assert!(err.log.contains("bound differently"));
    }

    #[test]
    fn unknown_resource_fails_link() {
        let fs = "
            @group(1) @binding(0) var<uniform> uTint: vec4<f32>;
            @fragment
            fn fs() -> @location(0) vec4<f32> {
                return uTint;
            }
        ";
        let err = resolve(VERTEX, fs).unwrap_err();
        assert!(err.log.contains("unsupported resource `uTint`"));
    }

    #[test]
    fn undeclared_uniforms_resolve_to_none() {
        let vs = "
            @group(0) @binding(0) var<uniform> uProjectionMatrix: mat4x4<f32>;
            @vertex
            fn vs(@location(0) aVertexPosition: vec2<f32>) -> @builtin(position) vec4<f32> {
                return uProjectionMatrix * vec4<f32>(aVertexPosition, 0.0, 1.0);
            }
        ";
        let iface = resolve(vs, FRAGMENT).unwrap();
        assert!(iface.uniform(PROJECTION_MATRIX_UNIFORM).is_some());
        assert_eq!(iface.uniform(MODEL_VIEW_MATRIX_UNIFORM), None);
    }

    // ── link target ───────────────────────────────────────────────────────

    fn resolve_for(
        vs_src: &str,
        fs_src: &str,
        target: LinkTarget,
    ) -> Result<ProgramInterface, LinkError> {
        let vs = validate_stage(ShaderKind::Vertex, vs_src).unwrap();
        let fs = validate_stage(ShaderKind::Fragment, fs_src).unwrap();
        resolve_interface(
            &vs.module,
            &vs.entry_point,
            &fs.module,
            &fs.entry_point,
            &target,
        )
    }

    const UINT_FRAGMENT: &str = "
        @fragment
        fn fs() -> @location(0) vec4<u32> {
            return vec4<u32>(1u, 1u, 1u, 1u);
        }
    ";

    #[test]
    fn integer_color_output_fails_against_float_target() {
        let err = resolve(VERTEX, UINT_FRAGMENT).unwrap_err();
        assert!(err.log.contains("location 0 must be Float"), "{}", err.log);
    }

    #[test]
    fn integer_color_output_links_against_integer_target() {
        let target = LinkTarget::new(wgpu::TextureFormat::Rgba8Uint, &wgpu::Limits::default());
        assert_eq!(target.color_kind, naga::ScalarKind::Uint);
        assert!(resolve_for(VERTEX, UINT_FRAGMENT, target).is_ok());
    }

    #[test]
    fn srgb_surface_formats_take_float_output() {
        for format in [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureFormat::Rgba8Unorm,
        ] {
            let target = LinkTarget::new(format, &wgpu::Limits::default());
            assert_eq!(target.color_kind, naga::ScalarKind::Float);
        }
    }

    #[test]
    fn extra_color_output_fails_link() {
        let fs = "
            struct Out {
                @location(0) color: vec4<f32>,
                @location(1) glow: vec4<f32>,
            };
            @fragment
            fn fs() -> Out {
                return Out(vec4<f32>(1.0), vec4<f32>(0.0));
            }
        ";
        let err = resolve(VERTEX, fs).unwrap_err();
        assert!(err.log.contains("location 1 has no color target"));
    }

    #[test]
    fn group_beyond_device_limit_fails_link() {
        let vs = "
            @group(4) @binding(0) var<uniform> uProjectionMatrix: mat4x4<f32>;
            @vertex
            fn vs(@location(0) aVertexPosition: vec2<f32>) -> @builtin(position) vec4<f32> {
                return uProjectionMatrix * vec4<f32>(aVertexPosition, 0.0, 1.0);
            }
        ";
        let err = resolve(vs, FRAGMENT).unwrap_err();
        assert!(err.log.contains("uses group 4"), "{}", err.log);

        let roomy = LinkTarget {
            max_bind_groups: 8,
            ..LinkTarget::default()
        };
        let iface = resolve_for(vs, FRAGMENT, roomy).unwrap();
        assert_eq!(
            iface.uniform(PROJECTION_MATRIX_UNIFORM),
            Some(UniformLocation { group: 4, binding: 0 })
        );
    }
}
