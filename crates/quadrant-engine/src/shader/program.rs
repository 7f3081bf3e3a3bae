use std::fmt;

use crate::geometry::PositionBuffer;
use crate::render::RenderCtx;

use super::ShaderSource;
use super::reflect::{
    self, LinkTarget, MODEL_VIEW_MATRIX_UNIFORM, PROJECTION_MATRIX_UNIFORM, ProgramInterface,
    UniformLocation,
};
use super::stage::{self, CompileError, Shader, ShaderKind};

/// Linking failed. `log` lists every problem found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkError {
    pub log: String,
}

impl LinkError {
    pub(crate) fn new(log: impl Into<String>) -> Self {
        Self { log: log.into() }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to link program:\n{}", self.log.trim_end())
    }
}

impl std::error::Error for LinkError {}

/// Either half of building a program from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    Compile(CompileError),
    Link(LinkError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile(e) => fmt::Display::fmt(e, f),
            Self::Link(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<CompileError> for BuildError {
    fn from(e: CompileError) -> Self {
        Self::Compile(e)
    }
}

impl From<LinkError> for BuildError {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

/// A linked program: render pipeline plus the layouts it was built against.
///
/// Only [`link`] constructs one, so holding a `ShaderProgram` means both
/// stages compiled and linking succeeded. Dropping it releases the pipeline.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    interface: ProgramInterface,
}

impl ShaderProgram {
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Layouts indexed by bind group number.
    pub fn bind_group_layouts(&self) -> &[wgpu::BindGroupLayout] {
        &self.bind_group_layouts
    }

    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("bind_groups", &self.bind_group_layouts.len())
            .field("interface", &self.interface)
            .finish_non_exhaustive()
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        log::debug!("released shader program");
    }
}

/// Links a vertex and a fragment stage into a program targeting the surface format.
///
/// Both stages are consumed: they are released when this returns, whether or
/// not linking succeeded. Anything the device rejects while building the
/// pipeline is returned in the link log.
pub fn link(
    ctx: &RenderCtx<'_>,
    vertex: Shader,
    fragment: Shader,
) -> Result<ShaderProgram, LinkError> {
    if vertex.kind() != ShaderKind::Vertex || fragment.kind() != ShaderKind::Fragment {
        return Err(LinkError::new(format!(
            "expected vertex + fragment stages, got {} + {}",
            vertex.kind(),
            fragment.kind()
        )));
    }

    let interface = reflect::resolve_interface(
        &vertex.module,
        &vertex.entry_point,
        &fragment.module,
        &fragment.entry_point,
        &LinkTarget::new(ctx.surface_format, &ctx.device.limits()),
    )?;

    let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

    let bind_group_layouts: Vec<wgpu::BindGroupLayout> = (0..interface.group_count())
        .map(|group| {
            let entries: Vec<wgpu::BindGroupLayoutEntry> = interface
                .uniforms_in_group(group)
                .map(|u| wgpu::BindGroupLayoutEntry {
                    binding: u.location.binding,
                    visibility: u.visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(MAT4_SIZE),
                    },
                    count: None,
                })
                .collect();

            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("quadrant program bgl"),
                    entries: &entries,
                })
        })
        .collect();

    let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();
    let pipeline_layout = ctx
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quadrant program layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

    let attributes = [PositionBuffer::attribute(interface.vertex_position)];

    let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("quadrant program"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &vertex.gpu,
            entry_point: Some(interface.vertex_entry.as_str()),
            compilation_options: Default::default(),
            buffers: &[PositionBuffer::layout(&attributes)],
        },

        fragment: Some(wgpu::FragmentState {
            module: &fragment.gpu,
            entry_point: Some(interface.fragment_entry.as_str()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        // Four corners in upload order form two triangles as a strip.
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    if let Some(err) = pollster::block_on(scope.pop()) {
        return Err(LinkError::new(err.to_string()));
    }

    log::info!(
        "linked program (vertex `{}`, fragment `{}`, {} uniform(s))",
        interface.vertex_entry,
        interface.fragment_entry,
        interface.uniforms.len()
    );

    Ok(ShaderProgram {
        pipeline,
        bind_group_layouts,
        interface,
    })
}

const MAT4_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// Attribute locations resolved by name after linking.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttribLocations {
    pub vertex_position: u32,
}

/// Uniform locations resolved by name after linking.
///
/// `None` when the shaders do not declare the uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformLocations {
    pub projection_matrix: Option<UniformLocation>,
    pub model_view_matrix: Option<UniformLocation>,
}

/// A linked program with its resolved attribute and uniform locations.
#[derive(Debug)]
pub struct ProgramInfo {
    pub program: ShaderProgram,
    pub attrib_locations: AttribLocations,
    pub uniform_locations: UniformLocations,
}

impl ProgramInfo {
    pub fn new(program: ShaderProgram) -> Self {
        let iface = program.interface();
        let attrib_locations = AttribLocations {
            vertex_position: iface.vertex_position,
        };
        let uniform_locations = UniformLocations {
            projection_matrix: iface.uniform(PROJECTION_MATRIX_UNIFORM),
            model_view_matrix: iface.uniform(MODEL_VIEW_MATRIX_UNIFORM),
        };

        Self {
            program,
            attrib_locations,
            uniform_locations,
        }
    }
}

/// Compiles both stages and links them.
///
/// Linking is only attempted when both stages compiled.
pub fn build_program(
    ctx: &RenderCtx<'_>,
    source: &ShaderSource,
) -> Result<ProgramInfo, BuildError> {
    let vertex = stage::compile(ctx, ShaderKind::Vertex, &source.vertex)?;
    let fragment = stage::compile(ctx, ShaderKind::Fragment, &source.fragment)?;
    let program = link(ctx, vertex, fragment)?;
    Ok(ProgramInfo::new(program))
}

/// Runs compilation and link checks without a GPU, against an sRGB surface
/// and default device limits.
pub fn check_sources(source: &ShaderSource) -> Result<ProgramInterface, BuildError> {
    let vertex = stage::validate_stage(ShaderKind::Vertex, &source.vertex)?;
    let fragment = stage::validate_stage(ShaderKind::Fragment, &source.fragment)?;
    Ok(reflect::resolve_interface(
        &vertex.module,
        &vertex.entry_point,
        &fragment.module,
        &fragment.entry_point,
        &LinkTarget::default(),
    )?)
}
