use crate::device::{ContextError, Gpu};
use crate::geometry::PositionBuffer;
use crate::render::RenderCtx;
use crate::shader::{self, BuildError, LoadError, ProgramInfo, ShaderPaths, ShaderSource};

use super::Stages;

/// [`Stages`] backed by a window's GPU context.
pub struct GpuStages<'a, 'w> {
    gpu: Result<&'a Gpu<'w>, &'a ContextError>,
    paths: &'a ShaderPaths,
}

impl<'a, 'w> GpuStages<'a, 'w> {
    /// `gpu` is the outcome of acquiring the window's context.
    pub fn new(gpu: Result<&'a Gpu<'w>, &'a ContextError>, paths: &'a ShaderPaths) -> Self {
        Self { gpu, paths }
    }
}

impl<'a, 'w> Stages for GpuStages<'a, 'w> {
    type Context = RenderCtx<'a>;
    type Program = ProgramInfo;
    type Buffer = PositionBuffer;

    fn acquire_context(&mut self) -> Result<RenderCtx<'a>, ContextError> {
        match self.gpu {
            Ok(gpu) => Ok(gpu.render_ctx()),
            Err(e) => Err(e.clone()),
        }
    }

    fn load_sources(&mut self) -> Result<ShaderSource, LoadError> {
        log::debug!(
            "loading shaders from `{}` and `{}`",
            self.paths.vertex.display(),
            self.paths.fragment.display()
        );
        ShaderSource::load(self.paths)
    }

    fn build_program(
        &mut self,
        ctx: &RenderCtx<'a>,
        source: ShaderSource,
    ) -> Result<ProgramInfo, BuildError> {
        shader::build_program(ctx, &source)
    }

    fn upload_positions(&mut self, ctx: &RenderCtx<'a>) -> PositionBuffer {
        PositionBuffer::new(ctx)
    }
}
