use quadrant_engine::core::{App, AppControl, FrameCtx, StartCtx};
use quadrant_engine::geometry::PositionBuffer;
use quadrant_engine::lifecycle::Teardown;
use quadrant_engine::notify::Notifier;
use quadrant_engine::paint::Color;
use quadrant_engine::render::{FrameRenderer, Transforms};
use quadrant_engine::shader::{ProgramInfo, ShaderPaths};
use quadrant_engine::startup::{self, GpuStages, InitError};

/// Draws the square described by the configured shaders on a cleared background.
pub struct SquareApp<N: Notifier> {
    paths: ShaderPaths,
    notifier: N,
    renderer: FrameRenderer,
    program: Teardown<ProgramInfo>,
    positions: Option<PositionBuffer>,
    outcome: Option<Result<(), InitError>>,
}

impl<N: Notifier> SquareApp<N> {
    pub fn new(paths: ShaderPaths, background: Color, notifier: N) -> Self {
        Self {
            paths,
            notifier,
            renderer: FrameRenderer::new(background),
            program: Teardown::new(),
            positions: None,
            outcome: None,
        }
    }

    /// `None` until startup ran.
    pub fn outcome(&self) -> Option<&Result<(), InitError>> {
        self.outcome.as_ref()
    }

    pub fn draws_issued(&self) -> u32 {
        self.renderer.draws_issued()
    }
}

impl<N: Notifier> App for SquareApp<N> {
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> AppControl {
        log::info!("initializing on `{}`", ctx.window.title());

        let mut stages = GpuStages::new(ctx.gpu, &self.paths);
        match startup::initialize(&mut stages, &mut self.notifier) {
            Ok(prepared) => {
                self.program.register(prepared.program);
                self.positions = Some(prepared.positions);
                self.outcome = Some(Ok(()));
                AppControl::Continue
            }
            Err(e) => {
                self.outcome = Some(Err(e));
                AppControl::Exit
            }
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let (Some(info), Some(positions)) = (self.program.get(), self.positions.as_ref()) else {
            return AppControl::Continue;
        };

        let transforms = Transforms::perspective(ctx.gpu.render_ctx().aspect());

        let renderer = &mut self.renderer;
        ctx.present(|rctx, target| {
            renderer.render(rctx, target, info, positions, &transforms)
        })
    }

    fn on_teardown(&mut self) {
        if self.program.fire() {
            log::info!("shader program released on teardown");
        }
    }
}
