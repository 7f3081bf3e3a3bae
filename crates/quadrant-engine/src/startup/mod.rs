//! Startup sequencing.
//!
//! The order and the abort policy live here; the GPU work lives behind
//! [`Stages`]. The first failure is reported once through the notifier and
//! nothing after it runs.

mod error;
mod gpu;

pub use error::InitError;
pub use gpu::GpuStages;

use crate::device::ContextError;
use crate::notify::Notifier;
use crate::shader::{BuildError, LoadError, ShaderSource};

/// The steps of bringing up the square, in the order they run.
pub trait Stages {
    type Context;
    type Program;
    type Buffer;

    fn acquire_context(&mut self) -> Result<Self::Context, ContextError>;

    fn load_sources(&mut self) -> Result<ShaderSource, LoadError>;

    /// Compiles both stages and links them. Consumes the sources.
    fn build_program(
        &mut self,
        ctx: &Self::Context,
        source: ShaderSource,
    ) -> Result<Self::Program, BuildError>;

    fn upload_positions(&mut self, ctx: &Self::Context) -> Self::Buffer;
}

/// Everything the renderer needs once startup succeeded.
#[derive(Debug)]
pub struct Prepared<P, B> {
    pub program: P,
    pub positions: B,
}

/// Runs every stage in order; on failure notifies exactly once and stops.
pub fn initialize<S: Stages>(
    stages: &mut S,
    notifier: &mut dyn Notifier,
) -> Result<Prepared<S::Program, S::Buffer>, InitError> {
    let result = run(stages);
    match &result {
        Ok(_) => log::info!("startup complete"),
        Err(e) => notifier.notify(e.title(), &e.to_string()),
    }
    result
}

fn run<S: Stages>(stages: &mut S) -> Result<Prepared<S::Program, S::Buffer>, InitError> {
    let ctx = stages
        .acquire_context()
        .map_err(InitError::ContextUnavailable)?;
    let source = stages
        .load_sources()
        .map_err(InitError::ResourceFetchFailed)?;
    let program = stages.build_program(&ctx, source)?;
    let positions = stages.upload_positions(&ctx);

    Ok(Prepared { program, positions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{CompileError, LinkError, ShaderKind};
    use std::path::PathBuf;

    #[derive(Default)]
    struct Recorder {
        messages: Vec<(String, String)>,
    }

    impl Notifier for Recorder {
        fn notify(&mut self, title: &str, message: &str) {
            self.messages.push((title.to_string(), message.to_string()));
        }
    }

    #[derive(Default)]
    struct Script {
        fail_context: bool,
        fail_load: bool,
        fail_build: Option<BuildError>,
        calls: Vec<&'static str>,
    }

    impl Stages for Script {
        type Context = ();
        type Program = &'static str;
        type Buffer = [f32; 8];

        fn acquire_context(&mut self) -> Result<(), ContextError> {
            self.calls.push("acquire");
            if self.fail_context {
                Err(ContextError::NotAccelerated {
                    adapter: "llvmpipe".into(),
                })
            } else {
                Ok(())
            }
        }

        fn load_sources(&mut self) -> Result<ShaderSource, LoadError> {
            self.calls.push("load");
            if self.fail_load {
                Err(LoadError {
                    path: PathBuf::from("shaders/missing.wgsl"),
                    reason: "not found".into(),
                })
            } else {
                Ok(ShaderSource::new("vs", "fs"))
            }
        }

        fn build_program(&mut self, _: &(), _: ShaderSource) -> Result<&'static str, BuildError> {
            self.calls.push("build");
            match self.fail_build.take() {
                Some(e) => Err(e),
                None => Ok("program"),
            }
        }

        fn upload_positions(&mut self, _: &()) -> [f32; 8] {
            self.calls.push("upload");
            crate::geometry::SQUARE_POSITIONS
        }
    }

    #[test]
    fn missing_context_stops_before_any_gpu_work() {
        let mut stages = Script {
            fail_context: true,
            ..Default::default()
        };
        let mut notifier = Recorder::default();

        let err = initialize(&mut stages, &mut notifier).unwrap_err();

        assert!(matches!(err, InitError::ContextUnavailable(_)));
        assert_eq!(stages.calls, ["acquire"]);
        assert_eq!(notifier.messages.len(), 1);
        assert!(notifier.messages[0].1.contains("llvmpipe"));
    }

    #[test]
    fn unreadable_source_is_reported() {
        let mut stages = Script {
            fail_load: true,
            ..Default::default()
        };
        let mut notifier = Recorder::default();

        let err = initialize(&mut stages, &mut notifier).unwrap_err();

        assert!(matches!(err, InitError::ResourceFetchFailed(_)));
        assert_eq!(stages.calls, ["acquire", "load"]);
        assert_eq!(notifier.messages.len(), 1);
        assert!(notifier.messages[0].1.contains("missing.wgsl"));
    }

    #[test]
    fn compile_failure_skips_upload() {
        let mut stages = Script {
            fail_build: Some(BuildError::Compile(CompileError::new(
                ShaderKind::Fragment,
                "error: expected `)`",
            ))),
            ..Default::default()
        };
        let mut notifier = Recorder::default();

        let err = initialize(&mut stages, &mut notifier).unwrap_err();

        assert!(matches!(err, InitError::ShaderCompileFailed(_)));
        assert_eq!(stages.calls, ["acquire", "load", "build"]);
        assert_eq!(notifier.messages.len(), 1);
        assert!(notifier.messages[0].1.contains("fragment"));
        assert!(notifier.messages[0].1.contains("expected `)`"));
    }

    #[test]
    fn link_failure_is_its_own_kind() {
        let mut stages = Script {
            fail_build: Some(BuildError::Link(LinkError::new("no @location(0) output"))),
            ..Default::default()
        };
        let mut notifier = Recorder::default();

        let err = initialize(&mut stages, &mut notifier).unwrap_err();

        assert!(matches!(err, InitError::ProgramLinkFailed(_)));
        assert_eq!(notifier.messages.len(), 1);
    }

    #[test]
    fn success_runs_everything_silently() {
        let mut stages = Script::default();
        let mut notifier = Recorder::default();

        let prepared = initialize(&mut stages, &mut notifier).unwrap();

        assert_eq!(prepared.program, "program");
        assert_eq!(prepared.positions, [1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0]);
        assert_eq!(stages.calls, ["acquire", "load", "build", "upload"]);
        assert!(notifier.messages.is_empty());
    }
}
