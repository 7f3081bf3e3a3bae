mod config;
mod square;

use anyhow::Context;
use quadrant_engine::logging::init_logging;
use quadrant_engine::notify::DialogNotifier;
use quadrant_engine::window::Runtime;

use config::SquareConfig;
use square::SquareApp;

fn main() -> anyhow::Result<()> {
    let config = SquareConfig::default();
    init_logging(config.logging.clone());

    log::info!(
        "quadrant starting (vertex `{}`, fragment `{}`)",
        config.shader_paths.vertex.display(),
        config.shader_paths.fragment.display()
    );

    let app = SquareApp::new(config.shader_paths, config.background, DialogNotifier);
    let app = Runtime::run(config.runtime, config.gpu, app)?;

    match app.outcome() {
        Some(Err(e)) => Err(e.clone()).context("initialization failed"),
        Some(Ok(())) => {
            log::info!("closed after {} draw(s)", app.draws_issued());
            Ok(())
        }
        None => Ok(()),
    }
}
