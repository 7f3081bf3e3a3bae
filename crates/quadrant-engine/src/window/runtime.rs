use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, StartCtx, WindowCtx};
use crate::device::{ContextError, Gpu, GpuInit};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Window title; also the name the drawing surface is known by.
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "glcanvas".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, drives `app` until the window closes, and hands the app back.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<A>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        // Teardown normally fires on close; make sure it fired however the loop ended.
        state.teardown();

        match state.failure {
            Some(e) => Err(e),
            None => Ok(state.app),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: std::result::Result<Gpu<'this>, ContextError>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    torn_down: bool,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            torn_down: false,
            failure: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowId> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .build();

        if let Err(e) = entry.borrow_gpu() {
            log::error!("no rendering context for `{}`: {e}", self.config.title);
        }

        self.window = Some(entry);
        Ok(id)
    }

    /// Runs the app's teardown once, before the window and context drop.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.app.on_teardown();
    }

    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        self.teardown();
        self.window = None;
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.torn_down {
            return;
        }

        let id = match self.create_window_entry(event_loop) {
            Ok(id) => id,
            Err(e) => {
                log::error!("failed to create window: {e:#}");
                self.failure = Some(e);
                event_loop.exit();
                return;
            }
        };

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, window) = (&mut self.app, &self.window);
        let Some(entry) = window else { return };

        let control = entry.with(|fields| {
            let mut ctx = StartCtx {
                window: WindowCtx {
                    id,
                    window: fields.window,
                },
                gpu: fields.gpu.as_ref(),
            };
            app.on_start(&mut ctx)
        });

        if control == AppControl::Exit {
            self.shut_down(event_loop);
            return;
        }

        // The single frame; later redraws come only from the host.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.shut_down(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested");
                self.shut_down(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| {
                        if let Ok(gpu) = gpu {
                            gpu.resize(*new_size);
                        }
                    });
                }
            }

            WindowEvent::RedrawRequested => {
                let (app, window) = (&mut self.app, &mut self.window);
                let Some(entry) = window.as_mut() else { return };

                let control = entry.with_mut(|fields| {
                    let Ok(gpu) = fields.gpu.as_mut() else {
                        return AppControl::Continue;
                    };
                    let mut ctx = FrameCtx {
                        window: WindowCtx {
                            id: window_id,
                            window: fields.window,
                        },
                        gpu,
                    };
                    app.on_frame(&mut ctx)
                });

                if control == AppControl::Exit {
                    self.shut_down(event_loop);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}
