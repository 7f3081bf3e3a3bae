use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::{FrameCtx, StartCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// Call order: `on_start` once, `on_frame` for each host redraw, then
/// `on_teardown` once when the window is about to go away.
pub trait App {
    /// Called once after the window exists, with the outcome of acquiring
    /// its rendering context.
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> AppControl;

    /// Called when the host asks for the window contents.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called before the window and its context are dropped.
    fn on_teardown(&mut self) {}

    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }
}
