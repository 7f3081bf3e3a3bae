//! User-visible notifications for fatal conditions.
//!
//! A notification is blocking where the platform allows it: the call returns
//! once the user dismissed the message.

/// Something that can tell the user about a fatal condition.
pub trait Notifier {
    fn notify(&mut self, title: &str, message: &str);
}

/// Native modal error dialog (plus an error log line).
#[derive(Debug, Default)]
pub struct DialogNotifier;

impl Notifier for DialogNotifier {
    fn notify(&mut self, title: &str, message: &str) {
        log::error!("{title}: {message}");

        let _ = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

/// Logs only; for headless runs.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, title: &str, message: &str) {
        log::error!("{title}: {message}");
    }
}
