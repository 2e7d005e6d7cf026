#[cfg(test)]
mod tests;

mod app;
mod app_command_responder;
mod ui;
mod ui_event;

/// Different frontend ui modes
mod logs_mode;
mod test_runs_mode;
mod view_code_mode;

// Only the app and its events are needed to drive the frontend
pub use app::{App, AppMode};
pub use ui_event::UIEvent;
