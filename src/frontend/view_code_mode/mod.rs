//! Edit and execute a single test file
mod on_key;
mod ui;

pub use on_key::{confirm_action, on_key};
pub use ui::ui;
