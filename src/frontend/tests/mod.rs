mod app;

use ratatui::{backend::TestBackend, Terminal};
use tokio::sync::mpsc;

use crate::{commands::CommandEvent, frontend::App};

/// An app with a fake backend, returns the receiving end of its commands
fn app_with_backend() -> (App<'static>, mpsc::UnboundedReceiver<CommandEvent>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let mut app = App::default();
    app.command_tx = Some(command_tx);

    (app, command_rx)
}

fn render_to_string(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
    terminal
        .draw(|f| crate::frontend::ui::ui(f, app))
        .unwrap();

    terminal.backend().to_string()
}
