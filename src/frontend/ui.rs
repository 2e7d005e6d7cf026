use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Tabs};

use super::app::App;

/// Renders the mode tabs, the active mode and the latest notification
pub fn ui(f: &mut ratatui::Frame, app: &mut App) {
    let [tabs_area, main_area, notification_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(f.area());

    let tabs = Tabs::new(app.tab_names.clone())
        .select(app.mode.tab_index().unwrap_or_default())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|");
    f.render_widget(tabs, tabs_area);

    app.mode.ui(f, main_area, app);

    if let Some(notification) = &app.notification {
        let style = if notification.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        let hint = if notification.is_error { " (Esc to dismiss)" } else { "" };

        Paragraph::new(format!("{}{hint}", notification.message))
            .style(style)
            .render(notification_area, f.buffer_mut());
    }
}
