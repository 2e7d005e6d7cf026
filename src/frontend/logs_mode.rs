//! The log tab, backed by the tui-logger layer installed in `runboard_tracing`
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerSmartWidget, TuiWidgetEvent};

use super::{App, AppMode};

/// Keys shown in the help line, in the order they are listed
const HELP: [(&str, &str); 6] = [
    ("q", "quit"),
    ("↑/↓", "target"),
    ("←/→", "shown level"),
    ("+/-", "captured level"),
    ("f", "focus target"),
    ("PgUp/PgDn", "scroll"),
];

fn widget_event(code: KeyCode) -> Option<TuiWidgetEvent> {
    let event = match code {
        KeyCode::Char(' ') => TuiWidgetEvent::SpaceKey,
        KeyCode::Esc => TuiWidgetEvent::EscapeKey,
        KeyCode::PageUp => TuiWidgetEvent::PrevPageKey,
        KeyCode::PageDown => TuiWidgetEvent::NextPageKey,
        KeyCode::Up => TuiWidgetEvent::UpKey,
        KeyCode::Down => TuiWidgetEvent::DownKey,
        KeyCode::Left => TuiWidgetEvent::LeftKey,
        KeyCode::Right => TuiWidgetEvent::RightKey,
        KeyCode::Char('+') => TuiWidgetEvent::PlusKey,
        KeyCode::Char('-') => TuiWidgetEvent::MinusKey,
        KeyCode::Char('h') => TuiWidgetEvent::HideKey,
        KeyCode::Char('f') => TuiWidgetEvent::FocusKey,
        _ => return None,
    };

    Some(event)
}

pub fn on_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.change_mode(AppMode::Quit),
        KeyCode::Esc if app.notification.is_some() => app.dismiss_notification(),
        code => {
            if let Some(event) = widget_event(code) {
                app.log_state.transition(event);
            }
        }
    }
}

pub fn ui(f: &mut ratatui::Frame, area: Rect, app: &mut App) {
    let [logs_area, help_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    TuiLoggerSmartWidget::default()
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Green))
        .style_trace(Style::default().fg(Color::Magenta))
        .output_separator(' ')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(true)
        .output_file(false)
        .output_line(false)
        .title_log("Logs")
        .title_target("Targets")
        .state(&app.log_state)
        .render(logs_area, f.buffer_mut());

    let spans = HELP
        .iter()
        .enumerate()
        .flat_map(|(index, (key, action))| {
            let separator = if index == 0 { "" } else { " | " };
            [
                Span::from(separator),
                Span::from(*key).bold(),
                Span::from(format!(" {action}")),
            ]
        })
        .collect::<Vec<_>>();

    Line::from(spans)
        .style(Style::default().fg(Color::Gray))
        .centered()
        .render(help_area, f.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_keys() {
        assert!(matches!(
            widget_event(KeyCode::PageUp),
            Some(TuiWidgetEvent::PrevPageKey)
        ));
        assert!(matches!(
            widget_event(KeyCode::Char('+')),
            Some(TuiWidgetEvent::PlusKey)
        ));
        assert!(widget_event(KeyCode::Enter).is_none());
    }

    #[test]
    fn test_esc_dismisses_notification_first() {
        let mut app = App::default();
        app.change_mode(AppMode::Logs);
        app.notify_error("boom");

        on_key(&mut app, KeyEvent::from(KeyCode::Esc));

        assert!(app.notification.is_none());
        assert_eq!(app.mode, AppMode::Logs);
    }

    #[test]
    fn test_q_quits() {
        let mut app = App::default();

        on_key(&mut app, KeyEvent::from(KeyCode::Char('q')));

        assert_eq!(app.mode, AppMode::Quit);
    }
}
