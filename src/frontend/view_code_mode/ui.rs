use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Tabs};

use crate::{
    frontend::App,
    session::{ActiveView, LoadingPhase, Session},
};

pub fn ui(f: &mut ratatui::Frame, area: Rect, app: &mut App) {
    let Some(session) = &app.session else {
        Paragraph::new("No test opened. Pick a run in [F1] Test runs and press Enter.")
            .centered()
            .block(Block::default().borders(Borders::ALL).padding(Padding::top(1)))
            .render(area, f.buffer_mut());
        return;
    };

    let [header_area, content_area, input_area, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(f, session, header_area);
    render_content(f, session, app.code_scroll, content_area);

    let block = Block::default()
        .title(" Request ")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1));

    let busy = busy_label(session.loading_phase());
    app.text_input.set_block(block);

    if let Some(label) = busy {
        let [text_area, throbber_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(24)]).areas(input_area);
        let throbber = throbber_widgets_tui::Throbber::default().label(label);

        f.render_widget(&app.text_input, text_area);
        f.render_widget(throbber, throbber_area.inner(Margin::new(1, 1)));
    } else {
        f.render_widget(&app.text_input, input_area);
    }

    Paragraph::new("^Enter: Submit edit | ^Shift-Enter: Execute | Tab: Code/Logs | ^r: Reload | Esc: Back")
        .style(Style::default().fg(Color::Gray))
        .centered()
        .render(help_area, f.buffer_mut());
}

fn busy_label(phase: LoadingPhase) -> Option<&'static str> {
    match phase {
        LoadingPhase::Idle => None,
        LoadingPhase::FetchingSource => Some("Fetching source ..."),
        LoadingPhase::SubmittingEdit => Some("Rewriting code ..."),
        LoadingPhase::Executing => Some("Executing ..."),
    }
}

fn render_header(f: &mut ratatui::Frame, session: &Session, area: Rect) {
    let [file_area, tabs_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(16)]).areas(area);

    Line::from(vec![
        Span::from(" "),
        Span::from(session.target_file()).bold(),
    ])
    .render(file_area, f.buffer_mut());

    let selected = match session.active_view() {
        ActiveView::Code => 0,
        ActiveView::Logs => 1,
    };
    Tabs::new(["Code", "Logs"])
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .render(tabs_area, f.buffer_mut());
}

fn render_content(f: &mut ratatui::Frame, session: &Session, scroll: u16, area: Rect) {
    let (title, text) = match session.active_view() {
        ActiveView::Code => (" Code ", Text::from(session.source_text())),
        ActiveView::Logs => {
            let output = session.execution_output();
            let mut lines = output.stdout.lines().map(Line::from).collect::<Vec<_>>();
            lines.extend(
                output
                    .stderr
                    .lines()
                    .map(|line| Line::from(line).style(Style::default().fg(Color::Red))),
            );
            if lines.is_empty() {
                lines.push(Line::from("No output yet, execute with ^Shift-Enter").italic());
            }
            (" Output ", Text::from(lines))
        }
    };

    Paragraph::new(text)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .padding(Padding::horizontal(1)),
        )
        .scroll((scroll, 0))
        .render(area, f.buffer_mut());
}
