use ratatui::prelude::*;
use ratatui::widgets::{
    Block, Borders, HighlightSpacing, List, ListItem, ListState, Padding, Paragraph, Row, Table,
};

use crate::{
    frontend::{app::RunsFocus, App},
    runs::{RunStatus, TestRun},
};

use super::filter_options;

pub fn ui(f: &mut ratatui::Frame, area: Rect, app: &mut App) {
    let [stats_area, main_area, help_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [table_area, filter_area] =
        Layout::horizontal([Constraint::Percentage(75), Constraint::Percentage(25)])
            .areas(main_area);

    render_stats(f, app, stats_area);
    render_runs_table(f, app, table_area);
    render_filters(f, app, filter_area);

    Paragraph::new(
        "Space: Select | a: Select all | r: Re-run selected | Enter: View code | t: Timeframe | \
         ^r: Reload | Tab: Filters",
    )
    .style(Style::default().fg(Color::Gray))
    .centered()
    .render(help_area, f.buffer_mut());
}

fn status_color(status: &RunStatus) -> Color {
    match status {
        RunStatus::Failed => Color::Red,
        RunStatus::Passed => Color::Green,
        RunStatus::Untested => Color::Gray,
        RunStatus::Other(_) => Color::Yellow,
    }
}

fn render_stats(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let stats = app.registry.stats();
    let cards = [
        ("Total", stats.total, Color::White),
        ("Passed", stats.passed, Color::Green),
        ("Failed", stats.failed, Color::Red),
        ("Untested", stats.untested, Color::Gray),
    ];

    let areas = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
    for ((title, count, color), area) in cards.into_iter().zip(areas.iter()) {
        Paragraph::new(Span::from(count.to_string()).bold())
            .centered()
            .style(Style::default().fg(color))
            .block(Block::default().title(title).borders(Borders::ALL))
            .render(*area, f.buffer_mut());
    }
}

fn run_row<'a>(run: &'a TestRun, selected: bool) -> Row<'a> {
    let checkbox = if selected { "[x]" } else { "[ ]" };

    Row::new(vec![
        Line::from(checkbox),
        Line::from(run.run_id.as_str()),
        Line::from(run.file_path.as_str()),
        Line::from(run.team.as_str()),
        Line::from(run.test_type.as_str()),
        Line::from(run.status.as_str()).style(Style::default().fg(status_color(&run.status))),
        Line::from(run.timeframe.as_str()),
    ])
}

fn render_runs_table(f: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let mut title = format!(" Runs ({}) ", app.timeframe);
    if app.is_loading_runs() {
        title.push_str("loading ... ");
    } else if app.registry.is_running() {
        title.push_str("re-running ... ");
    }
    let selected = app.registry.selection().len();
    if selected > 0 {
        title.push_str(&format!("{selected} selected "));
    }

    let border_style = if app.runs_focus == RunsFocus::Table {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let registry = &app.registry;
    let runs = registry.derived_view();

    if runs.is_empty() {
        let message = if registry.is_loaded() {
            "No runs match"
        } else {
            "Loading runs ..."
        };
        Paragraph::new(message)
            .centered()
            .block(block.padding(Padding::top(1)))
            .render(area, f.buffer_mut());
        return;
    }

    let rows = runs
        .iter()
        .map(|run| run_row(run, registry.is_selected(&run.run_id)))
        .collect::<Vec<_>>();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Fill(3),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(9),
            Constraint::Length(20),
        ],
    )
    .header(
        Row::new(vec!["", "Run", "File", "Team", "Type", "Status", "When"])
            .style(Style::default().bold()),
    )
    .block(block)
    .row_highlight_style(Style::default().fg(Color::Yellow).bg(Color::DarkGray))
    .highlight_spacing(HighlightSpacing::Always);

    f.render_stateful_widget(table, area, &mut app.runs_table);
}

fn render_filters(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let filters = app.registry.filters();
    let items = filter_options(&app.registry)
        .into_iter()
        .map(|(dimension, value)| {
            let checkbox = if filters.is_included(dimension, &value) {
                "[x]"
            } else {
                "[ ]"
            };
            ListItem::new(format!("{checkbox} {dimension}: {value}"))
        })
        .collect::<Vec<_>>();

    let focused = app.runs_focus == RunsFocus::Filters;
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .highlight_style(Style::default().fg(Color::Yellow).bg(Color::DarkGray))
        .highlight_spacing(HighlightSpacing::Always)
        .block(
            Block::default()
                .title(" Filters (c: clear) ")
                .borders(Borders::ALL)
                .border_style(border_style),
        );

    let mut state = ListState::default().with_selected(focused.then_some(app.filter_cursor));
    f.render_stateful_widget(list, area, &mut state);
}
