use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    frontend::{app::RunsFocus, App, AppMode},
    navigation::normalize_test_name,
};

use super::filter_options;

pub fn on_key(app: &mut App, key: KeyEvent) {
    // `Ctrl-r` reloads the runs
    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return app.load_runs();
    }

    match key.code {
        KeyCode::Char('q') => app.change_mode(AppMode::Quit),
        KeyCode::Tab => {
            app.runs_focus = match app.runs_focus {
                RunsFocus::Table => RunsFocus::Filters,
                RunsFocus::Filters => RunsFocus::Table,
            };
        }
        KeyCode::Esc => app.dismiss_notification(),
        KeyCode::Char('t') => app.next_timeframe(),
        KeyCode::Char('r') => app.run_selected(),
        _ => match app.runs_focus {
            RunsFocus::Table => on_table_key(app, key),
            RunsFocus::Filters => on_filter_key(app, key),
        },
    }
}

fn on_table_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.runs_table.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => {
            app.runs_table.select_next();
            app.clamp_runs_table();
        }
        KeyCode::Char(' ') => {
            if let Some(run) = app.highlighted_run() {
                let (run_id, file_path) = (run.run_id.clone(), run.file_path.clone());
                app.registry.toggle_select(&run_id, &file_path);
            }
        }
        KeyCode::Char('a') => {
            let visible = app.registry.derived_view().len();
            let all_selected = visible > 0 && app.registry.selection().len() == visible;
            app.registry.select_all(!all_selected);
        }
        KeyCode::Enter => {
            if let Some(run) = app.highlighted_run() {
                let target = normalize_test_name(&run.file_path, &app.file_extension);
                app.open_session(target);
            }
        }
        _ => (),
    }
}

fn on_filter_key(app: &mut App, key: KeyEvent) {
    let options = filter_options(&app.registry);

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.filter_cursor = app.filter_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.filter_cursor = (app.filter_cursor + 1).min(options.len().saturating_sub(1));
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some((dimension, value)) = options.get(app.filter_cursor) {
                let included = !app.registry.filters().is_included(*dimension, value);
                app.registry.set_filter(*dimension, value, included);
                app.clamp_runs_table();
            }
        }
        KeyCode::Char('c') => {
            app.registry.clear_filters();
            app.clamp_runs_table();
        }
        _ => (),
    }
}
