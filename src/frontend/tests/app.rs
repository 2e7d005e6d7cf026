use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::json;

use super::app_with_backend;
use crate::{
    commands::Command,
    frontend::{AppMode, UIEvent},
    gateway::{EndpointKind, GatewayError},
    runs::{RunStatus, TestRun, JUST_UPDATED},
    session::{ActiveView, ExecutionOutput, LoadingPhase, SessionAction, SessionEffect},
};

fn key(code: KeyCode) -> UIEvent {
    UIEvent::Input(KeyEvent::new(code, KeyModifiers::NONE))
}

fn runs() -> Vec<TestRun> {
    vec![
        TestRun::new("1", "tests/login.py", "Passed", "2024-01-01").with_team("Core"),
        TestRun::new("2", "tests/checkout.py::test_total", "Failed", "2024-01-02")
            .with_team("Growth"),
        TestRun::new("3", "tests/search.py", "Untested", "2024-01-03").with_team("Core"),
    ]
}

#[test_log::test]
fn test_open_session_fetches_the_source() {
    let (mut app, mut commands) = app_with_backend();

    app.open_session("tests/login.py");

    let event = commands.try_recv().unwrap();
    let session = app.session.as_ref().unwrap();
    assert_eq!(event.uuid(), session.id());
    assert!(matches!(
        event.command(),
        Command::Session { effect: SessionEffect::FetchSource(request) }
            if request.file_path == "tests/login.py" && request.branch_name == "main"
    ));
    assert_eq!(app.mode, AppMode::ViewCode);

    app.handle_single_event(UIEvent::SessionCompleted(
        event.uuid(),
        SessionAction::SourceFetched(Ok("print(1)".into())),
    ));

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.source_text(), "print(1)");
    assert_eq!(session.loading_phase(), LoadingPhase::Idle);
}

#[test_log::test]
fn test_completions_for_an_old_session_are_discarded() {
    let (mut app, mut commands) = app_with_backend();

    app.open_session("tests/login.py");
    let old = commands.try_recv().unwrap().uuid();
    app.open_session("tests/search.py");

    app.handle_single_event(UIEvent::SessionCompleted(
        old,
        SessionAction::SourceFetched(Ok("stale".into())),
    ));

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.target_file(), "tests/search.py");
    assert_eq!(session.source_text(), "");
    assert!(session.is_busy());
}

#[test_log::test]
fn test_typing_and_submitting_an_edit() {
    let (mut app, mut commands) = app_with_backend();
    app.open_session("tests/login.py");
    let uuid = commands.try_recv().unwrap().uuid();
    app.handle_single_event(UIEvent::SessionCompleted(
        uuid,
        SessionAction::SourceFetched(Ok("print(1)".into())),
    ));

    for c in "add x".chars() {
        app.handle_single_event(key(KeyCode::Char(c)));
    }
    assert_eq!(app.session.as_ref().unwrap().request_text(), "add x");

    app.handle_single_event(UIEvent::Input(KeyEvent::new(
        KeyCode::Enter,
        KeyModifiers::CONTROL,
    )));

    let event = commands.try_recv().unwrap();
    assert!(matches!(
        event.command(),
        Command::Session { effect: SessionEffect::SubmitEdit(request) }
            if request.request == "add x" && request.code == "print(1)"
    ));

    // A second confirm while busy is ignored
    app.handle_single_event(UIEvent::Input(KeyEvent::new(
        KeyCode::Enter,
        KeyModifiers::CONTROL | KeyModifiers::SHIFT,
    )));
    assert!(commands.try_recv().is_err());

    app.handle_single_event(UIEvent::SessionCompleted(
        uuid,
        SessionAction::EditSubmitted(Ok("print(1)\nassert x".into())),
    ));
    assert_eq!(
        app.session.as_ref().unwrap().source_text(),
        "print(1)\nassert x"
    );
}

#[test_log::test]
fn test_typing_while_the_source_is_fetched() {
    let (mut app, mut commands) = app_with_backend();
    app.open_session("tests/login.py");
    let uuid = commands.try_recv().unwrap().uuid();

    for c in "add y".chars() {
        app.handle_single_event(key(KeyCode::Char(c)));
    }

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.loading_phase(), LoadingPhase::FetchingSource);
    assert_eq!(session.request_text(), "add y");

    app.handle_single_event(UIEvent::SessionCompleted(
        uuid,
        SessionAction::SourceFetched(Ok("print(1)".into())),
    ));
    assert_eq!(app.session.as_ref().unwrap().request_text(), "add y");
}

#[test_log::test]
fn test_execute_switches_to_logs() {
    let (mut app, mut commands) = app_with_backend();
    app.open_session("tests/login.py");
    let uuid = commands.try_recv().unwrap().uuid();
    app.handle_single_event(UIEvent::SessionCompleted(
        uuid,
        SessionAction::SourceFetched(Ok("print(1)".into())),
    ));

    app.handle_single_event(UIEvent::Input(KeyEvent::new(
        KeyCode::Enter,
        KeyModifiers::CONTROL | KeyModifiers::SHIFT,
    )));
    assert!(matches!(
        commands.try_recv().unwrap().command(),
        Command::Session {
            effect: SessionEffect::Execute(_)
        }
    ));

    app.handle_single_event(UIEvent::SessionCompleted(
        uuid,
        SessionAction::Executed(Ok(ExecutionOutput {
            stdout: "1\n".into(),
            stderr: String::new(),
        })),
    ));

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.active_view(), ActiveView::Logs);
    assert_eq!(session.execution_output().stdout, "1\n");
}

#[test_log::test]
fn test_session_errors_become_dismissible_notifications() {
    let (mut app, mut commands) = app_with_backend();
    app.open_session("tests/login.py");
    let uuid = commands.try_recv().unwrap().uuid();

    app.handle_single_event(UIEvent::SessionCompleted(
        uuid,
        SessionAction::SourceFetched(Err(GatewayError::remote(
            EndpointKind::FetchSource,
            "connection refused",
        ))),
    ));

    let notification = app.notification.clone().unwrap();
    assert!(notification.is_error);
    assert!(notification.message.contains("connection refused"));
    assert!(app.session.as_ref().unwrap().last_error().is_none());

    app.handle_single_event(key(KeyCode::Esc));
    assert!(app.notification.is_none());
    assert_eq!(app.mode, AppMode::ViewCode);

    app.handle_single_event(key(KeyCode::Esc));
    assert_eq!(app.mode, AppMode::TestRuns);
}

#[test_log::test]
fn test_without_backend_calls_fail_instead_of_hanging() {
    let mut app = crate::frontend::App::default();

    app.open_session("tests/login.py");

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.loading_phase(), LoadingPhase::Idle);
    assert!(app.notification.as_ref().is_some_and(|n| n.is_error));
}

#[test_log::test]
fn test_load_runs_ignores_stale_responses() {
    let (mut app, mut commands) = app_with_backend();

    app.load_runs();
    let first = commands.try_recv().unwrap();
    assert!(matches!(
        first.command(),
        Command::LoadRuns { timeframe } if timeframe == "today"
    ));

    app.handle_single_event(key(KeyCode::Char('t')));
    let second = commands.try_recv().unwrap();
    assert!(matches!(
        second.command(),
        Command::LoadRuns { timeframe } if timeframe == "week"
    ));

    app.handle_single_event(UIEvent::RunsLoaded(first.uuid(), Ok(runs())));
    assert!(app.registry.runs().is_empty());
    assert!(app.is_loading_runs());

    app.handle_single_event(UIEvent::RunsLoaded(second.uuid(), Ok(runs())));
    assert_eq!(app.registry.runs().len(), 3);
    assert!(!app.is_loading_runs());
}

#[test_log::test]
fn test_failed_load_notifies() {
    let (mut app, mut commands) = app_with_backend();

    app.load_runs();
    let uuid = commands.try_recv().unwrap().uuid();
    app.handle_single_event(UIEvent::RunsLoaded(uuid, Err("no run source".into())));

    assert!(app.registry.is_loaded());
    assert!(app
        .notification
        .as_ref()
        .is_some_and(|n| n.is_error && n.message.contains("no run source")));
}

#[test_log::test]
fn test_select_and_rerun_from_the_table() {
    let (mut app, mut commands) = app_with_backend();
    app.registry.load_runs(runs());
    app.clamp_runs_table();

    // Failed first, so the highlighted row is run 2
    app.handle_single_event(key(KeyCode::Char(' ')));
    app.handle_single_event(key(KeyCode::Down));
    app.handle_single_event(key(KeyCode::Char(' ')));
    assert!(app.registry.is_selected("2"));
    assert!(app.registry.is_selected("1"));

    app.handle_single_event(key(KeyCode::Char('r')));
    let event = commands.try_recv().unwrap();
    let Command::RerunTests { targets } = event.command() else {
        panic!("Expected a re-run, got {}", event.command());
    };
    assert_eq!(targets.len(), 2);
    assert!(app.registry.is_running());

    app.handle_single_event(UIEvent::RunResult(
        event.uuid(),
        "2".into(),
        Ok(json!({ "status": "Passed" }).as_object().unwrap().clone()),
    ));
    app.handle_single_event(UIEvent::RunResult(
        event.uuid(),
        "1".into(),
        Err(GatewayError::remote(EndpointKind::Execute, "timeout")),
    ));
    app.handle_single_event(UIEvent::CommandDone(event.uuid()));

    let rerun = app.registry.find("2").unwrap();
    assert_eq!(rerun.status, RunStatus::Passed);
    assert_eq!(rerun.timeframe, JUST_UPDATED);
    assert!(!app.registry.is_running());
    assert!(app.registry.selection().is_empty());
    assert!(app
        .notification
        .as_ref()
        .is_some_and(|n| n.is_error && n.message.starts_with("1 of 2")));
}

#[test_log::test]
fn test_select_all_toggles() {
    let (mut app, _commands) = app_with_backend();
    app.registry.load_runs(runs());

    app.handle_single_event(key(KeyCode::Char('a')));
    assert_eq!(app.registry.selection().len(), 3);

    app.handle_single_event(key(KeyCode::Char('a')));
    assert!(app.registry.selection().is_empty());
}

#[test_log::test]
fn test_rerun_with_empty_selection_succeeds_immediately() {
    let (mut app, mut commands) = app_with_backend();
    app.registry.load_runs(runs());

    app.run_selected();

    assert!(commands.try_recv().is_err());
    assert!(!app.registry.is_running());
    assert!(app
        .notification
        .as_ref()
        .is_some_and(|n| !n.is_error && n.message.contains('0')));
}

#[test_log::test]
fn test_enter_opens_the_normalized_file() {
    let (mut app, mut commands) = app_with_backend();
    app.registry.load_runs(runs());
    app.clamp_runs_table();

    app.handle_single_event(key(KeyCode::Enter));

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.target_file(), "tests/checkout.py");
    assert_eq!(app.mode, AppMode::ViewCode);
    assert!(commands.try_recv().is_ok());
}

#[test_log::test]
fn test_filter_panel_toggles_values() {
    let (mut app, _commands) = app_with_backend();
    app.registry.load_runs(runs());

    app.handle_single_event(key(KeyCode::Tab));
    // First option is the first team alphabetically
    app.handle_single_event(key(KeyCode::Char(' ')));

    let visible = app
        .registry
        .derived_view()
        .iter()
        .map(|run| run.run_id.clone())
        .collect::<Vec<_>>();
    assert_eq!(visible, ["1", "3"]);

    app.handle_single_event(key(KeyCode::Char('c')));
    assert_eq!(app.registry.derived_view().len(), 3);
}

#[test_log::test]
fn test_function_keys_change_mode_and_ctrl_q_quits() {
    let (mut app, _commands) = app_with_backend();

    app.handle_single_event(key(KeyCode::F(3)));
    assert_eq!(app.mode, AppMode::Logs);
    app.handle_single_event(key(KeyCode::F(2)));
    assert_eq!(app.mode, AppMode::ViewCode);

    app.handle_single_event(UIEvent::Input(KeyEvent::new(
        KeyCode::Char('q'),
        KeyModifiers::CONTROL,
    )));
    let event = app.ui_rx.try_recv().unwrap();
    app.handle_single_event(event);
    assert_eq!(app.mode, AppMode::Quit);
}
