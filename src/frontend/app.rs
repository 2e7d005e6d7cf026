use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context as _, Result};
use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::TableState};
use serde_json::{Map, Value};
use tokio::{sync::mpsc, task};
use tokio_util::sync::CancellationToken;
use tui_logger::TuiWidgetState;
use tui_textarea::TextArea;
use uuid::Uuid;

use crate::{
    commands::{Command, CommandEvent, Responder},
    config::Config,
    gateway::GatewayError,
    navigation,
    runs::{BatchOutcome, RunRegistry, TestRun, TIMEFRAMES},
    session::{Session, SessionAction, SessionEffect},
};

use super::{
    app_command_responder::AppCommandResponder, logs_mode, test_runs_mode, ui, view_code_mode,
    UIEvent,
};

const TICK_RATE: u64 = 250;

/// How long informational notifications stay visible, errors stay until dismissed
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Handles user and TUI interaction
pub struct App<'a> {
    /// The natural language request for the current session
    pub text_input: TextArea<'a>,

    /// The view-code session, if a file has been opened
    pub session: Option<Session>,

    /// Historical runs, filters and selection
    pub registry: RunRegistry,

    /// Timeframe runs are loaded for
    pub timeframe: String,

    /// Branch sessions fetch their file from
    pub branch_name: String,

    /// Extension test names are normalized to when opening a run
    pub file_extension: String,

    /// Holds the sender of UI events for later cloning if needed
    pub ui_tx: mpsc::UnboundedSender<UIEvent>,

    /// Receives UI events (key presses, command responses, etc)
    pub ui_rx: mpsc::UnboundedReceiver<UIEvent>,

    /// Sends commands to the backend
    pub command_tx: Option<mpsc::UnboundedSender<CommandEvent>>,

    /// Mode the app is in, manages the which layout is rendered and if it should quit
    pub mode: AppMode,

    /// Tab names
    pub tab_names: Vec<&'static str>,

    /// States when viewing logs
    pub log_state: TuiWidgetState,

    pub notification: Option<Notification>,

    /// Highlighted row in the runs table
    pub runs_table: TableState,

    /// Which panel of the test runs mode receives keys
    pub runs_focus: RunsFocus,

    /// Highlighted option in the filter panel
    pub filter_cursor: usize,

    /// Vertical scroll of the code or logs of a session
    pub code_scroll: u16,

    responder: Arc<dyn Responder>,

    /// Only the latest load is applied
    runs_request: Option<Uuid>,

    /// Command running the current batch
    batch_request: Option<Uuid>,

    /// Stops polling the terminal on quit
    cancel: CancellationToken,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
pub enum AppMode {
    #[default]
    TestRuns,
    ViewCode,
    Logs,
    Quit,
}

impl AppMode {
    fn on_key(self, app: &mut App, key: KeyEvent) {
        match self {
            AppMode::TestRuns => test_runs_mode::on_key(app, key),
            AppMode::ViewCode => view_code_mode::on_key(app, key),
            AppMode::Logs => logs_mode::on_key(app, key),
            AppMode::Quit => (),
        }
    }

    pub(super) fn ui(self, f: &mut ratatui::Frame, area: Rect, app: &mut App) {
        match self {
            AppMode::TestRuns => test_runs_mode::ui(f, area, app),
            AppMode::ViewCode => view_code_mode::ui(f, area, app),
            AppMode::Logs => logs_mode::ui(f, area, app),
            AppMode::Quit => (),
        }
    }

    pub(super) fn tab_index(self) -> Option<usize> {
        match self {
            AppMode::TestRuns => Some(0),
            AppMode::ViewCode => Some(1),
            AppMode::Logs => Some(2),
            AppMode::Quit => None,
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(AppMode::TestRuns),
            1 => Some(AppMode::ViewCode),
            2 => Some(AppMode::Logs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunsFocus {
    #[default]
    Table,
    Filters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub is_error: bool,
    shown_at: Instant,
}

impl Notification {
    fn is_expired(&self) -> bool {
        !self.is_error && self.shown_at.elapsed() >= NOTIFICATION_TTL
    }
}

impl Default for App<'_> {
    fn default() -> Self {
        App::new(&Config::default())
    }
}

fn new_text_area() -> TextArea<'static> {
    let mut text_area = TextArea::default();

    text_area.set_placeholder_text("Describe the change to make to this test ...");
    text_area.set_placeholder_style(Style::default().fg(Color::Gray));
    text_area.set_cursor_line_style(Style::reset());

    text_area
}

impl App<'_> {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let responder = Arc::new(AppCommandResponder::new(ui_tx.clone())) as Arc<dyn Responder>;

        Self {
            text_input: new_text_area(),
            session: None,
            registry: RunRegistry::default(),
            timeframe: config.default_timeframe.clone(),
            branch_name: config.branch_name.clone(),
            file_extension: config.file_extension.clone(),
            ui_tx,
            ui_rx,
            command_tx: None,
            mode: AppMode::default(),
            tab_names: vec!["[F1] Test runs", "[F2] View code", "[F3] Logs"],
            log_state: TuiWidgetState::new()
                .set_default_display_level(log::LevelFilter::Off)
                .set_level_for_target("runboard", log::LevelFilter::Info),
            notification: None,
            runs_table: TableState::default().with_selected(Some(0)),
            runs_focus: RunsFocus::default(),
            filter_cursor: 0,
            code_scroll: 0,
            responder,
            runs_request: None,
            batch_request: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn send_ui_event(&self, msg: impl Into<UIEvent>) {
        let event = msg.into();
        tracing::debug!("Sending ui event {event}");
        if let Err(err) = self.ui_tx.send(event) {
            tracing::error!("Failed to send ui event {err}");
        }
    }

    pub fn reset_text_input(&mut self) {
        self.text_input = new_text_area();
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn change_mode(&mut self, mode: AppMode) {
        self.mode = mode;
    }

    /// The run highlighted in the table, if any
    #[must_use]
    pub fn highlighted_run(&self) -> Option<&TestRun> {
        let index = self.runs_table.selected()?;
        self.registry.derived_view().get(index).copied()
    }

    /// Whether runs are being fetched
    #[must_use]
    pub fn is_loading_runs(&self) -> bool {
        self.runs_request.is_some()
    }

    fn on_key(&mut self, key: KeyEvent) {
        // Always quit on ctrl q
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('q') {
            tracing::warn!("Ctrl-Q pressed, quitting");
            return self.send_ui_event(UIEvent::Quit);
        }

        if let KeyCode::F(index) = key.code {
            if let Some(mode) = AppMode::from_index(usize::from(index.saturating_sub(1))) {
                return self.change_mode(mode);
            }
        }

        self.mode.on_key(self, key);
    }

    /// Sends a command to the backend with this app as responder
    pub fn dispatch_command(&self, uuid: Uuid, command: Command) -> Result<()> {
        let command_tx = self
            .command_tx
            .as_ref()
            .context("Backend is not running")?;

        tracing::debug!(%uuid, "Dispatching command {command}");
        command_tx
            .send(CommandEvent::new(command, uuid, Arc::clone(&self.responder)))
            .context("Backend has shut down")
    }

    /// Opens a session for `target_file` and starts fetching its source
    pub fn open_session(&mut self, target_file: impl Into<String>) {
        let (session, effect) = Session::open(target_file, self.branch_name.clone());
        tracing::info!(session = %session.id(), file = session.target_file(), "Opening session");

        let uuid = session.id();
        self.session = Some(session);
        self.reset_text_input();
        self.code_scroll = 0;
        self.change_mode(AppMode::ViewCode);
        self.perform_session_effect(uuid, effect);
    }

    /// Applies an action to the current session, starting any remote call it asks for
    pub fn session_action(&mut self, action: SessionAction) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(%action, "No session open, ignoring");
            return;
        };

        let uuid = session.id();
        if let Some(effect) = session.apply(action) {
            self.perform_session_effect(uuid, effect);
        }
        self.surface_session_error();
    }

    /// Leaves the session for the run details, i.e. the runs table
    pub fn close_session_view(&mut self) {
        if let Some(session) = &self.session {
            tracing::debug!(
                location = %navigation::run_details_location(session.target_file()),
                "Navigating back"
            );
        }
        self.change_mode(AppMode::TestRuns);
    }

    fn perform_session_effect(&mut self, uuid: Uuid, effect: SessionEffect) {
        let endpoint = effect.endpoint();
        let failure = self
            .dispatch_command(
                uuid,
                Command::Session {
                    effect: effect.clone(),
                },
            )
            .err();

        if let Some(error) = failure {
            let completion = effect.failed(GatewayError::remote(endpoint, format!("{error:#}")));
            self.on_session_completed(uuid, completion);
        }
    }

    fn on_session_completed(&mut self, uuid: Uuid, action: SessionAction) {
        match self.session.as_mut() {
            Some(session) if session.id() == uuid => {
                session.apply(action);
            }
            _ => {
                tracing::debug!(%uuid, %action, "Discarding completion for a closed session");
                return;
            }
        }

        self.surface_session_error();
    }

    fn surface_session_error(&mut self) {
        if let Some(error) = self.session.as_mut().and_then(Session::take_error) {
            self.notify_error(error.to_string());
        }
    }

    /// Fetches the runs for the current timeframe
    pub fn load_runs(&mut self) {
        let uuid = Uuid::new_v4();
        self.registry.mark_loading();
        self.runs_request = Some(uuid);

        let command = Command::LoadRuns {
            timeframe: self.timeframe.clone(),
        };
        if let Err(error) = self.dispatch_command(uuid, command) {
            self.runs_request = None;
            self.registry.mark_loaded();
            self.notify_error(format!("Failed to load runs: {error:#}"));
        }
    }

    /// Switches to the next timeframe and reloads
    pub fn next_timeframe(&mut self) {
        let next = TIMEFRAMES
            .iter()
            .position(|timeframe| *timeframe == self.timeframe)
            .map_or(0, |index| (index + 1) % TIMEFRAMES.len());

        self.timeframe = TIMEFRAMES[next].to_string();
        self.load_runs();
    }

    fn on_runs_loaded(&mut self, uuid: Uuid, runs: Result<Vec<TestRun>, String>) {
        if self.runs_request != Some(uuid) {
            tracing::debug!(%uuid, "Discarding stale runs");
            return;
        }
        self.runs_request = None;

        match runs {
            Ok(runs) => {
                tracing::info!(count = runs.len(), timeframe = %self.timeframe, "Loaded runs");
                self.registry.load_runs(runs);
                self.clamp_runs_table();
            }
            Err(error) => {
                self.registry.mark_loaded();
                self.notify_error(format!("Failed to load runs: {error}"));
            }
        }
    }

    /// Keeps the highlighted row within the filtered runs
    pub fn clamp_runs_table(&mut self) {
        let len = self.registry.derived_view().len();
        let selected = match self.runs_table.selected() {
            _ if len == 0 => None,
            Some(index) => Some(index.min(len - 1)),
            None => Some(0),
        };
        self.runs_table.select(selected);
    }

    /// Re-runs the selected runs in the backend
    pub fn run_selected(&mut self) {
        let Some(targets) = self.registry.begin_batch() else {
            self.notify("A re-run is already in progress");
            return;
        };

        if targets.is_empty() {
            let outcome = self.registry.finish_batch();
            return self.report_batch(&outcome);
        }

        let uuid = Uuid::new_v4();
        tracing::info!(%uuid, count = targets.len(), "Re-running selected tests");
        self.batch_request = Some(uuid);

        if let Err(error) = self.dispatch_command(uuid, Command::RerunTests { targets }) {
            self.batch_request = None;
            self.registry.finish_batch();
            self.notify_error(format!("Failed to re-run tests: {error:#}"));
        }
    }

    fn on_run_result(
        &mut self,
        uuid: Uuid,
        run_id: &str,
        result: Result<Map<String, Value>, GatewayError>,
    ) {
        if self.batch_request != Some(uuid) {
            tracing::debug!(%uuid, run_id, "Discarding result of an unknown batch");
            return;
        }

        // Failures are logged and collected by the registry
        let _ = self.registry.apply_result(run_id, result);
    }

    fn on_command_done(&mut self, uuid: Uuid) {
        if self.batch_request == Some(uuid) {
            self.batch_request = None;
            let outcome = self.registry.finish_batch();
            self.report_batch(&outcome);
        }
    }

    fn report_batch(&mut self, outcome: &BatchOutcome) {
        match outcome {
            BatchOutcome::Succeeded { total } => self.notify(format!("Re-ran {total} test(s)")),
            BatchOutcome::Failed {
                total,
                failed,
                message,
            } => self.notify_error(format!("{failed} of {total} re-run(s) failed: {message}")),
        }
    }

    pub fn handle_single_event(&mut self, event: UIEvent) {
        if !matches!(event, UIEvent::Tick | UIEvent::Input(_)) {
            tracing::debug!("Received ui event: {event}");
        }

        match event {
            UIEvent::Input(key) => self.on_key(key),
            UIEvent::Tick => {
                if self.notification.as_ref().is_some_and(Notification::is_expired) {
                    self.dismiss_notification();
                }
            }
            UIEvent::ChangeMode(mode) => self.change_mode(mode),
            UIEvent::OpenSession(target_file) => self.open_session(target_file),
            UIEvent::LoadRuns => self.load_runs(),
            UIEvent::RunSelected => self.run_selected(),
            UIEvent::SessionCompleted(uuid, action) => self.on_session_completed(uuid, action),
            UIEvent::RunsLoaded(uuid, runs) => self.on_runs_loaded(uuid, runs),
            UIEvent::RunResult(uuid, run_id, result) => self.on_run_result(uuid, &run_id, result),
            UIEvent::BackendMessage(_, message) => self.notify(message),
            UIEvent::CommandDone(uuid) => self.on_command_done(uuid),
            UIEvent::Quit => self.change_mode(AppMode::Quit),
        }
    }

    /// Handles events until one matches `predicate`, which is handled and returned
    ///
    /// Returns `None` when the ui channel closes first.
    pub async fn handle_events_until(
        &mut self,
        predicate: impl Fn(&UIEvent) -> bool,
    ) -> Option<UIEvent> {
        while let Some(event) = self.ui_rx.recv().await {
            let matched = predicate(&event).then(|| event.clone());
            self.handle_single_event(event);

            if matched.is_some() {
                return matched;
            }
        }

        None
    }

    #[tracing::instrument(skip_all)]
    pub async fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<()> {
        let poller = task::spawn_blocking({
            let ui_tx = self.ui_tx.clone();
            let cancel = self.cancel.clone();
            move || poll_ui_events(&ui_tx, &cancel)
        });

        self.load_runs();

        loop {
            terminal.draw(|f| ui::ui(f, self))?;

            if self.mode == AppMode::Quit {
                break;
            }

            let Some(event) = self.ui_rx.recv().await else {
                break;
            };
            self.handle_single_event(event);
        }

        self.cancel.cancel();
        if let Some(command_tx) = &self.command_tx {
            let _ = command_tx.send(CommandEvent::quit());
        }

        poller.await.context("Terminal poller panicked")?
    }
}

/// Forwards key presses to the ui, or ticks when nothing happens
fn poll_ui_events(ui_tx: &mpsc::UnboundedSender<UIEvent>, cancel: &CancellationToken) -> Result<()> {
    let tick_rate = Duration::from_millis(TICK_RATE);

    while !cancel.is_cancelled() {
        let event = if event::poll(tick_rate)? {
            match event::read()? {
                event::Event::Key(key) if key.kind == KeyEventKind::Press => UIEvent::Input(key),
                _ => continue,
            }
        } else {
            UIEvent::Tick
        };

        if ui_tx.send(event).is_err() {
            break;
        }
    }

    Ok(())
}
