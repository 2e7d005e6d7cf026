use crossterm::event::KeyEvent;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{gateway::GatewayError, runs::TestRun, session::SessionAction};

use super::app::AppMode;

// Event handling
#[derive(Debug, Clone, strum_macros::Display, strum_macros::EnumIs)]
pub enum UIEvent {
    /// A key is pressed
    Input(KeyEvent),
    /// A frontend tick event to trigger updates, etc
    Tick,
    /// Change the view mode of the frontend
    ChangeMode(AppMode),
    /// Open a view-code session for a file
    OpenSession(String),
    /// Reload the runs for the current timeframe
    LoadRuns,
    /// Re-run every selected run
    RunSelected,
    /// A remote call for the session with this id completed
    SessionCompleted(Uuid, SessionAction),
    RunsLoaded(Uuid, Result<Vec<TestRun>, String>),
    /// A single re-run of a batch landed
    RunResult(Uuid, String, Result<Map<String, Value>, GatewayError>),
    /// Backend system messages
    BackendMessage(Uuid, String),
    /// Command finished
    CommandDone(Uuid),
    /// Quit from the frontend
    Quit,
}

impl From<KeyEvent> for UIEvent {
    fn from(key: KeyEvent) -> Self {
        Self::Input(key)
    }
}
