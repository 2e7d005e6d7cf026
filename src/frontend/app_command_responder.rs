use tokio::sync::mpsc;

use crate::commands::{CommandResponse, Responder};

use super::ui_event::UIEvent;

/// Converts command responses into UI events
///
/// The responder is sent with commands so that the backend has a way to communicate with the
/// frontend, without knowing about the frontend
#[derive(Debug, Clone)]
pub struct AppCommandResponder {
    ui_tx: mpsc::UnboundedSender<UIEvent>,
}

impl AppCommandResponder {
    pub fn new(ui_tx: mpsc::UnboundedSender<UIEvent>) -> Self {
        Self { ui_tx }
    }
}

impl From<CommandResponse> for UIEvent {
    fn from(response: CommandResponse) -> Self {
        match response {
            CommandResponse::Session(uuid, action) => UIEvent::SessionCompleted(uuid, action),
            CommandResponse::RunsLoaded(uuid, runs) => UIEvent::RunsLoaded(uuid, runs),
            CommandResponse::RunResult(uuid, run_id, result) => {
                UIEvent::RunResult(uuid, run_id, result)
            }
            CommandResponse::BackendMessage(uuid, msg) => UIEvent::BackendMessage(uuid, msg),
            CommandResponse::Completed(uuid) => UIEvent::CommandDone(uuid),
        }
    }
}

impl Responder for AppCommandResponder {
    fn send(&self, response: CommandResponse) {
        tracing::debug!("[RESPONDER] Received response: {:?}", response);
        if let Err(err) = self.ui_tx.send(response.into()) {
            tracing::error!("Failed to send response to ui: {:#}", err);
        }
    }
}
