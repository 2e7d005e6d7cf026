use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{gateway::GatewayError, runs::TestRun, session::SessionAction};

/// What the backend reports back, tagged with the uuid of the command
#[derive(Debug, Clone)]
pub enum CommandResponse {
    /// Completion of a session call, the uuid is the session id
    Session(Uuid, SessionAction),
    /// Historical runs, or why they could not be fetched
    RunsLoaded(Uuid, Result<Vec<TestRun>, String>),
    /// A single re-run landed for a run id
    RunResult(Uuid, String, Result<Map<String, Value>, GatewayError>),
    /// Backend system messages
    BackendMessage(Uuid, String),
    /// A command has been completed
    Completed(Uuid),
}

/// A responder reacts to updates from commands
///
/// Backend defines the interface, frontend can define ways to handle the responses
#[cfg_attr(test, automock)]
pub trait Responder: std::fmt::Debug + Send + Sync {
    /// Generic handler for command responses
    fn send(&self, response: CommandResponse);

    /// System messages from the backend
    fn system_message(&self, uuid: Uuid, message: &str) {
        self.send(CommandResponse::BackendMessage(uuid, message.to_string()));
    }
}

impl Responder for tokio::sync::mpsc::UnboundedSender<CommandResponse> {
    fn send(&self, response: CommandResponse) {
        let _ = tokio::sync::mpsc::UnboundedSender::send(self, response);
    }
}

impl Responder for Arc<dyn Responder> {
    fn send(&self, response: CommandResponse) {
        self.as_ref().send(response);
    }
}

// noop responder
impl Responder for () {
    fn send(&self, _response: CommandResponse) {}
}
