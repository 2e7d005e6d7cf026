use std::sync::Arc;

use derive_builder::Builder;
use uuid::Uuid;

use crate::{runs::Selected, session::SessionEffect};

use super::Responder;

/// Commands are the main way to interact with the backend
#[derive(Debug, Clone, strum_macros::Display, strum_macros::IntoStaticStr, strum_macros::EnumIs)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    /// Cleanly stop the backend
    Quit,

    /// Perform a remote call for the session identified by the event uuid
    Session { effect: SessionEffect },

    /// Fetch the historical runs for a timeframe
    LoadRuns { timeframe: String },

    /// Re-run the targets concurrently, reporting every result as it lands
    RerunTests { targets: Vec<Selected> },
}

#[derive(Debug, Clone, Builder)]
pub struct CommandEvent {
    command: Command,
    uuid: Uuid,
    responder: Arc<dyn Responder>,
}

impl CommandEvent {
    pub fn new(command: Command, uuid: Uuid, responder: Arc<dyn Responder>) -> Self {
        CommandEvent {
            command,
            uuid,
            responder,
        }
    }

    #[must_use]
    pub fn quit() -> Self {
        CommandEvent {
            command: Command::Quit,
            responder: Arc::new(()),
            uuid: Uuid::new_v4(),
        }
    }

    #[must_use]
    pub fn builder() -> CommandEventBuilder {
        CommandEventBuilder::default()
    }

    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    #[must_use]
    pub fn responder(&self) -> &dyn Responder {
        self.responder.as_ref()
    }
}
