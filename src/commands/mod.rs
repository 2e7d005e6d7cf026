//! Remote calls run in the backend, driven by commands from the frontend
//!
//! Results flow back through a [`Responder`] so the backend does not know about the frontend.
mod command;
mod handler;
mod responder;

pub use command::{Command, CommandEvent, CommandEventBuilder};
pub use handler::CommandHandler;
#[cfg(test)]
pub use responder::MockResponder;
pub use responder::{CommandResponse, Responder};
