//! The edit/execute session for a single target file
//!
//! A [`Session`] is a plain value that changes only through [`SessionAction`]s. Starting a
//! remote call yields a [`SessionEffect`]; whoever owns the session performs it (see
//! [`perform`]) and feeds the resulting completion action back in.
mod action;
mod state;

pub use action::{SessionAction, SessionEffect};
pub use state::{ActiveView, LoadingPhase, Session};

pub use crate::gateway::requests::ExecutionOutput;

use crate::gateway::{requests, Gateway};

/// Performs the remote call for an effect and returns the action that completes it
#[tracing::instrument(skip_all, fields(endpoint = %effect.endpoint()))]
pub async fn perform<G: Gateway + ?Sized>(gateway: &G, effect: &SessionEffect) -> SessionAction {
    match effect {
        SessionEffect::FetchSource(request) => {
            SessionAction::SourceFetched(requests::fetch_source(gateway, request).await)
        }
        SessionEffect::SubmitEdit(request) => {
            SessionAction::EditSubmitted(requests::submit_edit(gateway, request).await)
        }
        SessionEffect::Execute(request) => {
            SessionAction::Executed(requests::execute(gateway, request).await)
        }
    }
}

impl Session {
    /// Applies an action and, if it started a remote call, performs it and applies the result
    ///
    /// Convenient when the session is driven directly instead of through the command handler.
    pub async fn dispatch<G: Gateway + ?Sized>(&mut self, gateway: &G, action: SessionAction) {
        if let Some(effect) = self.apply(action) {
            let completion = perform(gateway, &effect).await;
            self.apply(completion);
        }
    }
}
