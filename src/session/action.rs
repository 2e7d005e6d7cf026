use crate::gateway::{
    requests::{ExecuteRequest, ExecutionOutput, FetchSourceRequest, SubmitEditRequest},
    EndpointKind, GatewayError,
};

use super::ActiveView;

/// Everything that can happen to a session
#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIs)]
#[strum(serialize_all = "snake_case")]
pub enum SessionAction {
    /// The user edited the natural language request
    SetRequestText(String),
    /// Ask the service to rewrite the source according to the request
    SubmitEdit,
    /// Run the current source remotely
    Execute,
    /// Reload the file from the branch, dropping local changes
    Refetch,
    /// Show the code or the logs
    ShowView(ActiveView),
    ToggleView,
    DismissError,

    /// Completions of remote calls
    SourceFetched(Result<String, GatewayError>),
    EditSubmitted(Result<String, GatewayError>),
    Executed(Result<ExecutionOutput, GatewayError>),
}

/// A remote call a session wants performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    FetchSource(FetchSourceRequest),
    SubmitEdit(SubmitEditRequest),
    Execute(ExecuteRequest),
}

impl SessionEffect {
    #[must_use]
    pub fn endpoint(&self) -> EndpointKind {
        match self {
            SessionEffect::FetchSource(_) => EndpointKind::FetchSource,
            SessionEffect::SubmitEdit(_) => EndpointKind::SubmitEdit,
            SessionEffect::Execute(_) => EndpointKind::Execute,
        }
    }

    /// The completion reporting this effect failed with `error`
    #[must_use]
    pub fn failed(&self, error: GatewayError) -> SessionAction {
        match self {
            SessionEffect::FetchSource(_) => SessionAction::SourceFetched(Err(error)),
            SessionEffect::SubmitEdit(_) => SessionAction::EditSubmitted(Err(error)),
            SessionEffect::Execute(_) => SessionAction::Executed(Err(error)),
        }
    }
}
