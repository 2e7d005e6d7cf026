use uuid::Uuid;

use crate::gateway::{
    requests::{ExecuteRequest, ExecutionOutput, FetchSourceRequest, SubmitEditRequest},
    GatewayError,
};

use super::{SessionAction, SessionEffect};

/// Which remote call, if any, is in flight. Only one can be at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIs)]
pub enum LoadingPhase {
    #[default]
    Idle,
    SubmittingEdit,
    Executing,
    FetchingSource,
}

/// What the frontend shows for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIs)]
pub enum ActiveView {
    #[default]
    Code,
    Logs,
}

impl ActiveView {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ActiveView::Code => ActiveView::Logs,
            ActiveView::Logs => ActiveView::Code,
        }
    }
}

/// An edit/execute workflow for one target file
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    target_file: String,
    branch_name: String,
    source_text: String,
    request_text: String,
    execution_output: ExecutionOutput,
    active_view: ActiveView,
    loading_phase: LoadingPhase,
    last_error: Option<GatewayError>,
}

impl Session {
    /// Creates a session for `target_file` and immediately starts fetching its source
    #[must_use]
    pub fn open(
        target_file: impl Into<String>,
        branch_name: impl Into<String>,
    ) -> (Session, SessionEffect) {
        let mut session = Session {
            id: Uuid::new_v4(),
            target_file: target_file.into(),
            branch_name: branch_name.into(),
            source_text: String::new(),
            request_text: String::new(),
            execution_output: ExecutionOutput::default(),
            active_view: ActiveView::default(),
            loading_phase: LoadingPhase::Idle,
            last_error: None,
        };

        let effect = session.start_fetch();
        (session, effect)
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn target_file(&self) -> &str {
        &self.target_file
    }

    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    #[must_use]
    pub fn request_text(&self) -> &str {
        &self.request_text
    }

    #[must_use]
    pub fn execution_output(&self) -> &ExecutionOutput {
        &self.execution_output
    }

    #[must_use]
    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    #[must_use]
    pub fn loading_phase(&self) -> LoadingPhase {
        self.loading_phase
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.loading_phase.is_idle()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&GatewayError> {
        self.last_error.as_ref()
    }

    /// Takes the latest error so it is only surfaced once
    pub fn take_error(&mut self) -> Option<GatewayError> {
        self.last_error.take()
    }

    /// Transitions the session
    ///
    /// Returns the remote call to perform when the action starts one. Starting a call while
    /// another is in flight does nothing. Completions always return the session to idle,
    /// unless they do not belong to the call in flight, in which case they are dropped.
    pub fn apply(&mut self, action: SessionAction) -> Option<SessionEffect> {
        match action {
            SessionAction::SetRequestText(text) => self.request_text = text,
            SessionAction::ShowView(view) => self.active_view = view,
            SessionAction::ToggleView => self.active_view = self.active_view.toggled(),
            SessionAction::DismissError => self.last_error = None,

            SessionAction::SubmitEdit => {
                if self.ensure_idle("submit edit") {
                    self.loading_phase = LoadingPhase::SubmittingEdit;
                    return Some(SessionEffect::SubmitEdit(SubmitEditRequest {
                        file_name: self.target_file.clone(),
                        request: self.request_text.clone(),
                        code: self.source_text.clone(),
                    }));
                }
            }
            SessionAction::Execute => {
                if self.ensure_idle("execute") {
                    self.loading_phase = LoadingPhase::Executing;
                    return Some(SessionEffect::Execute(ExecuteRequest {
                        file_path: self.target_file.clone(),
                        code: Some(self.source_text.clone()),
                    }));
                }
            }
            SessionAction::Refetch => {
                if self.ensure_idle("refetch") {
                    return Some(self.start_fetch());
                }
            }

            SessionAction::SourceFetched(result) => {
                if self.finish(LoadingPhase::FetchingSource) {
                    match result {
                        Ok(code) => self.source_text = code,
                        Err(error) => self.last_error = Some(error),
                    }
                }
            }
            SessionAction::EditSubmitted(result) => {
                if self.finish(LoadingPhase::SubmittingEdit) {
                    match result {
                        Ok(code) => self.source_text = code,
                        Err(error) => self.last_error = Some(error),
                    }
                }
            }
            SessionAction::Executed(result) => {
                if self.finish(LoadingPhase::Executing) {
                    match result {
                        Ok(output) => {
                            self.execution_output = output;
                            self.active_view = ActiveView::Logs;
                        }
                        Err(error) => self.last_error = Some(error),
                    }
                }
            }
        }

        None
    }

    fn start_fetch(&mut self) -> SessionEffect {
        self.loading_phase = LoadingPhase::FetchingSource;
        SessionEffect::FetchSource(FetchSourceRequest::new(
            self.target_file.clone(),
            self.branch_name.clone(),
        ))
    }

    fn ensure_idle(&self, what: &str) -> bool {
        if self.loading_phase.is_idle() {
            return true;
        }
        tracing::debug!(
            session = %self.id,
            phase = %self.loading_phase,
            "Ignoring {what} while busy"
        );
        false
    }

    fn finish(&mut self, expected: LoadingPhase) -> bool {
        if self.loading_phase != expected {
            tracing::warn!(
                session = %self.id,
                phase = %self.loading_phase,
                %expected,
                "Discarding response that does not match the call in flight"
            );
            return false;
        }
        self.loading_phase = LoadingPhase::Idle;
        true
    }
}
