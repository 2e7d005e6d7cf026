use serde::{Deserialize, Serialize};

use crate::gateway::EndpointKind;

use super::defaults::{default_execute_url, default_fetch_source_url, default_submit_edit_url};

/// Urls of the remote endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_submit_edit_url")]
    pub submit_edit: String,
    #[serde(default = "default_execute_url")]
    pub execute: String,
    #[serde(default = "default_fetch_source_url")]
    pub fetch_source: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            submit_edit: default_submit_edit_url(),
            execute: default_execute_url(),
            fetch_source: default_fetch_source_url(),
        }
    }
}

impl Endpoints {
    #[must_use]
    pub fn url(&self, endpoint: EndpointKind) -> &str {
        match endpoint {
            EndpointKind::SubmitEdit => &self.submit_edit,
            EndpointKind::Execute => &self.execute,
            EndpointKind::FetchSource => &self.fetch_source,
        }
    }
}
