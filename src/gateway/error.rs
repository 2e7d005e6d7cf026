use super::EndpointKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Transport failure or a non-success status
    #[error("remote call to {endpoint} failed: {cause}")]
    RemoteCall {
        endpoint: EndpointKind,
        cause: String,
    },
    /// The call succeeded but the response is missing what we need
    #[error("unexpected response from {endpoint}: {detail}")]
    ResponseShape {
        endpoint: EndpointKind,
        detail: String,
    },
}

impl GatewayError {
    pub fn remote(endpoint: EndpointKind, cause: impl std::fmt::Display) -> Self {
        Self::RemoteCall {
            endpoint,
            cause: cause.to_string(),
        }
    }

    pub fn shape(endpoint: EndpointKind, detail: impl std::fmt::Display) -> Self {
        Self::ResponseShape {
            endpoint,
            detail: detail.to_string(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> EndpointKind {
        match self {
            Self::RemoteCall { endpoint, .. } | Self::ResponseShape { endpoint, .. } => *endpoint,
        }
    }
}
