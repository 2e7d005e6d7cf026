//! Thin gateway to the remote execution service
//!
//! Every remote interaction is a POST with a json body to one of three fixed endpoints. Calls
//! are never retried, failures go straight back to the caller.
mod endpoint;
mod error;
mod http;
pub mod requests;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub use endpoint::EndpointKind;
pub use error::GatewayError;
pub use http::HttpGateway;

/// Sends a json payload to a remote endpoint and returns the decoded response
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Gateway: std::fmt::Debug + Send + Sync {
    async fn call(
        &self,
        endpoint: EndpointKind,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError>;
}
