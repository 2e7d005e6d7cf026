//! Typed payloads for the three endpoints and helpers that validate what comes back
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EndpointKind, Gateway, GatewayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestType {
    #[serde(rename = "FETCH_FILE_CONTENTS")]
    FetchFileContents,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSourceRequest {
    pub file_path: String,
    pub request_type: RequestType,
    pub branch_name: String,
}

impl FetchSourceRequest {
    pub fn new(file_path: impl Into<String>, branch_name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            request_type: RequestType::FetchFileContents,
            branch_name: branch_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEditRequest {
    pub file_name: String,
    pub request: String,
    pub code: String,
}

/// Runs a file remotely. Without `code` the service runs the file as it is on the branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ExecuteRequest {
    pub fn for_file(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            code: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitEditResponse {
    new_code: String,
}

/// Output of a remote execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutionOutput {
    #[serde(rename = "StandardOutputContent")]
    pub stdout: String,
    #[serde(rename = "StandardErrorContent")]
    pub stderr: String,
}

async fn send<G, P>(gateway: &G, endpoint: EndpointKind, payload: &P) -> Result<Value, GatewayError>
where
    G: Gateway + ?Sized,
    P: Serialize + Sync,
{
    let payload = serde_json::to_value(payload).map_err(|err| GatewayError::remote(endpoint, err))?;
    gateway.call(endpoint, payload).await
}

fn decode<T: DeserializeOwned>(endpoint: EndpointKind, value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|err| GatewayError::shape(endpoint, err))
}

/// Fetches the contents of a file, the service answers with the raw file
pub async fn fetch_source<G: Gateway + ?Sized>(
    gateway: &G,
    request: &FetchSourceRequest,
) -> Result<String, GatewayError> {
    let endpoint = EndpointKind::FetchSource;

    match send(gateway, endpoint, request).await? {
        Value::String(code) => Ok(code),
        other => Err(GatewayError::shape(
            endpoint,
            format!("expected the file contents as a string, got {other}"),
        )),
    }
}

/// Asks for an edit, returns the updated code
pub async fn submit_edit<G: Gateway + ?Sized>(
    gateway: &G,
    request: &SubmitEditRequest,
) -> Result<String, GatewayError> {
    let endpoint = EndpointKind::SubmitEdit;
    let value = send(gateway, endpoint, request).await?;

    decode::<SubmitEditResponse>(endpoint, value).map(|response| response.new_code)
}

pub async fn execute<G: Gateway + ?Sized>(
    gateway: &G,
    request: &ExecuteRequest,
) -> Result<ExecutionOutput, GatewayError> {
    let endpoint = EndpointKind::Execute;
    let value = send(gateway, endpoint, request).await?;

    decode(endpoint, value)
}

/// Executes and returns the full response object, used when re-running test runs
pub async fn execute_raw<G: Gateway + ?Sized>(
    gateway: &G,
    request: &ExecuteRequest,
) -> Result<Map<String, Value>, GatewayError> {
    let endpoint = EndpointKind::Execute;

    match send(gateway, endpoint, request).await? {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::shape(
            endpoint,
            format!("expected an object with the run result, got {other}"),
        )),
    }
}
