use async_trait::async_trait;
use serde_json::Value;

use crate::config::Endpoints;

use super::{EndpointKind, Gateway, GatewayError};

/// Talks to the execution service over http
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpGateway {
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    #[tracing::instrument(skip(self, payload), err)]
    async fn call(&self, endpoint: EndpointKind, payload: Value) -> Result<Value, GatewayError> {
        let url = self.endpoints.url(endpoint);
        tracing::debug!(%url, "Sending request to {endpoint}");

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| GatewayError::remote(endpoint, err))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|err| GatewayError::remote(endpoint, err))?;

        if !status.is_success() {
            return Err(GatewayError::remote(
                endpoint,
                format!("service responded with {status}: {body}"),
            ));
        }

        decode_body(endpoint, content_type.as_deref(), &body)
    }
}

/// Decodes a response body
///
/// Bodies that are not json are returned as a json string. Lambda proxy envelopes
/// (`statusCode` + `body`) are unwrapped.
///
/// The source endpoint answers with the raw file, which must survive byte for byte. Its body is
/// only decoded when the service declares it as json, and then only a json string or an envelope
/// is unwrapped. Anything else is handed back as the text that was received.
pub(crate) fn decode_body(
    endpoint: EndpointKind,
    content_type: Option<&str>,
    body: &str,
) -> Result<Value, GatewayError> {
    let raw_file = endpoint == EndpointKind::FetchSource;
    let verbatim = || Value::String(body.to_string());

    if raw_file && !content_type.is_some_and(is_json_media_type) {
        return Ok(verbatim());
    }

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Ok(verbatim());
    };

    let Some((status, inner)) = lambda_envelope(&value) else {
        return Ok(match value {
            Value::String(_) => value,
            _ if raw_file => verbatim(),
            other => other,
        });
    };

    if status >= 400 {
        return Err(GatewayError::remote(
            endpoint,
            format!("service responded with status {status}: {inner}"),
        ));
    }

    Ok(match inner {
        Value::String(raw) if raw_file => Value::String(raw.clone()),
        Value::String(raw) => parse_lenient(raw),
        other if raw_file => Value::String(other.to_string()),
        other => other.clone(),
    })
}

fn lambda_envelope(value: &Value) -> Option<(u64, &Value)> {
    let map = value.as_object()?;
    let status = map.get("statusCode").and_then(Value::as_u64)?;

    map.get("body").map(|inner| (status, inner))
}

/// `application/json` and structured suffixes such as `application/problem+json`
fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || essence.ends_with("+json")
}

fn parse_lenient(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
