//! Request issuance
//!
//! The executor only needs the ability to send one selection tree and
//! get back data or a structured failure; [`GraphClient`] is that
//! seam. [`HttpGraphClient`] is the production implementation,
//! posting the rendered selection as JSON. Tests substitute scripted
//! implementations.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{RequestError, RequestResult, ServerError};

/// The request-issuing capability consumed by the executor.
#[async_trait]
pub trait GraphClient {
    /// Send one rendered selection tree; returns the response data or
    /// a structured failure carrying the server's error list.
    async fn issue(&self, request: &Value) -> RequestResult<Value>;
}

/// HTTP transport posting `{"query": <selection>}` to one endpoint.
pub struct HttpGraphClient {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpGraphClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GraphClient for HttpGraphClient {
    async fn issue(&self, request: &Value) -> RequestResult<Value> {
        debug!(endpoint = %self.endpoint, "issuing request");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": request }))
            .send()
            .await?;
        let body: Value = response.json().await?;
        decode_response(body)
    }
}

/// Split a response body into data or a server-error failure.
fn decode_response(body: Value) -> RequestResult<Value> {
    if let Some(errors) = body.get("errors") {
        let errors: Vec<ServerError> = serde_json::from_value(errors.clone())
            .map_err(|e| RequestError::MalformedResponse(format!("unreadable errors: {e}")))?;
        if !errors.is_empty() {
            return Err(RequestError::Server(errors));
        }
    }
    match body.get("data") {
        Some(data) => Ok(data.clone()),
        None => Err(RequestError::MalformedResponse(
            "response carried neither data nor errors".to_string(),
        )),
    }
}
