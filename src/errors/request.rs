//! Request failure types
//!
//! The remote API reports failures as a list of structured errors,
//! each with a message, an optional path into the response shape, and
//! an optional extensions map carrying a machine-readable error code.
//! [`ServerError`] mirrors that wire shape; [`RequestError`] wraps the
//! list together with local transport failures.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error-code extension value marking an authorization denial.
pub const ACCESS_DENIED_CODE: &str = "ACCESS_DENIED";

/// Extensions key holding the machine-readable error code.
pub const CODE_KEY: &str = "code";

/// Extensions key holding the human-readable required-access hint.
pub const REQUIRED_ACCESS_KEY: &str = "requiredAccess";

/// One structured error as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerError {
    /// Human-readable description
    pub message: String,

    /// Location of the failure inside the response shape; entries are
    /// field names or list indices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,

    /// Machine-readable metadata (error code, required access, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl ServerError {
    /// The `code` extension, when present as a string.
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get(CODE_KEY))
            .and_then(Value::as_str)
    }

    /// The `requiredAccess` extension, when present as a string.
    pub fn required_access(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get(REQUIRED_ACCESS_KEY))
            .and_then(Value::as_str)
    }

    /// Whether this error is an authorization denial.
    pub fn is_access_denied(&self) -> bool {
        self.code() == Some(ACCESS_DENIED_CODE)
    }
}

/// Failures raised while issuing a request.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The server answered with structured errors
    #[error("request failed: {}", summarize(.0))]
    Server(Vec<ServerError>),

    /// The request never produced a usable response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body had neither data nor errors
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl RequestError {
    /// Whether this failure carries at least one authorization denial.
    pub fn is_authorization_failure(&self) -> bool {
        match self {
            RequestError::Server(errors) => errors.iter().any(ServerError::is_access_denied),
            _ => false,
        }
    }

    /// The server error list, when this is a server-reported failure.
    pub fn server_errors(&self) -> Option<&[ServerError]> {
        match self {
            RequestError::Server(errors) => Some(errors),
            _ => None,
        }
    }
}

fn summarize(errors: &[ServerError]) -> String {
    match errors {
        [] => "server reported no errors".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn denied(message: &str) -> ServerError {
        ServerError {
            message: message.to_string(),
            path: None,
            extensions: Some(
                json!({"code": ACCESS_DENIED_CODE})
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
        }
    }

    #[test]
    fn access_denied_code_is_recognized() {
        let err = denied("no access to secretField");
        assert!(err.is_access_denied());
        assert_eq!(err.code(), Some(ACCESS_DENIED_CODE));
    }

    #[test]
    fn other_codes_are_not_denials() {
        let err = ServerError {
            message: "boom".to_string(),
            path: None,
            extensions: Some(json!({"code": "INTERNAL_ERROR"}).as_object().cloned().unwrap()),
        };
        assert!(!err.is_access_denied());
    }

    #[test]
    fn authorization_failure_requires_a_denial() {
        let failure = RequestError::Server(vec![denied("nope")]);
        assert!(failure.is_authorization_failure());

        let failure = RequestError::Server(vec![ServerError {
            message: "not found".to_string(),
            path: None,
            extensions: Some(json!({"code": "NOT_FOUND"}).as_object().cloned().unwrap()),
        }]);
        assert!(!failure.is_authorization_failure());
    }

    #[test]
    fn display_summarizes_multiple_errors() {
        let failure = RequestError::Server(vec![denied("first"), denied("second")]);
        assert_eq!(failure.to_string(), "request failed: first (and 1 more)");
    }

    #[test]
    fn server_error_round_trips_through_json() {
        let wire = json!({
            "message": "no access",
            "path": ["repo", "secrets", 0],
            "extensions": {"code": "ACCESS_DENIED", "requiredAccess": "admin:repo"}
        });
        let err: ServerError = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(err.required_access(), Some("admin:repo"));
        assert_eq!(serde_json::to_value(&err).unwrap(), wire);
    }
}
