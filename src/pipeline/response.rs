//! Internal and platform-facing response representations.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// The pipeline's internal response: a status, a structured body, and
/// headers. Handlers may build one directly; raw handler values are wrapped
/// into a 200 response by the invoke stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP-shaped status code.
    pub status: u16,
    /// Structured body, materialized by the respond stage.
    pub body: Value,
    /// Response headers.
    pub headers: HashMap<String, String>,
}

impl Response {
    /// A 200 response around a body.
    pub fn ok(body: Value) -> Self {
        Self::with_status(200, body)
    }

    /// A response with an explicit status.
    pub fn with_status(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            headers: HashMap::new(),
        }
    }

    /// An error response carrying a message body.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::with_status(status, json!({ "error": message.into() }))
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The platform-facing response representation the respond stage produces:
/// the body serialized to its wire form.
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingResponse {
    /// HTTP-shaped status code.
    pub status: u16,
    /// Serialized body.
    pub body: String,
    /// Response headers.
    pub headers: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_wraps_body_with_status_200() {
        let response = Response::ok(json!({"id": 7}));
        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({"id": 7}));
        assert!(response.is_success());
    }

    #[test]
    fn error_carries_message_body() {
        let response = Response::error(500, "handler failed");
        assert_eq!(response.status, 500);
        assert_eq!(response.body, json!({"error": "handler failed"}));
        assert!(!response.is_success());
    }

    #[test]
    fn response_roundtrip_serialization() {
        let response = Response::with_status(201, json!({"created": true}));
        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: Response = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, response);
    }
}
