//! Wire error format shared by every AfriFound HTTP surface.
//!
//! Clients only rely on `error`; `code` is a stable machine-readable tag that
//! may be absent.

use serde::{Deserialize, Serialize};

/// Uniform API error body: `{ "error": "...", "code": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human readable message, safe to show to end users
    pub error: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }
}

/// Stable error codes used by the messaging core
pub mod error_codes {
    // Identity
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";

    // Messaging Service
    pub const INVALID_TARGET: &str = "INVALID_TARGET";
    pub const EMPTY_CONTENT: &str = "EMPTY_CONTENT";
    pub const CONTENT_TOO_LONG: &str = "CONTENT_TOO_LONG";
    pub const CONVERSATION_NOT_FOUND: &str = "CONVERSATION_NOT_FOUND";
    pub const NOT_CONVERSATION_MEMBER: &str = "NOT_CONVERSATION_MEMBER";

    // Request shape
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

    // Database/System
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serializes_error_field() {
        let body = ErrorResponse::new("Message cannot be empty");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json, serde_json::json!({"error": "Message cannot be empty"}));
    }

    #[test]
    fn test_error_response_with_code() {
        let body = ErrorResponse::new("Conversation not found")
            .with_code(error_codes::CONVERSATION_NOT_FOUND);

        assert_eq!(body.code.as_deref(), Some("CONVERSATION_NOT_FOUND"));
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"code\":\"CONVERSATION_NOT_FOUND\""));
    }

    #[test]
    fn test_error_response_parses_without_code() {
        let body: ErrorResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(body, ErrorResponse::new("boom"));
    }
}
