//! NATS message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generic request wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T> Request<T> {
    pub fn new(payload: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Generic success response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(request_id: Uuid, payload: T) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(request_id: Uuid, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Empty payload for requests that carry no parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyPayload {}

/// Fire-and-forget notification published after a mutation so open
/// frontends can refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub table: String,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_round_trip() {
        let request = Request::new(EmptyPayload {});
        let bytes = serde_json::to_vec(&request).unwrap();
        let parsed: Request<EmptyPayload> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.id, request.id);
    }

    #[test]
    fn test_empty_payload_parses_from_empty_object() {
        let request: Request<EmptyPayload> = serde_json::from_str(
            r#"{"id":"3fa1fbb4-4a7e-4a37-8e52-1f253ed9f1b5","timestamp":"2024-03-01T00:00:00Z","payload":{}}"#,
        )
        .unwrap();
        assert!(serde_json::to_string(&request).is_ok());
    }

    #[test]
    fn test_error_response_shape() {
        let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", "bad payload");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_REQUEST");
        assert!(json["error"].get("details").is_none());
    }
}
