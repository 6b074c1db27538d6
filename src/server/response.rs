//! Error responses for the HTTP surface.
//!
//! Every failure is caught at the endpoint boundary and rendered as
//! `{"error": "...", "details": "..."}` with a status from this table:
//!
//! | error | status |
//! |---|---|
//! | invalid input | 400 |
//! | configuration | 500 |
//! | timeout | 408 |
//! | upstream non-2xx | upstream status |
//! | unreachable | 503 |
//! | anything else | 500 |

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::GenrealError;
use crate::types::Service;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// An error on its way to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Map a forwarding failure for `service` to a response.
    pub fn from_error(service: Service, err: GenrealError) -> Self {
        let name = service.as_str();
        match err {
            GenrealError::InvalidInput(message) => Self::bad_request(message),
            GenrealError::Configuration(message) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error")
                    .details(message)
            }
            GenrealError::Timeout(_) => Self::new(
                StatusCode::REQUEST_TIMEOUT,
                format!("Request timeout - {name} analysis took too long"),
            )
            .details("The detection service may be experiencing high load."),
            GenrealError::Upstream {
                status,
                status_text,
                body,
            } => {
                let error = upstream_message(&body).unwrap_or_else(|| {
                    format!("{} API Error: {status}", service.display_name())
                });
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                let error = Self::new(status, error);
                if status_text.is_empty() {
                    error
                } else {
                    error.details(status_text)
                }
            }
            GenrealError::Unreachable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Unable to reach {name} analysis service"),
            )
            .details("The service may be temporarily unavailable."),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                .details(other.to_string()),
        }
    }

    /// Wrap an axum extractor rejection, keeping its status.
    pub fn rejection(status: StatusCode, body_text: String) -> Self {
        Self::new(status, body_text)
    }
}

/// Pull a human-readable message out of an upstream error body.
///
/// FastAPI reports `{"detail": "..."}`; other services use `{"error": "..."}`.
fn upstream_message(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => ["error", "detail"]
            .iter()
            .find_map(|key| map.get(*key)?.as_str())
            .map(str::to_string),
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
