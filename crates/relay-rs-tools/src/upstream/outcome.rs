//! Classification of raw responses into upstream outcomes.

use super::request::UpstreamRequest;
use super::transport::{HttpTransport, RawResponse, TransportError};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

/// Message used when a provider flags an error without describing it.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Result of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// The provider returned a usable payload.
    Success(Value),
    /// The provider could not be reached or its body was unreadable.
    TransportFailure(String),
    /// The provider reported a logical failure.
    ProviderError {
        /// Provider or HTTP status code, when known.
        code: Option<String>,
        /// Provider message, verbatim.
        message: String,
    },
}

/// Ways a provider embeds errors in a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorShape {
    /// `{"success": true, ...}` on success; any object without
    /// `success: true` is a failure described by `error`.
    SuccessFlag,
    /// `{"error": {"code": ..., "message": "..."}}`.
    ErrorObject,
    /// `{"errors": [{"code": ..., "message": "..."}]}`.
    ErrorsArray,
}

impl ErrorShape {
    /// Every known shape.
    pub const ALL: [ErrorShape; 3] = [Self::SuccessFlag, Self::ErrorObject, Self::ErrorsArray];

    /// Extract `(code, message)` when the payload carries this shape.
    pub fn detect(self, payload: &Value) -> Option<(Option<String>, String)> {
        match self {
            Self::SuccessFlag => {
                let object = payload.as_object()?;
                if object.get("success") == Some(&Value::Bool(true)) {
                    return None;
                }
                let message = match object.get("error") {
                    Some(Value::String(message)) => message.clone(),
                    Some(Value::Object(error)) => message_of(error.get("message")),
                    _ => UNKNOWN_ERROR.to_string(),
                };
                Some((None, message))
            }
            Self::ErrorObject => {
                let error = payload.get("error")?.as_object()?;
                Some((code_of(error.get("code")), message_of(error.get("message"))))
            }
            Self::ErrorsArray => {
                let errors = payload.get("errors")?.as_array()?;
                let first = errors.first()?;
                let messages = errors
                    .iter()
                    .filter_map(|entry| entry.get("message").and_then(Value::as_str))
                    .collect::<Vec<_>>();
                let message = if messages.is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    messages.join("; ")
                };
                Some((code_of(first.get("code")), message))
            }
        }
    }
}

/// Classify a transport result using the provider's error shapes.
pub fn classify(
    result: Result<RawResponse, TransportError>,
    shapes: &[ErrorShape],
) -> UpstreamOutcome {
    let response = match result {
        Ok(response) => response,
        Err(err) => return UpstreamOutcome::TransportFailure(err.to_string()),
    };

    let payload = match serde_json::from_str::<Value>(&response.body) {
        Ok(payload) => payload,
        Err(err) if response.is_success() => {
            return UpstreamOutcome::TransportFailure(format!("invalid JSON response: {err}"));
        }
        Err(_) => return status_error(&response),
    };

    if let Some((code, message)) = shapes.iter().find_map(|shape| shape.detect(&payload)) {
        let code = code.or_else(|| (!response.is_success()).then(|| response.status.to_string()));
        return UpstreamOutcome::ProviderError { code, message };
    }

    if !response.is_success() {
        return status_error(&response);
    }
    UpstreamOutcome::Success(payload)
}

/// Sends requests through a transport and classifies the result.
#[derive(Clone)]
pub struct UpstreamClient {
    transport: Arc<dyn HttpTransport>,
    shapes: Vec<ErrorShape>,
}

impl UpstreamClient {
    /// Create a client for a provider with the given error shapes.
    pub fn new(transport: Arc<dyn HttpTransport>, shapes: &[ErrorShape]) -> Self {
        Self {
            transport,
            shapes: shapes.to_vec(),
        }
    }

    /// Send a request and classify the response.
    pub async fn send(&self, request: &UpstreamRequest) -> UpstreamOutcome {
        let result = self.transport.execute(request).await;
        let outcome = classify(result, &self.shapes);
        match &outcome {
            UpstreamOutcome::Success(_) => debug!("upstream call succeeded (url={})", request.url),
            UpstreamOutcome::TransportFailure(message) => {
                warn!("upstream transport failure (url={}): {}", request.url, message);
            }
            UpstreamOutcome::ProviderError { code, message } => warn!(
                "upstream provider error (url={}, code={}): {}",
                request.url,
                code.as_deref().unwrap_or("-"),
                message
            ),
        }
        outcome
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("shapes", &self.shapes)
            .finish()
    }
}

fn status_error(response: &RawResponse) -> UpstreamOutcome {
    let message = match &response.reason {
        Some(reason) => format!("HTTP {} {}", response.status, reason),
        None => format!("HTTP {}", response.status),
    };
    UpstreamOutcome::ProviderError {
        code: Some(response.status.to_string()),
        message,
    }
}

fn code_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(code) => Some(code.clone()),
        Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}

fn message_of(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}
