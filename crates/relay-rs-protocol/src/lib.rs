//! Wire protocol types for Relay adapters: request/response frames, tool
//! listings, and the uniform result envelope.

mod envelope;
mod tool;

pub use envelope::{ResultEnvelope, TextContent};
pub use tool::ToolError;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Method name for the catalog listing operation.
pub const METHOD_LIST_TOOLS: &str = "tools/list";
/// Method name for the tool invocation operation.
pub const METHOD_CALL_TOOL: &str = "tools/call";
/// Method name for liveness checks.
pub const METHOD_PING: &str = "ping";

/// A single inbound line, before the method is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFrame {
    /// Caller-chosen correlation id, echoed back verbatim.
    #[serde(default)]
    pub id: Value,
    /// Requested operation.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Value,
}

/// Operations an adapter accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// List the tool catalog.
    ListTools,
    /// Invoke one tool.
    CallTool(CallToolParams),
    /// Liveness probe.
    Ping,
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Tool name to invoke.
    pub name: String,
    /// Raw argument object; `null` when omitted.
    #[serde(default)]
    pub arguments: Value,
}

impl RequestFrame {
    /// Interpret the frame's method and parameters.
    pub fn to_request(&self) -> Result<Request, ProtocolError> {
        match self.method.as_str() {
            METHOD_LIST_TOOLS => Ok(Request::ListTools),
            METHOD_PING => Ok(Request::Ping),
            METHOD_CALL_TOOL => {
                let params: CallToolParams = serde_json::from_value(self.params.clone())
                    .map_err(|err| ProtocolError::invalid_params(err.to_string()))?;
                Ok(Request::CallTool(params))
            }
            other => Err(ProtocolError::method_not_found(other)),
        }
    }
}

/// Protocol-level failure for malformed frames.
///
/// Tool failures never use this type; they travel inside a [`ResultEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("protocol error {code}: {message}")]
pub struct ProtocolError {
    /// JSON-RPC style error code.
    pub code: i64,
    /// Human-readable detail.
    pub message: String,
}

impl ProtocolError {
    /// Line was not valid JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// Line was JSON but not a request frame.
    pub const INVALID_REQUEST: i64 = -32600;
    /// Method is not supported.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Method parameters could not be decoded.
    pub const INVALID_PARAMS: i64 = -32602;
    /// The response could not be produced.
    pub const INTERNAL_ERROR: i64 = -32603;

    /// Build a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            code: Self::PARSE_ERROR,
            message: message.into(),
        }
    }

    /// Build an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: Self::INVALID_REQUEST,
            message: message.into(),
        }
    }

    /// Build a method-not-found error.
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: Self::METHOD_NOT_FOUND,
            message: format!("method not found: {method}"),
        }
    }

    /// Build an invalid-params error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: Self::INVALID_PARAMS,
            message: message.into(),
        }
    }

    /// Build an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: Self::INTERNAL_ERROR,
            message: message.into(),
        }
    }
}

/// A single outbound line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    /// Correlation id copied from the request.
    pub id: Value,
    /// Result or protocol error.
    #[serde(flatten)]
    pub body: ResponseBody,
}

/// Payload of a response frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseBody {
    /// Successful protocol exchange (tool errors included).
    Result(Value),
    /// Malformed frame.
    Error(ProtocolError),
}

impl ResponseFrame {
    /// Build a result frame.
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            id,
            body: ResponseBody::Result(result),
        }
    }

    /// Build a protocol error frame.
    pub fn error(id: Value, error: ProtocolError) -> Self {
        Self {
            id,
            body: ResponseBody::Error(error),
        }
    }

    /// Build the empty result returned for `ping`.
    pub fn pong(id: Value) -> Self {
        Self::result(id, Value::Object(Map::new()))
    }
}

/// Tool metadata as published by the listing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Stable tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON schema describing accepted arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Result of the `tools/list` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolListing {
    /// Tools in declaration order.
    pub tools: Vec<ToolInfo>,
}
