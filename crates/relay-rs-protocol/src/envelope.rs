//! Uniform success/failure wrapper returned for every tool call.

use crate::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single return contract of a tool call.
///
/// On the wire it is rendered as a one-element text content list:
/// `{"content":[{"type":"text","text":...}],"isError":bool}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EnvelopeWire", from = "EnvelopeWire")]
pub struct ResultEnvelope {
    /// Whether the call failed.
    pub is_error: bool,
    /// Pretty-printed payload or failure description.
    pub text: String,
}

impl ResultEnvelope {
    /// Build a success envelope from an upstream payload.
    pub fn success(payload: &Value) -> Self {
        // Serializing a `Value` cannot fail; fall back to compact output regardless.
        let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        Self {
            is_error: false,
            text,
        }
    }

    /// Build an error envelope from any tool failure.
    pub fn failure(err: &ToolError) -> Self {
        Self {
            is_error: true,
            text: err.to_string(),
        }
    }
}

impl From<Result<Value, ToolError>> for ResultEnvelope {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(payload) => Self::success(&payload),
            Err(err) => Self::failure(&err),
        }
    }
}

/// Text content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    /// Content kind; always `text`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Text body.
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnvelopeWire {
    content: Vec<TextContent>,
    #[serde(rename = "isError", default)]
    is_error: bool,
}

impl From<ResultEnvelope> for EnvelopeWire {
    fn from(envelope: ResultEnvelope) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text: envelope.text,
            }],
            is_error: envelope.is_error,
        }
    }
}

impl From<EnvelopeWire> for ResultEnvelope {
    fn from(wire: EnvelopeWire) -> Self {
        let text = wire
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            is_error: wire.is_error,
            text,
        }
    }
}
