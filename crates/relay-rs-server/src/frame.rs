//! Decoding of a single input line into an action.

use relay_rs_protocol::{ProtocolError, Request, RequestFrame, ResponseFrame};
use relay_rs_tools::InvocationRequest;
use serde_json::Value;

/// What the server should do with one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Blank line; nothing to do.
    Skip,
    /// Answer immediately with this frame.
    Respond(ResponseFrame),
    /// Answer with the catalog listing.
    ListTools { id: Value },
    /// Dispatch a tool call and answer with its envelope.
    Call { id: Value, request: InvocationRequest },
}

/// Decode one input line.
///
/// Malformed frames become protocol error responses. The request `id` is
/// echoed whenever it can be recovered.
pub fn classify_line(line: &str) -> Action {
    let line = line.trim();
    if line.is_empty() {
        return Action::Skip;
    }
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => {
            return Action::Respond(ResponseFrame::error(
                Value::Null,
                ProtocolError::parse(format!("parse error: {err}")),
            ));
        }
    };
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let frame: RequestFrame = match serde_json::from_value(value) {
        Ok(frame) => frame,
        Err(err) => {
            return Action::Respond(ResponseFrame::error(
                id,
                ProtocolError::invalid_request(format!("invalid request: {err}")),
            ));
        }
    };
    match frame.to_request() {
        Ok(Request::Ping) => Action::Respond(ResponseFrame::pong(frame.id)),
        Ok(Request::ListTools) => Action::ListTools { id: frame.id },
        Ok(Request::CallTool(params)) => Action::Call {
            id: frame.id,
            request: InvocationRequest::from(params),
        },
        Err(err) => Action::Respond(ResponseFrame::error(frame.id, err)),
    }
}
