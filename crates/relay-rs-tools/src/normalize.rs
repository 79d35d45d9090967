//! Conversion of upstream outcomes into result envelopes.

use crate::upstream::UpstreamOutcome;
use relay_rs_protocol::{ResultEnvelope, ToolError};
use serde_json::Value;

/// Map an outcome to the payload or the tool failure it represents.
pub fn outcome_to_result(outcome: UpstreamOutcome, failure_prefix: &str) -> Result<Value, ToolError> {
    match outcome {
        UpstreamOutcome::Success(payload) => Ok(payload),
        UpstreamOutcome::TransportFailure(message) => Err(ToolError::Transport(message)),
        UpstreamOutcome::ProviderError { code, message } => Err(ToolError::Provider {
            prefix: failure_prefix.to_string(),
            code,
            message,
        }),
    }
}

/// Normalize an outcome into the envelope returned to callers.
///
/// Success payloads are passed through verbatim, pretty-printed.
pub fn normalize(outcome: UpstreamOutcome, failure_prefix: &str) -> ResultEnvelope {
    ResultEnvelope::from(outcome_to_result(outcome, failure_prefix))
}
