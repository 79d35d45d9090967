//! Request routing: lookup, validation, request building, upstream call, and
//! normalization, always ending in exactly one envelope.

use crate::normalize::outcome_to_result;
use crate::registry::ToolCatalog;
use crate::upstream::UpstreamClient;
use crate::validator::validate;
use futures_util::FutureExt;
use log::{debug, info, warn};
use relay_rs_protocol::{CallToolParams, ResultEnvelope, ToolError, ToolListing};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// One tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    /// Tool to invoke.
    pub tool_name: String,
    /// Raw argument object.
    pub arguments: Value,
}

impl InvocationRequest {
    /// Create an invocation.
    pub fn new(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

impl From<CallToolParams> for InvocationRequest {
    fn from(params: CallToolParams) -> Self {
        Self::new(params.name, params.arguments)
    }
}

/// Pipeline stages of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Request received.
    Idle,
    /// Checking arguments against the schema.
    Validating,
    /// Mapping arguments to the outbound request.
    BuildingRequest,
    /// Waiting on the provider.
    AwaitingUpstream,
    /// Converting the outcome to an envelope.
    Normalizing,
    /// Envelope produced.
    Done,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::BuildingRequest => "building_request",
            Self::AwaitingUpstream => "awaiting_upstream",
            Self::Normalizing => "normalizing",
            Self::Done => "done",
        })
    }
}

/// Routes invocations through the catalog to the provider.
///
/// Holds only read-only state, so one instance serves any number of
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    catalog: Arc<ToolCatalog>,
    client: UpstreamClient,
}

impl Dispatcher {
    /// Create a dispatcher over a catalog and an upstream client.
    pub fn new(catalog: Arc<ToolCatalog>, client: UpstreamClient) -> Self {
        Self { catalog, client }
    }

    /// The tool catalog.
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Catalog listing in declaration order.
    pub fn list_tools(&self) -> ToolListing {
        self.catalog.listing()
    }

    /// Dispatch one invocation. Never fails and never panics past this call.
    pub async fn dispatch(&self, request: InvocationRequest) -> ResultEnvelope {
        let tool_name = request.tool_name.clone();
        debug!(
            "dispatch transition (tool_name={}, state={})",
            tool_name,
            DispatchState::Idle
        );
        let result = match AssertUnwindSafe(self.run(request)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(
                    "tool dispatch panicked (tool_name={}): {}",
                    tool_name, message
                );
                Err(ToolError::Internal(message))
            }
        };
        let envelope = ResultEnvelope::from(result);
        debug!(
            "dispatch transition (tool_name={}, state={})",
            tool_name,
            DispatchState::Done
        );
        info!(
            "tool call finished (tool_name={}, is_error={})",
            tool_name, envelope.is_error
        );
        envelope
    }

    async fn run(&self, request: InvocationRequest) -> Result<Value, ToolError> {
        let Some(tool) = self.catalog.get(&request.tool_name) else {
            return Err(ToolError::UnknownTool(request.tool_name));
        };

        transition(&request.tool_name, DispatchState::Validating);
        let args = validate(&tool.descriptor().schema, &request.arguments)?;

        transition(&request.tool_name, DispatchState::BuildingRequest);
        let upstream = tool.build_request(&args)?;

        transition(&request.tool_name, DispatchState::AwaitingUpstream);
        let outcome = self.client.send(&upstream).await;

        transition(&request.tool_name, DispatchState::Normalizing);
        outcome_to_result(outcome, tool.failure_prefix())
    }
}

fn transition(tool_name: &str, state: DispatchState) {
    debug!(
        "dispatch transition (tool_name={}, state={})",
        tool_name, state
    );
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool dispatch panicked".to_string()
    }
}
