//! Tool trait definition and descriptor metadata.

use crate::schema::Schema;
use crate::upstream::UpstreamRequest;
use crate::validator::ValidatedArguments;
use relay_rs_protocol::{ToolError, ToolInfo};
use std::fmt::Debug;

/// Static declaration of an invocable operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// Unique, stable tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Accepted arguments.
    pub schema: Schema,
}

impl ToolDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }

    /// Render the descriptor for the listing operation.
    pub fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.schema.to_json_schema(),
        }
    }
}

/// A catalog entry: descriptor plus the request builder for one upstream call.
pub trait Tool: Send + Sync + Debug {
    /// Return the tool descriptor.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Prefix placed before provider failure messages, e.g. "Search failed".
    fn failure_prefix(&self) -> &str;

    /// Map validated arguments to the outbound request.
    ///
    /// Must be deterministic and free of side effects.
    fn build_request(&self, args: &ValidatedArguments) -> Result<UpstreamRequest, ToolError>;

    /// Return the tool name.
    fn name(&self) -> &str {
        &self.descriptor().name
    }
}
