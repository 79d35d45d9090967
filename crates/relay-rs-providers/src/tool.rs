//! Catalog entry shared by every provider tool.

use relay_rs_protocol::ToolError;
use relay_rs_tools::{Endpoint, Tool, ToolDescriptor, UpstreamRequest, ValidatedArguments};
use std::fmt;
use std::sync::Arc;

/// Maps validated arguments to a request against one endpoint.
pub type BuildFn = fn(&Endpoint, &ValidatedArguments) -> Result<UpstreamRequest, ToolError>;

/// Descriptor, failure prefix and builder for one provider operation.
pub struct ProviderTool {
    descriptor: ToolDescriptor,
    failure_prefix: &'static str,
    endpoint: Arc<Endpoint>,
    build: BuildFn,
}

impl ProviderTool {
    /// Create a tool bound to a provider endpoint.
    pub fn new(
        descriptor: ToolDescriptor,
        failure_prefix: &'static str,
        endpoint: Arc<Endpoint>,
        build: BuildFn,
    ) -> Self {
        Self {
            descriptor,
            failure_prefix,
            endpoint,
            build,
        }
    }
}

impl Tool for ProviderTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn failure_prefix(&self) -> &str {
        self.failure_prefix
    }

    fn build_request(&self, args: &ValidatedArguments) -> Result<UpstreamRequest, ToolError> {
        (self.build)(&self.endpoint, args)
    }
}

impl fmt::Debug for ProviderTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderTool")
            .field("name", &self.descriptor.name)
            .field("failure_prefix", &self.failure_prefix)
            .field("base_url", &self.endpoint.base_url().as_str())
            .finish()
    }
}
