//! Ordered catalog of tools.

use crate::tool::{Tool, ToolDescriptor};
use log::debug;
use relay_rs_protocol::ToolListing;
use std::collections::HashMap;
use std::sync::Arc;

/// Errors raised while assembling a catalog at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A tool name was registered twice.
    #[error("duplicate tool registration: {0}")]
    DuplicateTool(String),
}

/// Read-only, ordered catalog of tools.
///
/// Listing order matches registration order.
#[derive(Default, Clone)]
pub struct ToolCatalog {
    /// Tools in registration order.
    tools: Vec<Arc<dyn Tool>>,
    /// Map of tool name to position in `tools`.
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from tools in declaration order.
    pub fn from_tools(
        tools: impl IntoIterator<Item = Arc<dyn Tool>>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for tool in tools {
            catalog.register(tool)?;
        }
        Ok(catalog)
    }

    /// Register a tool; fails if the name is already taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), CatalogError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(CatalogError::DuplicateTool(name));
        }
        debug!("registering tool (name={})", name);
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Fetch a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index
            .get(name)
            .and_then(|position| self.tools.get(*position))
            .cloned()
    }

    /// Fetch a descriptor by name.
    pub fn find(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index
            .get(name)
            .and_then(|position| self.tools.get(*position))
            .map(|tool| tool.descriptor())
    }

    /// Descriptors in declaration order.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|tool| tool.descriptor()).collect()
    }

    /// Tool names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the catalog has no tools.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Payload for the `tools/list` operation.
    pub fn listing(&self) -> ToolListing {
        ToolListing {
            tools: self.tools.iter().map(|tool| tool.descriptor().info()).collect(),
        }
    }
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, ToolCatalog};
    use crate::schema::{FieldSpec, Schema};
    use crate::tool::{Tool, ToolDescriptor};
    use crate::upstream::{HttpMethod, UpstreamRequest};
    use crate::validator::ValidatedArguments;
    use pretty_assertions::assert_eq;
    use relay_rs_protocol::ToolError;
    use std::sync::Arc;

    #[derive(Debug)]
    struct DummyTool {
        descriptor: ToolDescriptor,
    }

    impl DummyTool {
        fn new(name: &str) -> Self {
            Self {
                descriptor: ToolDescriptor::new(
                    name,
                    "dummy",
                    Schema::new(vec![FieldSpec::string("query", "Search terms").required()]),
                ),
            }
        }
    }

    impl Tool for DummyTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        fn failure_prefix(&self) -> &str {
            "Dummy failed"
        }

        fn build_request(&self, _args: &ValidatedArguments) -> Result<UpstreamRequest, ToolError> {
            UpstreamRequest::parse(HttpMethod::Get, "https://example.com/")
        }
    }

    #[test]
    fn catalog_preserves_declaration_order() {
        let catalog = ToolCatalog::from_tools([
            Arc::new(DummyTool::new("zeta")) as Arc<dyn Tool>,
            Arc::new(DummyTool::new("alpha")),
            Arc::new(DummyTool::new("mid")),
        ])
        .expect("catalog");

        assert_eq!(catalog.names(), vec!["zeta", "alpha", "mid"]);
        let listed = catalog
            .listing()
            .tools
            .into_iter()
            .map(|info| info.name)
            .collect::<Vec<_>>();
        assert_eq!(listed, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn find_returns_registered_descriptor() {
        let catalog = ToolCatalog::from_tools([
            Arc::new(DummyTool::new("one")) as Arc<dyn Tool>,
            Arc::new(DummyTool::new("two")),
        ])
        .expect("catalog");
        for descriptor in catalog.list() {
            assert_eq!(catalog.find(&descriptor.name), Some(descriptor));
        }
        assert!(catalog.find("three").is_none());
        assert!(catalog.get("three").is_none());
    }

    #[test]
    fn duplicate_names_fail_fast() {
        let err = ToolCatalog::from_tools([
            Arc::new(DummyTool::new("same")) as Arc<dyn Tool>,
            Arc::new(DummyTool::new("same")),
        ])
        .expect_err("duplicate");
        assert_eq!(err, CatalogError::DuplicateTool("same".to_string()));
    }
}
