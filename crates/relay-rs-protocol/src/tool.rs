/// Errors surfaced by a tool call.
///
/// The `Display` output of each variant is the exact text placed in an error
/// [`ResultEnvelope`](crate::ResultEnvelope).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// Tool name was not found in the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    /// Tool received invalid arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// The upstream could not be reached or returned an unreadable body.
    #[error("API request failed: {0}")]
    Transport(String),
    /// The upstream reported a logical failure.
    #[error("{prefix}: {message}")]
    Provider {
        /// Operation-specific prefix, e.g. "Search failed".
        prefix: String,
        /// Provider error code when one was reported.
        code: Option<String>,
        /// Provider message, kept verbatim.
        message: String,
    },
    /// Any other fault inside the dispatch pipeline.
    #[error("Error: {0}")]
    Internal(String),
}
