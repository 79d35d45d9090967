//! Line-delimited stdio transport for relay adapters.
//!
//! Reads one request frame per line, dispatches tool calls concurrently, and
//! writes one response frame per line through a single writer task.

mod error;
mod frame;
mod stdio;

/// Server error type.
pub use error::ServerError;
/// Frame handling for a single input line.
pub use frame::{Action, classify_line};
/// Stdio server.
pub use stdio::StdioServer;
