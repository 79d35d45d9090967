//! Test helpers shared across relay crates.

pub mod transport;

pub use transport::{FailingTransport, StubTransport, json_response, text_response};
