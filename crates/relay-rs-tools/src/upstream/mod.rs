//! Upstream request model, transport seam, and response classification.

mod auth;
mod outcome;
mod request;
mod transport;

pub use auth::{Auth, Endpoint, EndpointError, Secret};
pub use outcome::{ErrorShape, UpstreamClient, UpstreamOutcome, classify};
pub use request::{HttpMethod, UpstreamRequest};
pub use transport::{HttpOptions, HttpTransport, RawResponse, ReqwestTransport, TransportError};
