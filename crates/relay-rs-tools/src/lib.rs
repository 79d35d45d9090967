//! Tool catalog, argument validation, and upstream dispatch for relay gateways.

pub mod dispatcher;
pub mod normalize;
pub mod registry;
pub mod schema;
pub mod tool;
pub mod upstream;
pub mod validator;

/// Invocation routing.
pub use dispatcher::{DispatchState, Dispatcher, InvocationRequest};
/// Outcome normalization.
pub use normalize::{normalize, outcome_to_result};
/// Tool catalog type.
pub use registry::{CatalogError, ToolCatalog};
/// Argument schema types.
pub use schema::{FieldKind, FieldSpec, Schema};
/// Tool trait and descriptor type.
pub use tool::{Tool, ToolDescriptor};
/// Upstream request and transport types.
pub use upstream::{
    Auth, Endpoint, EndpointError, ErrorShape, HttpMethod, HttpOptions, HttpTransport,
    RawResponse, ReqwestTransport, Secret, TransportError, UpstreamClient, UpstreamOutcome,
    UpstreamRequest, classify,
};
/// Argument validation.
pub use validator::{ValidatedArguments, ValidationError, validate};
