//! Configuration models, layered config loading, and credential resolution.
//!
//! This crate owns the relay config schema, validation, and layer-merging
//! logic used by the `relay` binary.

mod credentials;
mod error;
mod loader;
mod model;

/// Credential lookup from the process environment or an injected source.
pub use credentials::{env_lookup, resolve_credentials};
/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
