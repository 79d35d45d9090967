//! Schema validation helpers for relay JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Provider blocks accepted under `providers`.
const PROVIDER_KEYS: [&str; 3] = ["ancestry", "familysearch", "marketstack"];

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &["$schema", "adapter", "http", "server", "providers"],
        layer,
        "",
    )?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("adapter") {
        expect_string(value, layer, "adapter")?;
    }
    if let Some(value) = map.get("http") {
        validate_http(value, layer, "http")?;
    }
    if let Some(value) = map.get("server") {
        validate_server(value, layer, "server")?;
    }
    if let Some(value) = map.get("providers") {
        validate_providers(value, layer, "providers")?;
    }
    Ok(())
}

/// Validate the "http" block.
fn validate_http(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["timeout_secs", "user_agent"], layer, path)?;

    if let Some(value) = map.get("timeout_secs") {
        expect_u64(value, layer, &join_path(path, "timeout_secs"))?;
    }
    if let Some(value) = map.get("user_agent") {
        expect_string(value, layer, &join_path(path, "user_agent"))?;
    }
    Ok(())
}

/// Validate the "server" block.
fn validate_server(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["max_in_flight"], layer, path)?;

    if let Some(value) = map.get("max_in_flight") {
        expect_u64(value, layer, &join_path(path, "max_in_flight"))?;
    }
    Ok(())
}

/// Validate the "providers" block and each provider entry.
fn validate_providers(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &PROVIDER_KEYS, layer, path)?;

    for (name, provider) in map {
        validate_provider(provider, layer, &join_path(path, name))?;
    }
    Ok(())
}

/// Validate a single provider definition.
fn validate_provider(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["base_url", "api_key_env", "api_secret_env"],
        layer,
        path,
    )?;

    for key in ["base_url", "api_key_env", "api_secret_env"] {
        if let Some(value) = map.get(key) {
            expect_non_empty_string(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a non-blank JSON string.
fn expect_non_empty_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    match value.as_str() {
        Some(text) if !text.trim().is_empty() => Ok(()),
        Some(_) => Err(invalid_field(layer, path, "expected non-empty string")),
        None => Err(invalid_field(layer, path, "expected string")),
    }
}

/// Expect a non-negative JSON integer.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
