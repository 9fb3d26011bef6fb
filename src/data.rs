//! Data structures and serialization.

use anyhow::{Context, Result};
use serde::Serialize;

pub mod authors;

pub use authors::*;

/// Serializes a value to YAML.
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).context("Failed to serialize to YAML")
}

/// Serializes a value to pretty-printed JSON.
pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize to JSON")
}
