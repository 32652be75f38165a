//! # Configuration Modules
//!
//! Layered (defaults, JSON file, environment) configuration for retrievals.

/// Retrieval and endpoint settings with field-by-field merging.
pub mod retrieval_config;

pub use retrieval_config::{EndpointConfig, RetrievalConfig, ENV_PREFIX};
