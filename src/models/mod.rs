//! Data models representing database entities and API bodies.

/// API key authentication model
pub mod api_key;
/// Invoice draft model
pub mod draft;
/// PDF settings model
pub mod settings;
