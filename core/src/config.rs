//! Client settings loadable from any serde source.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Client settings that can be loaded from any serde source.
///
/// ```
/// let config: fetch_core::ClientConfig = serde_json::from_str(
///     r#"{ "base_url": "http://localhost:8080", "default_headers": { "Accept": "application/json" } }"#,
/// )
/// .unwrap();
/// assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Absolute URL that relative request URLs are resolved against.
    pub base_url: Option<String>,
    /// Headers added to every request that does not set them itself.
    pub default_headers: BTreeMap<String, String>,
}
