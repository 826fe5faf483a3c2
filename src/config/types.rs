//! Configuration type definitions.
//!
//! These types are pure data - no I/O or complex logic.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Import configuration
// =============================================================================

/// Top-level `unmedium.yaml`.
///
/// ```yaml
/// content_dir: content
/// embed_base: https://medium.com
/// concurrency: 4
/// http:
///   timeout_secs: 30
///   user_agent: unmedium/0.1.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Directory that receives one `<slug>/index.md` folder per document
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    /// Origin that embed frame paths (`/media/<id>`) are resolved against
    #[serde(default = "default_embed_base")]
    pub embed_base: String,
    /// How many documents the CLI converts at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            embed_base: default_embed_base(),
            concurrency: default_concurrency(),
            http: HttpConfig::default(),
        }
    }
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_embed_base() -> String {
    "https://medium.com".to_string()
}

fn default_concurrency() -> usize {
    4
}

// =============================================================================
// HTTP client configuration
// =============================================================================

/// Settings for the HTTP client shared by every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("unmedium/", env!("CARGO_PKG_VERSION")).to_string()
}
