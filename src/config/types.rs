//! Configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::FallbackPolicy;
use crate::matcher::{DEFAULT_THRESHOLD, MAX_SEARCH_RESULTS};

/// Returns the default path for the knowledge database.
///
/// This is `~/.local/share/knowledge-responder/knowledge.db` on Unix systems.
#[must_use]
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("knowledge-responder")
        .join("knowledge.db")
}

/// Matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum similarity for a stored answer to be used.
    pub threshold: f64,
    /// Maximum free-text search results (never more than 10).
    pub search_limit: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            search_limit: MAX_SEARCH_RESULTS,
        }
    }
}

/// Fallback reply configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FallbackConfig {
    pub policy: FallbackPolicy,
    /// Seed for reproducible random choice.
    pub seed: Option<u64>,
    /// Reply pool; empty means the built-in replies.
    pub replies: Vec<String>,
}

/// Database location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// HTTP API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable permissive CORS.
    pub cors_permissive: bool,
}

/// Default port for the HTTP API.
pub const DEFAULT_PORT: u16 = 5000;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_permissive: true,
        }
    }
}

impl ServerConfig {
    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level configuration for the responder.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ResponderConfig {
    pub matcher: MatcherConfig,
    pub fallback: FallbackConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}
