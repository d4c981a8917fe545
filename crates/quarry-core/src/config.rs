//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the search backend. Only the transport collaborator reads it.
    pub backend_url: String,

    /// Optional prefix applied to every dataset's index name.
    pub index_prefix: Option<String>,

    /// Trace every compiled query document (requires the `tracing` feature).
    pub log_queries: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:9200".to_string(),
            index_prefix: None,
            log_queries: false,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `QUARRY_BACKEND_URL`: search backend base URL
    /// - `QUARRY_INDEX_PREFIX`: prefix for index names
    /// - `QUARRY_LOG_QUERIES`: `1`/`true` to trace compiled queries
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(s) = lookup("QUARRY_BACKEND_URL") {
            cfg.backend_url = s.trim_end_matches('/').to_string();
        }

        if let Some(s) = lookup("QUARRY_INDEX_PREFIX") {
            cfg.index_prefix = Some(s).filter(|p| !p.is_empty());
        }

        if let Some(s) = lookup("QUARRY_LOG_QUERIES") {
            if let Some(v) = parse_flag(&s) {
                cfg.log_queries = v;
            }
        }

        cfg
    }

    /// Physical index name for a dataset's configured index.
    pub fn index_name(&self, index: &str) -> String {
        match &self.index_prefix {
            Some(prefix) => format!("{prefix}{index}"),
            None => index.to_string(),
        }
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
