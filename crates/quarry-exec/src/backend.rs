//! Collaborators that talk to the search backend.
//!
//! The engine only produces documents; implementations decide how they
//! travel (HTTP client, in-process index, recorder in tests).

use quarry_planner::SearchRequest;
use serde_json::Value;

use crate::error::Result;

pub trait SearchBackend: Send + Sync {
    /// Run `request` against `index` and return the `_source` of every hit,
    /// in result order.
    fn search(&self, index: &str, request: &SearchRequest) -> Result<Vec<Value>>;
}

pub trait IndexAdmin: Send + Sync {
    /// Create or update `index` with `body` (`{mappings}`).
    fn create_index(&self, index: &str, body: &Value) -> Result<()>;
}
