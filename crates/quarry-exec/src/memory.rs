//! In-process search backend.
//!
//! Stores documents per index and evaluates compiled search bodies with
//! [`crate::eval`]. Used by tests and the CLI's `search` command.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use quarry_planner::SearchRequest;
use serde_json::{json, Value};

use crate::backend::{IndexAdmin, SearchBackend};
use crate::error::{ExecError, Result};
use crate::eval::{sort_documents, MappingView, Matcher};

#[derive(Debug)]
struct IndexState {
    /// `{properties}`; empty until the index is created.
    mapping: Value,
    docs: Vec<Value>,
}

impl Default for IndexState {
    fn default() -> Self {
        Self {
            mapping: empty_mapping(),
            docs: Vec::new(),
        }
    }
}

/// Thread-safe in-memory indices.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    indices: Arc<Mutex<HashMap<String, IndexState>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, IndexState>>> {
        self.indices
            .lock()
            .map_err(|_| ExecError::Backend("memory backend lock poisoned".into()))
    }

    /// Append a document, creating the index without a mapping if needed.
    pub fn insert(&self, index: &str, doc: Value) -> Result<()> {
        self.lock()?.entry(index.to_string()).or_default().docs.push(doc);
        Ok(())
    }

    pub fn extend(&self, index: &str, docs: impl IntoIterator<Item = Value>) -> Result<()> {
        self.lock()?.entry(index.to_string()).or_default().docs.extend(docs);
        Ok(())
    }

    pub fn len(&self, index: &str) -> Result<usize> {
        Ok(self.lock()?.get(index).map_or(0, |state| state.docs.len()))
    }

    pub fn mapping(&self, index: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(index).map(|state| state.mapping.clone()))
    }

    pub fn indices(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.lock()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl SearchBackend for MemoryBackend {
    fn search(&self, index: &str, request: &SearchRequest) -> Result<Vec<Value>> {
        let indices = self.lock()?;
        let state = indices
            .get(index)
            .ok_or_else(|| ExecError::Backend(format!("no such index '{index}'")))?;
        let view = MappingView::new(&state.mapping);
        let matcher = Matcher::new(view);

        let mut hits = Vec::new();
        for doc in &state.docs {
            if matcher.matches(&request.query, doc)? {
                hits.push(doc.clone());
            }
        }
        if let Some(sort) = &request.sort {
            sort_documents(&mut hits, sort, &view)?;
        }
        Ok(hits)
    }
}

impl IndexAdmin for MemoryBackend {
    fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        let mapping = body
            .get("mappings")
            .cloned()
            .ok_or_else(|| ExecError::Backend(format!("index body for '{index}' has no mappings")))?;
        let mut indices = self.lock()?;
        let state = indices.entry(index.to_string()).or_default();
        state.mapping = mapping;
        Ok(())
    }
}

/// An empty mapping, for indices created implicitly by `insert`.
pub fn empty_mapping() -> Value {
    json!({ "properties": {} })
}
