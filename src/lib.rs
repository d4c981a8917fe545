//! quarry: typed search APIs and backend queries derived from record schemas.
//!
//! Re-exports the common entry points of the workspace crates.

pub use quarry_core::{ApiSchema, EngineConfig, Error, Field, Primitive, RecordType, Result};
pub use quarry_exec::{Engine, ExecError, MemoryBackend};
pub use quarry_handlers::{ComputedField, HandlerRegistry};
pub use quarry_planner::{parse_yaml_catalog, Catalog, Dataset, SearchRequest};
