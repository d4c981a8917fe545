#![forbid(unsafe_code)]
//! quarry-exec: the engine that ties a catalog to a search backend.
//!
//! The engine builds the API schema once, compiles request arguments with
//! `quarry-planner`, and hands the documents to a `SearchBackend` /
//! `IndexAdmin`. `MemoryBackend` evaluates them in-process.

pub mod backend;
pub mod engine;
pub mod error;
pub mod eval;
pub mod memory;
pub mod metrics;

pub use backend::{IndexAdmin, SearchBackend};
pub use engine::Engine;
pub use error::{ExecError, Result};
pub use memory::MemoryBackend;
