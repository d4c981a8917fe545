#![forbid(unsafe_code)]
//! quarry-core: the pure data layer shared by every other quarry crate.
//!
//! - `schema`: record schemas (`SchemaType`, `RecordType`, `Field`, `FieldPath`)
//! - `api`: the query-facing type model (`TypeRef`, `NamedType`, `ApiSchema`)
//! - `emit`: the named-type emission registry (`Emitted`, `Definitions`)
//! - `config`, `error`, `hash`: ambient pieces
//!
//! Nothing in here performs I/O.

pub mod api;
pub mod config;
pub mod emit;
pub mod error;
pub mod hash;
pub mod prelude;
pub mod schema;

/// Crate version, recorded alongside schema fingerprints.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use api::{ApiSchema, InputValue, NamedType, ObjectField, TypeBody, TypeRef};
pub use config::EngineConfig;
pub use emit::{Definitions, Emitted, Pending};
pub use error::{Error, Result};
pub use hash::{fingerprint, Fingerprint};
pub use schema::{Field, FieldPath, Primitive, RecordType, SchemaType};
