//! Convenient re-exports for downstream crates.

pub use crate::api::{ApiSchema, InputValue, NamedType, ObjectField, TypeBody, TypeRef};
pub use crate::config::EngineConfig;
pub use crate::emit::{Definitions, Emitted};
pub use crate::error::{Error, Result};
pub use crate::schema::{Field, FieldPath, Primitive, RecordType, SchemaType};
