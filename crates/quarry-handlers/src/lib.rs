#![forbid(unsafe_code)]
//! quarry-handlers: capability bundles for every schema type.
//!
//! Design intent:
//! - A `Handler` describes how one schema-type variant shows up on each
//!   surface: API field, filter argument, order argument, index mapping,
//!   backend filter fragments and backend sort clauses.
//! - Each of those is an optional `Capability`; an absent capability silently
//!   drops the type from that surface.
//! - `HandlerRegistry` holds the handlers in a fixed order and dispatches by
//!   first match. The record handler recurses back into the registry.
//! - `ComputedField` is the same bundle for server-defined fields that have no
//!   stored value; authors choose exactly which capabilities to expose.
//!
//! Everything here is synchronous and pure.

pub mod capability;
pub mod computed;
pub mod direction;
pub mod dsl;
pub mod handler;
pub mod registry;
pub mod terms;

pub mod boolean;
pub mod bytes;
pub mod float;
pub mod int;
pub mod record;
pub mod string;

pub use capability::{Capability, CompileCapability, MappingCapability, Site, TypeCapability};
pub use computed::{Argument, ComputedField};
pub use direction::Direction;
pub use handler::Handler;
pub use registry::HandlerRegistry;
