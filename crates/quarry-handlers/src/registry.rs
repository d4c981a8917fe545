//! Ordered handler table with first-match dispatch.

use quarry_core::emit::Emitted;
use quarry_core::{FieldPath, Result, SchemaType, TypeRef};
use serde_json::Value;

use crate::capability::{Capability, Site};
use crate::handler::Handler;
use crate::{boolean, bytes, float, int, record, string};

/// Immutable list of handlers. The first handler whose predicate accepts a
/// `(type, path)` pair governs it; list order is the tie-break.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Handler>,
}

impl HandlerRegistry {
    pub fn new(handlers: Vec<Handler>) -> Self {
        Self { handlers }
    }

    /// The built-in table: boolean, bytes, float, int, record, string.
    ///
    /// `null`, `long` and `double` match nothing and are left out of every
    /// derived surface.
    pub fn standard() -> Self {
        Self::new(vec![
            boolean::handler(),
            bytes::handler(),
            float::handler(),
            int::handler(),
            record::handler(),
            string::handler(),
        ])
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    pub fn select(&self, ty: &SchemaType, path: &FieldPath) -> Option<&Handler> {
        self.handlers.iter().find(|h| h.selects(ty, path))
    }

    fn resolve<V: Clone, P>(
        &self,
        ty: &SchemaType,
        path: &FieldPath,
        params: &P,
        pick: fn(&Handler) -> &Capability<V, P>,
    ) -> Result<Option<V>> {
        let Some(handler) = self.select(ty, path) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(path = %path, ty = %ty, "no handler selected");
            return Ok(None);
        };
        let site = Site {
            registry: self,
            ty,
            path,
        };
        pick(handler).resolve(&site, params)
    }

    pub fn field_type(&self, ty: &SchemaType, path: &FieldPath) -> Result<Option<Emitted<TypeRef>>> {
        self.resolve(ty, path, &(), |h| &h.field)
    }

    pub fn filter_arg(&self, ty: &SchemaType, path: &FieldPath) -> Result<Option<Emitted<TypeRef>>> {
        self.resolve(ty, path, &(), |h| &h.filter_arg)
    }

    pub fn order_arg(&self, ty: &SchemaType, path: &FieldPath) -> Result<Option<Emitted<TypeRef>>> {
        self.resolve(ty, path, &(), |h| &h.order_arg)
    }

    pub fn mapping(&self, ty: &SchemaType, path: &FieldPath) -> Result<Option<Value>> {
        self.resolve(ty, path, &(), |h| &h.mapping)
    }

    /// Backend filter fragments for `params` (a term filter, or a nested
    /// object of term filters for records).
    pub fn filter(
        &self,
        ty: &SchemaType,
        path: &FieldPath,
        params: &Value,
    ) -> Result<Option<Vec<Value>>> {
        self.resolve(ty, path, params, |h| &h.filter)
    }

    /// Backend sort clauses for `params` (a direction, or a nested object of
    /// directions for records).
    pub fn sort(&self, ty: &SchemaType, path: &FieldPath, params: &Value) -> Result<Option<Vec<Value>>> {
        self.resolve(ty, path, params, |h| &h.sort)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
