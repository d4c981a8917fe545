//! The "constant or function" capability value.
//!
//! A capability is either absent, a constant, or computed from the call site
//! (and, for request-time hooks, from client parameters). All three are read
//! through [`Capability::resolve`].

use std::fmt;
use std::sync::Arc;

use quarry_core::emit::Emitted;
use quarry_core::{FieldPath, Result, SchemaType, TypeRef};
use serde_json::Value;

use crate::registry::HandlerRegistry;

/// Where a capability is being evaluated.
///
/// `ty` is the field's schema type (a computed field's result type) and
/// `path` the field names from the dataset root. `registry` lets recursive
/// handlers dispatch nested fields.
#[derive(Clone, Copy)]
pub struct Site<'a> {
    pub registry: &'a HandlerRegistry,
    pub ty: &'a SchemaType,
    pub path: &'a FieldPath,
}

impl Site<'_> {
    pub fn field_name(&self) -> String {
        self.path.dotted()
    }
}

pub type CapabilityFn<V, P> = dyn Fn(&Site<'_>, &P) -> Result<Option<V>> + Send + Sync;

pub enum Capability<V, P = ()> {
    Absent,
    Constant(V),
    Computed(Arc<CapabilityFn<V, P>>),
}

/// API field / filter argument / order argument type.
pub type TypeCapability = Capability<Emitted<TypeRef>>;

/// Index mapping property.
pub type MappingCapability = Capability<Value>;

/// Backend filter fragments or sort clauses, given client parameters.
pub type CompileCapability = Capability<Vec<Value>, Value>;

impl<V: Clone, P> Capability<V, P> {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Site<'_>, &P) -> Result<Option<V>> + Send + Sync + 'static,
    {
        Capability::Computed(Arc::new(f))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Capability::Absent)
    }

    pub fn resolve(&self, site: &Site<'_>, params: &P) -> Result<Option<V>> {
        match self {
            Capability::Absent => Ok(None),
            Capability::Constant(v) => Ok(Some(v.clone())),
            Capability::Computed(f) => f(site, params),
        }
    }
}

impl<V, P> Default for Capability<V, P> {
    fn default() -> Self {
        Capability::Absent
    }
}

impl<V: Clone, P> Clone for Capability<V, P> {
    fn clone(&self) -> Self {
        match self {
            Capability::Absent => Capability::Absent,
            Capability::Constant(v) => Capability::Constant(v.clone()),
            Capability::Computed(f) => Capability::Computed(Arc::clone(f)),
        }
    }
}

impl<V: fmt::Debug, P> fmt::Debug for Capability<V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Absent => f.write_str("Absent"),
            Capability::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Capability::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_covers_all_three_variants() {
        let registry = HandlerRegistry::standard();
        let path = FieldPath::root().child("age");
        let site = Site {
            registry: &registry,
            ty: &SchemaType::INT,
            path: &path,
        };

        let absent: Capability<u32> = Capability::Absent;
        assert_eq!(absent.resolve(&site, &()).unwrap(), None);

        let constant: Capability<u32> = Capability::Constant(7);
        assert_eq!(constant.resolve(&site, &()).unwrap(), Some(7));

        let computed: Capability<String> =
            Capability::computed(|site: &Site<'_>, _: &()| Ok(Some(site.field_name())));
        assert_eq!(computed.resolve(&site, &()).unwrap(), Some("age".to_string()));
        assert!(!computed.is_absent());
        assert_eq!(format!("{computed:?}"), "Computed(<fn>)");
    }
}
