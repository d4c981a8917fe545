//! The per-type capability bundle.

use std::fmt;

use quarry_core::{FieldPath, SchemaType};

use crate::capability::{CompileCapability, MappingCapability, TypeCapability};

pub type SelectFn = fn(&SchemaType, &FieldPath) -> bool;

/// Capabilities governing one schema-type variant across every surface.
///
/// Handlers are stateless. Any capability may be absent, which removes the
/// type from that surface without error.
#[derive(Clone)]
pub struct Handler {
    /// Stable name, for logs and diagnostics.
    pub name: &'static str,
    select: SelectFn,
    pub field: TypeCapability,
    pub filter_arg: TypeCapability,
    pub order_arg: TypeCapability,
    pub mapping: MappingCapability,
    pub filter: CompileCapability,
    pub sort: CompileCapability,
}

impl Handler {
    pub fn new(name: &'static str, select: SelectFn) -> Self {
        Self {
            name,
            select,
            field: TypeCapability::Absent,
            filter_arg: TypeCapability::Absent,
            order_arg: TypeCapability::Absent,
            mapping: MappingCapability::Absent,
            filter: CompileCapability::Absent,
            sort: CompileCapability::Absent,
        }
    }

    pub fn selects(&self, ty: &SchemaType, path: &FieldPath) -> bool {
        (self.select)(ty, path)
    }

    pub fn with_field(mut self, cap: TypeCapability) -> Self {
        self.field = cap;
        self
    }

    pub fn with_filter_arg(mut self, cap: TypeCapability) -> Self {
        self.filter_arg = cap;
        self
    }

    pub fn with_order_arg(mut self, cap: TypeCapability) -> Self {
        self.order_arg = cap;
        self
    }

    pub fn with_mapping(mut self, cap: MappingCapability) -> Self {
        self.mapping = cap;
        self
    }

    pub fn with_filter(mut self, cap: CompileCapability) -> Self {
        self.filter = cap;
        self
    }

    pub fn with_sort(mut self, cap: CompileCapability) -> Self {
        self.sort = cap;
        self
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("field", &!self.field.is_absent())
            .field("filter_arg", &!self.filter_arg.is_absent())
            .field("order_arg", &!self.order_arg.is_absent())
            .field("mapping", &!self.mapping.is_absent())
            .field("filter", &!self.filter.is_absent())
            .field("sort", &!self.sort.is_absent())
            .finish()
    }
}
