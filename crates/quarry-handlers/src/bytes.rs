use quarry_core::api::{TypeRef, STRING};
use quarry_core::emit::Emitted;
use quarry_core::{FieldPath, Primitive, SchemaType};

use crate::capability::Capability;
use crate::handler::Handler;

fn select(ty: &SchemaType, _: &FieldPath) -> bool {
    ty.primitive() == Some(Primitive::Bytes)
}

/// Readable through the API as a string; not filterable, sortable or indexed.
pub fn handler() -> Handler {
    Handler::new("bytes", select)
        .with_field(Capability::Constant(Emitted::bare(TypeRef::named(STRING))))
}
