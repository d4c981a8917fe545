use quarry_core::api::{TypeRef, BOOLEAN};
use quarry_core::emit::Emitted;
use quarry_core::{FieldPath, Primitive, SchemaType};
use serde_json::json;

use crate::capability::Capability;
use crate::direction::{order_direction_arg, Direction};
use crate::dsl;
use crate::handler::Handler;
use crate::terms::{self, BooleanFilter};

fn select(ty: &SchemaType, _: &FieldPath) -> bool {
    ty.primitive() == Some(Primitive::Boolean)
}

pub fn handler() -> Handler {
    Handler::new("boolean", select)
        .with_field(Capability::Constant(Emitted::bare(TypeRef::named(BOOLEAN))))
        .with_filter_arg(Capability::Constant(
            Emitted::bare(terms::boolean_filter_type()).include_self(),
        ))
        .with_order_arg(order_direction_arg())
        .with_mapping(Capability::Constant(json!({ "type": "boolean" })))
        .with_filter(Capability::computed(|site, params| {
            let filter: BooleanFilter = terms::parse_params(site.path, params)?;
            Ok(Some(filter.fragments(site.path)))
        }))
        .with_sort(Capability::computed(|site, params| {
            let direction = Direction::from_params(site.path, params)?;
            Ok(Some(vec![dsl::sort_clause(&site.field_name(), direction)]))
        }))
}
