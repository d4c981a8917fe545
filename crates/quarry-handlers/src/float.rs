use quarry_core::api::{TypeRef, FLOAT};
use quarry_core::emit::Emitted;
use quarry_core::{FieldPath, Primitive, SchemaType};
use serde_json::json;

use crate::capability::Capability;
use crate::direction::{order_direction_arg, Direction};
use crate::dsl;
use crate::handler::Handler;
use crate::terms::{self, FloatFilter};

fn select(ty: &SchemaType, _: &FieldPath) -> bool {
    ty.primitive() == Some(Primitive::Float)
}

pub fn handler() -> Handler {
    Handler::new("float", select)
        .with_field(Capability::Constant(Emitted::bare(TypeRef::named(FLOAT))))
        .with_filter_arg(Capability::Constant(
            Emitted::bare(terms::float_filter_type()).include_self(),
        ))
        .with_order_arg(order_direction_arg())
        .with_mapping(Capability::Constant(json!({ "type": "float" })))
        .with_filter(Capability::computed(|site, params| {
            let filter: FloatFilter = terms::parse_params(site.path, params)?;
            Ok(Some(filter.fragments(site.path)))
        }))
        .with_sort(Capability::computed(|site, params| {
            let direction = Direction::from_params(site.path, params)?;
            Ok(Some(vec![dsl::sort_clause(&site.field_name(), direction)]))
        }))
}
