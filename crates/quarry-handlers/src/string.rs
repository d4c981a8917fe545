use quarry_core::api::{TypeRef, STRING};
use quarry_core::emit::Emitted;
use quarry_core::{FieldPath, Primitive, SchemaType};

use crate::capability::Capability;
use crate::direction::{order_direction_arg, Direction};
use crate::dsl;
use crate::handler::Handler;
use crate::terms::{self, StringFilter};

fn select(ty: &SchemaType, _: &FieldPath) -> bool {
    ty.primitive() == Some(Primitive::String)
}

/// Indexed as analysed `text` plus a `keyword` sub-field. Equality, ranges and
/// sort use the sub-field; `contains` and the wildcard keys use the text.
pub fn handler() -> Handler {
    Handler::new("string", select)
        .with_field(Capability::Constant(Emitted::bare(TypeRef::named(STRING))))
        .with_filter_arg(Capability::Constant(
            Emitted::bare(terms::string_filter_type()).include_self(),
        ))
        .with_order_arg(order_direction_arg())
        .with_mapping(Capability::Constant(dsl::with_keyword("text")))
        .with_filter(Capability::computed(|site, params| {
            let filter: StringFilter = terms::parse_params(site.path, params)?;
            Ok(Some(filter.fragments(site.path)))
        }))
        .with_sort(Capability::computed(|site, params| {
            let direction = Direction::from_params(site.path, params)?;
            Ok(Some(vec![dsl::sort_clause(&dsl::keyword_field(site.path), direction)]))
        }))
}
