use quarry_core::api::{TypeRef, INT};
use quarry_core::emit::Emitted;
use quarry_core::{FieldPath, Primitive, SchemaType};

use crate::capability::Capability;
use crate::direction::{order_direction_arg, Direction};
use crate::dsl;
use crate::handler::Handler;
use crate::terms::{self, IntFilter};

fn select(ty: &SchemaType, _: &FieldPath) -> bool {
    ty.primitive() == Some(Primitive::Int)
}

/// Indexed as `integer` with a `keyword` sub-field; equality and sort use the
/// sub-field, ranges use the numeric field.
pub fn handler() -> Handler {
    Handler::new("int", select)
        .with_field(Capability::Constant(Emitted::bare(TypeRef::named(INT))))
        .with_filter_arg(Capability::Constant(
            Emitted::bare(terms::int_filter_type()).include_self(),
        ))
        .with_order_arg(order_direction_arg())
        .with_mapping(Capability::Constant(dsl::with_keyword("integer")))
        .with_filter(Capability::computed(|site, params| {
            let filter: IntFilter = terms::parse_params(site.path, params)?;
            Ok(Some(filter.fragments(site.path)))
        }))
        .with_sort(Capability::computed(|site, params| {
            let direction = Direction::from_params(site.path, params)?;
            Ok(Some(vec![dsl::sort_clause(&dsl::keyword_field(site.path), direction)]))
        }))
}

#[cfg(test)]
mod tests {
    use crate::registry::HandlerRegistry;
    use quarry_core::{FieldPath, SchemaType};
    use serde_json::json;

    #[test]
    fn int_mapping_carries_a_keyword_subfield() {
        let registry = HandlerRegistry::standard();
        let path = FieldPath::root().child("age");
        assert_eq!(
            registry.mapping(&SchemaType::INT, &path).unwrap(),
            Some(json!({"type": "integer", "fields": {"keyword": {"type": "keyword"}}}))
        );
        assert_eq!(
            registry.sort(&SchemaType::INT, &path, &json!("DESC")).unwrap(),
            Some(vec![json!({"age.keyword": "desc"})])
        );
    }
}
