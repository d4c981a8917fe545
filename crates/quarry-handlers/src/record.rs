//! Nested records. Every capability re-enters the registry for each field
//! and aggregates what the field handlers produce.

use quarry_core::api::{NamedType, TypeRef};
use quarry_core::emit::{Definitions, Emitted};
use quarry_core::{Error, FieldPath, InputValue, ObjectField, RecordType, Result, SchemaType};
use serde_json::{json, Map, Value};

use crate::capability::{Capability, Site};
use crate::handler::Handler;
use crate::registry::HandlerRegistry;

type Resolver =
    fn(&HandlerRegistry, &SchemaType, &FieldPath) -> Result<Option<Emitted<TypeRef>>>;

type Compiler = fn(&HandlerRegistry, &SchemaType, &FieldPath, &Value) -> Result<Option<Vec<Value>>>;

fn select(ty: &SchemaType, _: &FieldPath) -> bool {
    ty.as_record().is_some()
}

/// Resolve one surface for every field, keeping schema order and skipping
/// fields whose handler lacks the capability.
fn nested_entries(
    site: &Site<'_>,
    record: &RecordType,
    resolve: Resolver,
) -> Result<Emitted<Vec<(String, TypeRef)>>> {
    let mut entries = Vec::new();
    let mut definitions = Definitions::new();
    for field in &record.fields {
        let path = site.path.child(&field.name);
        if let Some(emitted) = resolve(site.registry, &field.ty, &path)? {
            let (ty, defs) = emitted.into_parts();
            definitions.merge_checked(defs)?;
            entries.push((field.name.clone(), ty));
        }
    }
    Ok(Emitted::new(entries, definitions))
}

/// Build the named aggregate type, or nothing when no field contributes.
fn aggregate(
    site: &Site<'_>,
    resolve: Resolver,
    build: impl FnOnce(&RecordType, Vec<(String, TypeRef)>) -> NamedType,
) -> Result<Option<Emitted<TypeRef>>> {
    let Some(record) = site.ty.as_record() else {
        return Ok(None);
    };
    let emitted = nested_entries(site, record, resolve)?;
    if emitted.value.is_empty() {
        return Ok(None);
    }
    let (entries, mut definitions) = emitted.into_parts();
    let named = build(record, entries);
    let reference = named.reference();
    definitions.merge_checked(Definitions::of(named))?;
    Ok(Some(Emitted::new(reference, definitions)))
}

fn input_entries(entries: Vec<(String, TypeRef)>) -> Vec<InputValue> {
    entries
        .into_iter()
        .map(|(name, ty)| InputValue::new(name, ty))
        .collect()
}

fn compile_nested(site: &Site<'_>, params: &Value, compile: Compiler) -> Result<Option<Vec<Value>>> {
    let Some(record) = site.ty.as_record() else {
        return Ok(None);
    };
    let params = match params {
        Value::Null => return Ok(Some(Vec::new())),
        Value::Object(map) => map,
        other => {
            return Err(Error::argument(
                site.field_name(),
                format!("expected an object keyed by {} fields, got {other}", record.name),
            ))
        }
    };
    let mut out = Vec::new();
    for field in &record.fields {
        match params.get(&field.name) {
            None | Some(Value::Null) => {}
            Some(value) => {
                let path = site.path.child(&field.name);
                if let Some(fragments) = compile(site.registry, &field.ty, &path, value)? {
                    out.extend(fragments);
                }
            }
        }
    }
    Ok(Some(out))
}

/// `{type: object, properties}` with one entry per mappable field.
pub fn record_properties(site: &Site<'_>, record: &RecordType) -> Result<Map<String, Value>> {
    let mut properties = Map::new();
    for field in &record.fields {
        let path = site.path.child(&field.name);
        if let Some(mapping) = site.registry.mapping(&field.ty, &path)? {
            properties.insert(field.name.clone(), mapping);
        }
    }
    Ok(properties)
}

pub fn handler() -> Handler {
    Handler::new("record", select)
        .with_field(Capability::computed(|site, _| {
            aggregate(site, HandlerRegistry::field_type, |record, entries| {
                let fields = entries
                    .into_iter()
                    .map(|(name, ty)| ObjectField::new(name, ty))
                    .collect();
                NamedType::object(format!("{}Field", record.name), fields)
            })
        }))
        .with_filter_arg(Capability::computed(|site, _| {
            aggregate(site, HandlerRegistry::filter_arg, |record, entries| {
                NamedType::input_object(format!("{}Filter", record.name), input_entries(entries))
            })
        }))
        .with_order_arg(Capability::computed(|site, _| {
            aggregate(site, HandlerRegistry::order_arg, |record, entries| {
                NamedType::input_object(format!("{}Order", record.name), input_entries(entries))
            })
        }))
        .with_mapping(Capability::computed(|site, _| {
            let Some(record) = site.ty.as_record() else {
                return Ok(None);
            };
            let properties = record_properties(site, record)?;
            Ok(Some(json!({ "type": "object", "properties": properties })))
        }))
        .with_filter(Capability::computed(|site, params| {
            compile_nested(site, params, HandlerRegistry::filter)
        }))
        .with_sort(Capability::computed(|site, params| {
            compile_nested(site, params, HandlerRegistry::sort)
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{Field, Primitive};

    fn address() -> SchemaType {
        RecordType::new(
            "Address",
            vec![
                Field::new("street", Primitive::String),
                Field::new("number", Primitive::Int),
                Field::new("photo", Primitive::Bytes),
                Field::new("legacy", Primitive::Long),
            ],
        )
        .into()
    }

    fn path() -> FieldPath {
        FieldPath::root().child("address")
    }

    #[test]
    fn nested_records_sharing_a_name_must_agree() {
        let registry = HandlerRegistry::standard();
        let contact: SchemaType = RecordType::new(
            "Contact",
            vec![
                Field::new("home", address()),
                Field::new(
                    "work",
                    RecordType::new("Address", vec![Field::new("zip", Primitive::Int)]),
                ),
            ],
        )
        .into();
        let err = registry.filter_arg(&contact, &path()).unwrap_err();
        assert!(matches!(err, Error::Collision(name) if name == "AddressFilter"));

        let twice: SchemaType = RecordType::new(
            "Contact",
            vec![Field::new("home", address()), Field::new("work", address())],
        )
        .into();
        let filter = registry.filter_arg(&twice, &path()).unwrap().unwrap();
        assert!(filter.definitions.contains("AddressFilter"));
    }

    #[test]
    fn records_cannot_shadow_builtin_filter_types() {
        let registry = HandlerRegistry::standard();
        let meta: SchemaType = RecordType::new(
            "Meta",
            vec![
                Field::new("age", Primitive::Int),
                Field::new(
                    "label",
                    RecordType::new("Int", vec![Field::new("text", Primitive::String)]),
                ),
            ],
        )
        .into();
        let err = registry.filter_arg(&meta, &path()).unwrap_err();
        assert!(matches!(err, Error::Collision(name) if name == "IntFilter"));
    }

    #[test]
    fn emits_record_types_with_nested_definitions() {
        let registry = HandlerRegistry::standard();
        let field = registry.field_type(&address(), &path()).unwrap().unwrap();
        assert_eq!(field.value.to_string(), "AddressField");
        let object = field.definitions.get("AddressField").unwrap();
        assert_eq!(object.entry_names(), ["street", "number", "photo"]);

        let filter = registry.filter_arg(&address(), &path()).unwrap().unwrap();
        let input = filter.definitions.get("AddressFilter").unwrap();
        assert_eq!(input.entry_names(), ["street", "number"]);
        assert!(filter.definitions.contains("StringFilter"));
        assert!(filter.definitions.contains("IntFilter"));

        let order = registry.order_arg(&address(), &path()).unwrap().unwrap();
        assert_eq!(order.value.to_string(), "AddressOrder");
    }

    #[test]
    fn mapping_nests_properties_under_an_object() {
        let registry = HandlerRegistry::standard();
        let mapping = registry.mapping(&address(), &path()).unwrap().unwrap();
        let keys: Vec<_> = mapping["properties"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(mapping["type"], "object");
        assert_eq!(keys, ["street", "number"]);
    }

    #[test]
    fn empty_records_contribute_only_a_mapping() {
        let registry = HandlerRegistry::standard();
        let ty: SchemaType = RecordType::new("Blob", vec![Field::new("raw", Primitive::Null)]).into();
        assert!(registry.field_type(&ty, &path()).unwrap().is_none());
        assert!(registry.filter_arg(&ty, &path()).unwrap().is_none());
        assert_eq!(
            registry.mapping(&ty, &path()).unwrap(),
            Some(json!({"type": "object", "properties": {}}))
        );
    }

    #[test]
    fn nested_filters_flatten_in_schema_order() {
        let registry = HandlerRegistry::standard();
        let fragments = registry
            .filter(
                &address(),
                &path(),
                &json!({"number": {"greaterThan": 3}, "street": {"equals": "Main"}, "zip": {"equals": 1}}),
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            fragments,
            vec![
                json!({"term": {"address.street.keyword": "Main"}}),
                json!({"range": {"address.number": {"gt": 3}}}),
            ]
        );
        let sort = registry
            .sort(&address(), &path(), &json!({"number": "ASC", "street": null}))
            .unwrap()
            .unwrap();
        assert_eq!(sort, vec![json!({"address.number.keyword": "asc"})]);
        assert!(registry.filter(&address(), &path(), &json!([1])).is_err());
    }
}
