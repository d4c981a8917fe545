//! Index mapping documents.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use quarry_core::{EngineConfig, Error, FieldPath, Result};
use quarry_handlers::HandlerRegistry;
use serde_json::{json, Map, Value};

use crate::catalog::{Catalog, Dataset};

/// `{properties}` for a dataset's stored fields, in schema order. Types with
/// no mapping (bytes, null, long, double) are omitted; computed fields are
/// never stored.
pub fn dataset_mapping(dataset: &Dataset, registry: &HandlerRegistry) -> Result<Value> {
    let mut properties = Map::new();
    for field in &dataset.schema.fields {
        let path = FieldPath::root().child(&field.name);
        if let Some(mapping) = registry.mapping(&field.ty, &path)? {
            properties.insert(field.name.clone(), mapping);
        }
    }
    Ok(json!({ "properties": properties }))
}

/// Body of an index-creation request.
pub fn index_body(mapping: Value) -> Value {
    json!({ "mappings": mapping })
}

/// Mapping per physical index name, after the configured prefix. Datasets
/// may share an index only when their mappings are identical.
pub fn catalog_mappings(
    catalog: &Catalog,
    registry: &HandlerRegistry,
    config: &EngineConfig,
) -> Result<BTreeMap<String, Value>> {
    let mut mappings = BTreeMap::new();
    for (name, dataset) in &catalog.datasets {
        let index = config.index_name(&dataset.source.index);
        let mapping = dataset_mapping(dataset, registry)?;
        match mappings.entry(index) {
            Entry::Vacant(slot) => {
                slot.insert(mapping);
            }
            Entry::Occupied(slot) if *slot.get() != mapping => {
                return Err(Error::Collision(format!(
                    "index '{}' (dataset '{name}' maps it differently)",
                    slot.key()
                )));
            }
            Entry::Occupied(_) => {}
        }
    }
    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{Field, Primitive, RecordType};
    use quarry_handlers::ComputedField;

    #[test]
    fn maps_stored_fields_only() {
        let dataset = Dataset::new(
            RecordType::new(
                "Person",
                vec![
                    Field::new("name", Primitive::String),
                    Field::new("photo", Primitive::Bytes),
                    Field::new("score", Primitive::Float),
                    Field::new("id", Primitive::Long),
                ],
            ),
            "people",
        )
        .with_computed("rank", ComputedField::new(Primitive::Int).standard_field());
        let mapping = dataset_mapping(&dataset, &HandlerRegistry::standard()).unwrap();
        let keys: Vec<_> = mapping["properties"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["name", "score"]);
        assert_eq!(mapping["properties"]["score"], json!({"type": "float"}));
        assert_eq!(index_body(mapping.clone())["mappings"], mapping);
    }

    #[test]
    fn catalog_mappings_apply_the_index_prefix() {
        let dataset = Dataset::new(
            RecordType::new("Person", vec![Field::new("age", Primitive::Int)]),
            "people",
        );
        let catalog = Catalog::new().with_dataset("people", dataset);
        let config = EngineConfig {
            index_prefix: Some("test_".into()),
            ..EngineConfig::default()
        };
        let mappings = catalog_mappings(&catalog, &HandlerRegistry::standard(), &config).unwrap();
        assert!(mappings.contains_key("test_people"));
    }

    #[test]
    fn datasets_sharing_an_index_must_agree_on_its_mapping() {
        let registry = HandlerRegistry::standard();
        let config = EngineConfig::default();
        let alpha = Dataset::new(
            RecordType::new("Alpha", vec![Field::new("name", Primitive::String)]),
            "shared",
        );
        let beta = Dataset::new(
            RecordType::new("Beta", vec![Field::new("age", Primitive::Int)]),
            "shared",
        );
        let catalog = Catalog::new()
            .with_dataset("alpha", alpha.clone())
            .with_dataset("beta", beta);
        let err = catalog_mappings(&catalog, &registry, &config).unwrap_err();
        assert!(matches!(err, Error::Collision(msg) if msg.contains("'shared'")));

        let views = Catalog::new()
            .with_dataset("alpha", alpha.clone())
            .with_dataset("alphaView", alpha);
        let mappings = catalog_mappings(&views, &registry, &config).unwrap();
        assert_eq!(mappings.len(), 1);
        assert!(mappings["shared"]["properties"].get("name").is_some());
    }
}
