//! Build the API schema for a catalog.
//!
//! For dataset `people` this produces `People` (object), `PeopleFilter`
//! (per-field term filters), `PeopleCombinationsFilter` (cond/and/or),
//! `PeopleOrder`, any computed-field argument wrappers, and one `people` field
//! on `Query`. Shared types such as `IntFilter` appear once.

use quarry_core::api::{pascal_case, NamedType, TypeBody, TypeRef, BOOLEAN, FLOAT, INT, QUERY, STRING};
use quarry_core::emit::{Definitions, Emitted};
use quarry_core::{ApiSchema, Error, FieldPath, InputValue, ObjectField, Result};
use quarry_handlers::direction::ORDER_DIRECTION;
use quarry_handlers::{ComputedField, HandlerRegistry, TypeCapability};

use crate::catalog::{argument_scalar, Catalog, Dataset, Member};

const RESERVED: [&str; 6] = [INT, FLOAT, STRING, BOOLEAN, QUERY, ORDER_DIRECTION];

/// Which type surface of a member is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Field,
    Filter,
    Order,
}

impl Surface {
    fn registry_type(
        self,
        registry: &HandlerRegistry,
        member: &Member<'_>,
        path: &FieldPath,
    ) -> Result<Option<Emitted<TypeRef>>> {
        let site = member.site(registry, path);
        match self {
            Surface::Field => registry.field_type(site.ty, path),
            Surface::Filter => registry.filter_arg(site.ty, path),
            Surface::Order => registry.order_arg(site.ty, path),
        }
    }

    fn computed_capability(self, computed: &ComputedField) -> &TypeCapability {
        match self {
            Surface::Field => &computed.field,
            Surface::Filter => &computed.filter_arg,
            Surface::Order => &computed.order_arg,
        }
    }

    /// `(key, type-name suffix)` of the `{arguments, <key>}` input that wraps
    /// this surface for computed fields with arguments. Object fields take
    /// their arguments directly.
    fn wrapper(self) -> Option<(&'static str, &'static str)> {
        match self {
            Surface::Field => None,
            Surface::Filter => Some(("filter", "ComputedFilter")),
            Surface::Order => Some(("order", "ComputedOrder")),
        }
    }
}

/// Names derived from one dataset.
#[derive(Debug, Clone)]
pub struct DatasetTypeNames {
    pub object: String,
    pub filter: String,
    pub combinations: String,
    pub order: String,
}

impl DatasetTypeNames {
    pub fn new(dataset_name: &str) -> Self {
        let base = pascal_case(dataset_name);
        Self {
            filter: format!("{base}Filter"),
            combinations: format!("{base}CombinationsFilter"),
            order: format!("{base}Order"),
            object: base,
        }
    }

    fn member_prefix(&self, member: &str) -> String {
        format!("{}{}", self.object, pascal_case(member))
    }
}

fn arguments_type(names: &DatasetTypeNames, member: &str, computed: &ComputedField) -> Result<NamedType> {
    let fields = computed
        .arguments
        .iter()
        .map(|argument| {
            let scalar = argument_scalar(&argument.ty).ok_or_else(|| {
                Error::Schema(format!(
                    "argument '{}' of computed field '{member}' has unsupported type {}",
                    argument.name, argument.ty
                ))
            })?;
            Ok(InputValue::new(
                argument.name.clone(),
                TypeRef::non_null(TypeRef::named(scalar)),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(NamedType::input_object(
        format!("{}Arguments", names.member_prefix(member)),
        fields,
    ))
}

/// One entry of a generated dataset type, with the definitions it needs.
struct Entry {
    name: String,
    ty: TypeRef,
    arguments: Vec<InputValue>,
}

fn member_entry(
    registry: &HandlerRegistry,
    names: &DatasetTypeNames,
    member: &Member<'_>,
    surface: Surface,
    defs: &mut Definitions,
) -> Result<Option<Entry>> {
    let name = member.name();
    let path = FieldPath::root().child(name);
    let computed = match member {
        Member::Stored(_) => {
            let Some(emitted) = surface.registry_type(registry, member, &path)? else {
                return Ok(None);
            };
            let (ty, more) = emitted.into_parts();
            defs.merge_checked(more)?;
            return Ok(Some(Entry {
                name: name.to_string(),
                ty,
                arguments: Vec::new(),
            }));
        }
        Member::Computed(_, computed) => computed,
    };

    let site = member.site(registry, &path);
    let Some(emitted) = surface.computed_capability(computed).resolve(&site, &())? else {
        return Ok(None);
    };
    let (ty, more) = emitted.into_parts();
    defs.merge_checked(more)?;

    if !computed.has_arguments() {
        return Ok(Some(Entry {
            name: name.to_string(),
            ty,
            arguments: Vec::new(),
        }));
    }

    let arguments = arguments_type(names, name, computed)?;
    let Some((key, suffix)) = surface.wrapper() else {
        let TypeBody::InputObject(fields) = &arguments.body else {
            return Err(Error::Invariant(format!("{} is not an input type", arguments.name)));
        };
        return Ok(Some(Entry {
            name: name.to_string(),
            ty,
            arguments: fields.clone(),
        }));
    };

    let wrapper = NamedType::input_object(
        format!("{}{suffix}", names.member_prefix(name)),
        vec![
            InputValue::new("arguments", TypeRef::non_null(arguments.reference())),
            InputValue::new(key, ty),
        ],
    );
    let wrapper_ref = wrapper.reference();
    defs.merge_checked(Definitions::of(arguments))?;
    defs.merge_checked(Definitions::of(wrapper))?;
    Ok(Some(Entry {
        name: name.to_string(),
        ty: wrapper_ref,
        arguments: Vec::new(),
    }))
}

fn surface_entries(
    registry: &HandlerRegistry,
    names: &DatasetTypeNames,
    dataset: &Dataset,
    surface: Surface,
    defs: &mut Definitions,
) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for member in dataset.members() {
        if let Some(entry) = member_entry(registry, names, &member, surface, defs)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Generate every definition for one dataset plus its `Query` field.
pub fn dataset_root_field(
    registry: &HandlerRegistry,
    name: &str,
    dataset: &Dataset,
) -> Result<Emitted<ObjectField>> {
    let names = DatasetTypeNames::new(name);
    if RESERVED.contains(&names.object.as_str()) {
        return Err(Error::Collision(names.object));
    }
    let mut defs = Definitions::new();

    let fields = surface_entries(registry, &names, dataset, Surface::Field, &mut defs)?
        .into_iter()
        .map(|entry| ObjectField::new(entry.name, entry.ty).with_arguments(entry.arguments))
        .collect();
    let object = NamedType::object(names.object.clone(), fields);
    let mut root_arguments = Vec::new();

    let filters = surface_entries(registry, &names, dataset, Surface::Filter, &mut defs)?;
    if !filters.is_empty() {
        let values = filters
            .into_iter()
            .map(|entry| InputValue::new(entry.name, entry.ty))
            .collect();
        let value_filter = NamedType::input_object(names.filter.clone(), values);

        let pending = defs.declare(names.combinations.clone())?;
        let list = TypeRef::list(TypeRef::non_null(pending.reference()));
        let combinations = pending.populate(
            TypeBody::InputObject(vec![
                InputValue::new("cond", value_filter.reference()),
                InputValue::new("and", list.clone()),
                InputValue::new("or", list),
            ]),
            &mut defs,
        );
        defs.merge_checked(Definitions::of(value_filter))?;
        root_arguments.push(InputValue::new("filter", combinations));
    }

    let orders = surface_entries(registry, &names, dataset, Surface::Order, &mut defs)?;
    if !orders.is_empty() {
        let entries = orders
            .into_iter()
            .map(|entry| InputValue::new(entry.name, entry.ty))
            .collect();
        let order = NamedType::input_object(names.order.clone(), entries);
        root_arguments.push(InputValue::new(
            "order",
            TypeRef::list(TypeRef::non_null(order.reference())),
        ));
        defs.merge_checked(Definitions::of(order))?;
    }

    let root_ty = TypeRef::non_null(TypeRef::list(TypeRef::non_null(object.reference())));
    defs.merge_checked(Definitions::of(object))?;
    let field = ObjectField::new(name, root_ty).with_arguments(root_arguments);
    Ok(Emitted::new(field, defs))
}

/// Generate the full API schema: every dataset's types plus `Query`, sorted
/// by name.
pub fn generate_api_schema(catalog: &Catalog, registry: &HandlerRegistry) -> Result<ApiSchema> {
    catalog.validate()?;
    let mut defs = Definitions::new();
    let mut root_fields = Vec::new();
    for (name, dataset) in &catalog.datasets {
        let (field, more) = dataset_root_field(registry, name, dataset)?.into_parts();
        defs.merge_checked(more)?;
        root_fields.push(field);
    }
    defs.merge_checked(Definitions::of(NamedType::object(QUERY, root_fields)))?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        datasets = catalog.datasets.len(),
        definitions = defs.len(),
        "generated API schema"
    );

    Ok(ApiSchema {
        query: QUERY.to_string(),
        definitions: defs.finish()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{Field, Primitive, RecordType};

    fn people() -> Dataset {
        Dataset::new(
            RecordType::new(
                "Person",
                vec![
                    Field::new("name", Primitive::String),
                    Field::new("age", Primitive::Int),
                    Field::new("isAdult", Primitive::Boolean),
                ],
            ),
            "people",
        )
    }

    #[test]
    fn builds_the_dataset_type_family() {
        let catalog = Catalog::new().with_dataset("people", people());
        let schema = generate_api_schema(&catalog, &HandlerRegistry::standard()).unwrap();
        let names: Vec<_> = schema.definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "BooleanFilter",
                "IntFilter",
                "OrderDirection",
                "People",
                "PeopleCombinationsFilter",
                "PeopleFilter",
                "PeopleOrder",
                "Query",
                "StringFilter",
            ]
        );
        let root = schema.query_type().unwrap().object_field("people").unwrap();
        assert_eq!(root.ty.to_string(), "[People!]!");
        assert_eq!(
            root.to_string(),
            "people(filter: PeopleCombinationsFilter, order: [PeopleOrder!]): [People!]!"
        );
        let combinations = schema.get("PeopleCombinationsFilter").unwrap();
        assert_eq!(combinations.entry_names(), ["cond", "and", "or"]);
        assert_eq!(
            combinations.input_field("and").unwrap().ty.to_string(),
            "[PeopleCombinationsFilter!]"
        );
    }

    #[test]
    fn computed_arguments_get_wrapper_types() {
        let similarity = ComputedField::new(Primitive::Float)
            .argument("bedrooms", Primitive::Int)
            .standard_field()
            .standard_order_arg();
        let dataset = people().with_computed("similarity", similarity);
        let catalog = Catalog::new().with_dataset("people", dataset);
        let schema = generate_api_schema(&catalog, &HandlerRegistry::standard()).unwrap();

        let object = schema.get("People").unwrap();
        assert_eq!(
            object.object_field("similarity").unwrap().to_string(),
            "similarity(bedrooms: Int!): Float"
        );
        let order = schema.get("PeopleOrder").unwrap();
        assert_eq!(
            order.input_field("similarity").unwrap().ty.to_string(),
            "PeopleSimilarityComputedOrder"
        );
        let wrapper = schema.get("PeopleSimilarityComputedOrder").unwrap();
        assert_eq!(wrapper.entry_names(), ["arguments", "order"]);
        assert!(schema.get("PeopleSimilarityArguments").is_some());
        assert!(schema.get("PeopleFilter").unwrap().input_field("similarity").is_none());
        assert!(schema.get("FloatFilter").is_none());
    }

    #[test]
    fn datasets_without_filterable_fields_take_no_filter_argument() {
        let dataset = Dataset::new(
            RecordType::new("Blob", vec![Field::new("data", Primitive::Bytes)]),
            "blobs",
        );
        let catalog = Catalog::new().with_dataset("blobs", dataset);
        let schema = generate_api_schema(&catalog, &HandlerRegistry::standard()).unwrap();
        let root = schema.query_type().unwrap().object_field("blobs").unwrap();
        assert!(root.arguments.is_empty());
        assert!(schema.get("BlobsFilter").is_none());
        assert!(schema.get("BlobsCombinationsFilter").is_none());
        assert!(schema.get("BlobsOrder").is_none());
    }

    #[test]
    fn reserved_dataset_names_collide() {
        let catalog = Catalog::new().with_dataset("query", people());
        assert!(matches!(
            generate_api_schema(&catalog, &HandlerRegistry::standard()),
            Err(Error::Collision(name)) if name == "Query"
        ));
    }
}
