//! Datasets and the catalog that names them.

use std::collections::BTreeMap;

use quarry_core::schema::is_identifier;
use quarry_core::{Error, Field, FieldPath, Primitive, RecordType, Result, SchemaType};
use quarry_handlers::{ComputedField, HandlerRegistry, Site};

/// Where a dataset's documents live in the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub index: String,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub schema: RecordType,
    /// Keyed by field name; iterated in name order.
    pub computed: BTreeMap<String, ComputedField>,
    pub source: DataSource,
}

/// A dataset field as the derived surfaces see it: stored, or computed.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Stored(&'a Field),
    Computed(&'a str, &'a ComputedField),
}

impl<'a> Member<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Member::Stored(field) => &field.name,
            Member::Computed(name, _) => name,
        }
    }

    /// Call site for capability resolution. Computed fields resolve against
    /// their result type.
    pub fn site<'s>(&'s self, registry: &'s HandlerRegistry, path: &'s FieldPath) -> Site<'s> {
        let ty = match self {
            Member::Stored(field) => &field.ty,
            Member::Computed(_, computed) => &computed.result_type,
        };
        Site { registry, ty, path }
    }
}

impl Dataset {
    pub fn new(schema: RecordType, index: impl Into<String>) -> Self {
        Self {
            schema,
            computed: BTreeMap::new(),
            source: DataSource {
                index: index.into(),
            },
        }
    }

    pub fn with_computed(mut self, name: impl Into<String>, field: ComputedField) -> Self {
        self.computed.insert(name.into(), field);
        self
    }

    /// Stored fields in schema order, then computed fields. A computed field
    /// named like a stored one takes the stored field's place.
    pub fn members(&self) -> Vec<Member<'_>> {
        let mut out: Vec<Member<'_>> = self
            .schema
            .fields
            .iter()
            .map(|field| match self.computed.get_key_value(&field.name) {
                Some((name, computed)) => Member::Computed(name, computed),
                None => Member::Stored(field),
            })
            .collect();
        out.extend(
            self.computed
                .iter()
                .filter(|(name, _)| self.schema.field(name).is_none())
                .map(|(name, computed)| Member::Computed(name, computed)),
        );
        out
    }

    /// Computed fields first, then stored fields.
    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        if let Some((name, computed)) = self.computed.get_key_value(name) {
            return Some(Member::Computed(name, computed));
        }
        self.schema.field(name).map(Member::Stored)
    }

    pub fn validate(&self) -> Result<()> {
        self.schema.validate()?;
        for (name, computed) in &self.computed {
            if !is_identifier(name) {
                return Err(Error::Schema(format!(
                    "computed field '{name}' is not a valid identifier"
                )));
            }
            if let SchemaType::Record(record) = &computed.result_type {
                record.validate()?;
            }
            for argument in &computed.arguments {
                if !is_identifier(&argument.name) {
                    return Err(Error::Schema(format!(
                        "argument '{}' of computed field '{name}' is not a valid identifier",
                        argument.name
                    )));
                }
                if argument_scalar(&argument.ty).is_none() {
                    return Err(Error::Schema(format!(
                        "argument '{}' of computed field '{name}' has unsupported type {}",
                        argument.name, argument.ty
                    )));
                }
            }
        }
        Ok(())
    }
}

/// API scalar for a computed-field argument; only boolean, int, float and
/// string arguments can be expressed.
pub fn argument_scalar(ty: &SchemaType) -> Option<&'static str> {
    use quarry_core::api::{BOOLEAN, FLOAT, INT, STRING};
    match ty.primitive()? {
        Primitive::Boolean => Some(BOOLEAN),
        Primitive::Int => Some(INT),
        Primitive::Float => Some(FLOAT),
        Primitive::String => Some(STRING),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub datasets: BTreeMap<String, Dataset>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, name: impl Into<String>, dataset: Dataset) -> Self {
        self.datasets.insert(name.into(), dataset);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, dataset) in &self.datasets {
            if !is_identifier(name) {
                return Err(Error::Schema(format!(
                    "dataset name '{name}' is not a valid identifier"
                )));
            }
            dataset.validate()?;
        }
        Ok(())
    }
}
