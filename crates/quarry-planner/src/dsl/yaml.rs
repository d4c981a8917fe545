//! YAML catalog parser.
//!
//! Example:
//! ```yaml
//! config:
//!   index_prefix: "dev_"
//! datasets:
//!   people:
//!     index: people
//!     schema:
//!       name: Person
//!       fields:
//!         - { name: name, type: string }
//!         - { name: age, type: int }
//!         - name: address
//!           type: { type: record, name: Address, fields: [ { name: city, type: string } ] }
//!     computed:
//!       oldEnough:
//!         type: boolean
//!         arguments: [ { name: min, type: int } ]
//!         filter_script: "doc['age'].value >= params.min"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quarry_core::{EngineConfig, Error, Field, Primitive, RecordType, Result, SchemaType};
use quarry_handlers::{Argument, ComputedField};

use crate::catalog::{Catalog, Dataset};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDoc {
    #[serde(default)]
    pub config: Option<CatalogConfig>,
    pub datasets: BTreeMap<String, DatasetDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetDef {
    /// Defaults to the dataset name.
    #[serde(default)]
    pub index: Option<String>,
    pub schema: RecordDef,
    #[serde(default)]
    pub computed: BTreeMap<String, ComputedDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDef,
}

/// `"int"`, or `{type: record, name, fields}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDef {
    Named(String),
    Record {
        #[serde(rename = "type")]
        kind: String,
        name: String,
        fields: Vec<FieldDef>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputedDef {
    #[serde(rename = "type")]
    pub ty: TypeDef,
    #[serde(default)]
    pub arguments: Vec<FieldDef>,
    #[serde(default)]
    pub filter_script: Option<String>,
    #[serde(default)]
    pub sort_script: Option<String>,
    /// Also list the field on the dataset's object type.
    #[serde(default)]
    pub expose_field: bool,
}

/// Overrides applied on top of the environment-derived engine config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub backend_url: Option<String>,
    pub index_prefix: Option<String>,
    pub log_queries: Option<bool>,
}

impl CatalogConfig {
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(url) = &self.backend_url {
            config.backend_url = url.trim_end_matches('/').to_string();
        }
        if let Some(prefix) = &self.index_prefix {
            config.index_prefix = Some(prefix.clone()).filter(|p| !p.is_empty());
        }
        if let Some(flag) = self.log_queries {
            config.log_queries = flag;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedCatalog {
    pub catalog: Catalog,
    pub config: CatalogConfig,
}

fn to_type(def: &TypeDef) -> Result<SchemaType> {
    match def {
        TypeDef::Named(name) => Primitive::parse(name)
            .map(SchemaType::from)
            .ok_or_else(|| Error::Config(format!("unknown field type '{name}'"))),
        TypeDef::Record { kind, name, fields } => {
            if kind != "record" {
                return Err(Error::Config(format!(
                    "unsupported complex type '{kind}' for '{name}'"
                )));
            }
            Ok(to_record(name, fields)?.into())
        }
    }
}

fn to_fields(defs: &[FieldDef]) -> Result<Vec<Field>> {
    defs.iter()
        .map(|f| Ok(Field::new(f.name.clone(), to_type(&f.ty)?)))
        .collect()
}

fn to_record(name: &str, fields: &[FieldDef]) -> Result<RecordType> {
    Ok(RecordType::new(name, to_fields(fields)?))
}

fn to_computed(def: &ComputedDef) -> Result<ComputedField> {
    let arguments = to_fields(&def.arguments)?
        .into_iter()
        .map(|f| Argument {
            name: f.name,
            ty: f.ty,
        })
        .collect();
    let field = ComputedField::scripted(
        to_type(&def.ty)?,
        arguments,
        def.filter_script.clone(),
        def.sort_script.clone(),
    );
    Ok(if def.expose_field {
        field.standard_field()
    } else {
        field
    })
}

/// Parse a YAML catalog. The catalog is validated before it is returned.
pub fn parse_yaml_catalog(yaml_src: &str) -> Result<ParsedCatalog> {
    let doc: CatalogDoc =
        serde_yaml::from_str(yaml_src).map_err(|e| Error::Config(e.to_string()))?;

    let mut catalog = Catalog::new();
    for (name, def) in doc.datasets {
        let schema = to_record(&def.schema.name, &def.schema.fields)?;
        let index = def.index.unwrap_or_else(|| name.clone());
        let mut dataset = Dataset::new(schema, index);
        for (field_name, computed) in &def.computed {
            dataset = dataset.with_computed(field_name.clone(), to_computed(computed)?);
        }
        catalog = catalog.with_dataset(name, dataset);
    }
    catalog.validate()?;

    Ok(ParsedCatalog {
        catalog,
        config: doc.config.unwrap_or_default(),
    })
}
