//! Record schema model. Pure data; immutable once built.
//!
//! A dataset schema is a `RecordType`: an ordered list of named fields, each
//! typed as a primitive or a nested record. Field order is significant, it
//! drives the order of API fields and mapping properties.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Boolean,
    Int,
    Float,
    String,
    Bytes,
    Null,
    Long,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Int,
        Primitive::Float,
        Primitive::String,
        Primitive::Bytes,
        Primitive::Null,
        Primitive::Long,
        Primitive::Double,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::String => "string",
            Primitive::Bytes => "bytes",
            Primitive::Null => "null",
            Primitive::Long => "long",
            Primitive::Double => "double",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Primitive(Primitive),
    Record(RecordType),
}

impl SchemaType {
    pub const BOOLEAN: SchemaType = SchemaType::Primitive(Primitive::Boolean);
    pub const INT: SchemaType = SchemaType::Primitive(Primitive::Int);
    pub const FLOAT: SchemaType = SchemaType::Primitive(Primitive::Float);
    pub const STRING: SchemaType = SchemaType::Primitive(Primitive::String);
    pub const BYTES: SchemaType = SchemaType::Primitive(Primitive::Bytes);
    pub const NULL: SchemaType = SchemaType::Primitive(Primitive::Null);
    pub const LONG: SchemaType = SchemaType::Primitive(Primitive::Long);
    pub const DOUBLE: SchemaType = SchemaType::Primitive(Primitive::Double);

    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            SchemaType::Primitive(p) => Some(*p),
            SchemaType::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            SchemaType::Record(r) => Some(r),
            SchemaType::Primitive(_) => None,
        }
    }
}

impl From<Primitive> for SchemaType {
    fn from(p: Primitive) -> Self {
        SchemaType::Primitive(p)
    }
}

impl From<RecordType> for SchemaType {
    fn from(r: RecordType) -> Self {
        SchemaType::Record(r)
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Primitive(p) => p.fmt(f),
            SchemaType::Record(r) => write!(f, "record {}", r.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SchemaType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<SchemaType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<Field>,
}

impl RecordType {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Check names and uniqueness, recursing into nested records.
    ///
    /// Record and field names end up as API identifiers, so they must be
    /// valid identifiers; field names must be unique within one record.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.name) {
            return Err(Error::Schema(format!(
                "record name '{}' is not a valid identifier",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !is_identifier(&field.name) {
                return Err(Error::Schema(format!(
                    "field '{}' of record '{}' is not a valid identifier",
                    field.name, self.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::Schema(format!(
                    "record '{}' declares field '{}' more than once",
                    self.name, field.name
                )));
            }
            if let SchemaType::Record(nested) = &field.ty {
                nested.validate()?;
            }
        }
        Ok(())
    }
}

/// Sequence of field names from the dataset root to a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Dotted form used as the backend field name (`person.address.street`).
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// `[_A-Za-z][_0-9A-Za-z]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
