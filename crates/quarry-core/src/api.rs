//! Query-facing type model.
//!
//! A small GraphQL-shaped description of the API surface: named object, input
//! object and enum definitions that reference each other by name. Built-in
//! scalars (`Int`, `Float`, `String`, `Boolean`) are referenced but never
//! defined. `Display` renders SDL.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hash::{fingerprint, Fingerprint};

pub const INT: &str = "Int";
pub const FLOAT: &str = "Float";
pub const STRING: &str = "String";
pub const BOOLEAN: &str = "Boolean";

/// Name of the root query type.
pub const QUERY: &str = "Query";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    /// The named type at the bottom of any list/non-null wrapping.
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputValue {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl InputValue {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<InputValue>,
}

impl ObjectField {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<InputValue>) -> Self {
        self.arguments = arguments;
        self
    }
}

impl fmt::Display for ObjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            let args: Vec<String> = self.arguments.iter().map(ToString::to_string).collect();
            write!(f, "({})", args.join(", "))?;
        }
        write!(f, ": {}", self.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "entries")]
pub enum TypeBody {
    Object(Vec<ObjectField>),
    InputObject(Vec<InputValue>),
    Enum(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    pub body: TypeBody,
}

impl NamedType {
    pub fn object(name: impl Into<String>, fields: Vec<ObjectField>) -> Self {
        Self {
            name: name.into(),
            body: TypeBody::Object(fields),
        }
    }

    pub fn input_object(name: impl Into<String>, fields: Vec<InputValue>) -> Self {
        Self {
            name: name.into(),
            body: TypeBody::InputObject(fields),
        }
    }

    pub fn enumeration(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            body: TypeBody::Enum(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn reference(&self) -> TypeRef {
        TypeRef::named(self.name.clone())
    }

    /// Entry names in declaration order, whatever the kind.
    pub fn entry_names(&self) -> Vec<&str> {
        match &self.body {
            TypeBody::Object(fields) => fields.iter().map(|f| f.name.as_str()).collect(),
            TypeBody::InputObject(fields) => fields.iter().map(|f| f.name.as_str()).collect(),
            TypeBody::Enum(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn object_field(&self, name: &str) -> Option<&ObjectField> {
        match &self.body {
            TypeBody::Object(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    pub fn input_field(&self, name: &str) -> Option<&InputValue> {
        match &self.body {
            TypeBody::InputObject(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }
}

impl fmt::Display for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            TypeBody::Object(fields) => {
                writeln!(f, "type {} {{", self.name)?;
                for field in fields {
                    writeln!(f, "  {field}")?;
                }
            }
            TypeBody::InputObject(fields) => {
                writeln!(f, "input {} {{", self.name)?;
                for field in fields {
                    writeln!(f, "  {field}")?;
                }
            }
            TypeBody::Enum(values) => {
                writeln!(f, "enum {} {{", self.name)?;
                for value in values {
                    writeln!(f, "  {value}")?;
                }
            }
        }
        f.write_str("}")
    }
}

/// The complete generated API surface: every named definition exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSchema {
    pub query: String,
    pub definitions: Vec<NamedType>,
}

impl ApiSchema {
    pub fn get(&self, name: &str) -> Option<&NamedType> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn query_type(&self) -> Option<&NamedType> {
        self.get(&self.query)
    }

    pub fn fingerprint(&self) -> Result<Fingerprint> {
        fingerprint(self)
    }
}

impl fmt::Display for ApiSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "schema {{\n  query: {}\n}}", self.query)?;
        for definition in &self.definitions {
            writeln!(f)?;
            writeln!(f, "{definition}")?;
        }
        Ok(())
    }
}

/// `people` -> `People`, `market_insights` -> `MarketInsights`,
/// `fullAddress` -> `FullAddress`.
pub fn pascal_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
