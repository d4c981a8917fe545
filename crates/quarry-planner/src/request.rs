//! Request-time arguments and the compiled backend request.

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Client filter tree: per-field term filters in `cond`, combined with the
/// `and` and `or` children. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cond: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<FilterNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<FilterNode>>,
}

/// One element of the `order` list: field name to direction, or to
/// `{arguments, order}` for computed fields with arguments.
pub type OrderEntry = Map<String, Value>;

/// Arguments of a dataset's `Query` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetArguments {
    #[serde(default)]
    pub filter: Option<FilterNode>,
    #[serde(default)]
    pub order: Option<Vec<OrderEntry>>,
}

impl DatasetArguments {
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone())
            .map_err(|e| Error::argument("arguments", e.to_string()))
    }
}

/// Backend search body: `{query, sort?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<Value>>,
}

impl SearchRequest {
    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.clone());
        if let Some(sort) = &self.sort {
            body.insert("sort".to_string(), Value::Array(sort.clone()));
        }
        Value::Object(body)
    }
}
