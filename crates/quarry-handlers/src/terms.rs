//! Term filters: the per-field filter arguments clients send.
//!
//! Every key is optional; an absent or null key adds no constraint. Unknown
//! keys and values of the wrong type are rejected as argument errors.

use quarry_core::api::{NamedType, TypeRef, BOOLEAN, FLOAT, INT, STRING};
use quarry_core::{Error, FieldPath, InputValue, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dsl;

pub const BOOLEAN_FILTER: &str = "BooleanFilter";
pub const INT_FILTER: &str = "IntFilter";
pub const FLOAT_FILTER: &str = "FloatFilter";
pub const STRING_FILTER: &str = "StringFilter";

const RANGE_KEYS: [&str; 4] = ["greaterThan", "greaterEqualTo", "lessThan", "lessEqualTo"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BooleanFilter {
    pub equals: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IntFilter {
    pub equals: Option<i64>,
    pub greater_than: Option<i64>,
    pub greater_equal_to: Option<i64>,
    pub less_than: Option<i64>,
    pub less_equal_to: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FloatFilter {
    pub equals: Option<f64>,
    pub greater_than: Option<f64>,
    pub greater_equal_to: Option<f64>,
    pub less_than: Option<f64>,
    pub less_equal_to: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StringFilter {
    pub equals: Option<String>,
    pub greater_than: Option<String>,
    pub greater_equal_to: Option<String>,
    pub less_than: Option<String>,
    pub less_equal_to: Option<String>,
    pub contains: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
}

impl IntFilter {
    pub fn fragments(&self, path: &FieldPath) -> Vec<Value> {
        let field = path.dotted();
        let mut out: Vec<Value> = self
            .equals
            .map(|v| dsl::term(&dsl::keyword_field(path), v))
            .into_iter()
            .collect();
        out.extend(ranges(
            &field,
            [self.greater_than, self.greater_equal_to, self.less_than, self.less_equal_to],
        ));
        out
    }
}

impl FloatFilter {
    pub fn fragments(&self, path: &FieldPath) -> Vec<Value> {
        let field = path.dotted();
        let mut out: Vec<Value> = self.equals.map(|v| dsl::term(&field, v)).into_iter().collect();
        out.extend(ranges(
            &field,
            [self.greater_than, self.greater_equal_to, self.less_than, self.less_equal_to],
        ));
        out
    }
}

impl StringFilter {
    pub fn fragments(&self, path: &FieldPath) -> Vec<Value> {
        let field = path.dotted();
        let keyword = dsl::keyword_field(path);
        let mut out: Vec<Value> = self
            .equals
            .as_deref()
            .map(|v| dsl::term(&keyword, v))
            .into_iter()
            .collect();
        out.extend(ranges(
            &keyword,
            [
                self.greater_than.as_deref(),
                self.greater_equal_to.as_deref(),
                self.less_than.as_deref(),
                self.less_equal_to.as_deref(),
            ],
        ));
        if let Some(query) = &self.contains {
            out.push(dsl::match_query(&field, query));
        }
        if let Some(prefix) = &self.starts_with {
            out.push(dsl::wildcard(&field, format!("{prefix}*")));
        }
        if let Some(suffix) = &self.ends_with {
            out.push(dsl::wildcard(&field, format!("*{suffix}")));
        }
        out
    }
}

impl BooleanFilter {
    pub fn fragments(&self, path: &FieldPath) -> Vec<Value> {
        self.equals
            .map(|v| dsl::term(&path.dotted(), v))
            .into_iter()
            .collect()
    }
}

/// One `range` fragment per present bound, in gt, gte, lt, lte order.
fn ranges<V: Into<Value>>(field: &str, bounds: [Option<V>; 4]) -> Vec<Value> {
    const BACKEND: [&str; 4] = ["gt", "gte", "lt", "lte"];
    bounds
        .into_iter()
        .zip(BACKEND)
        .filter_map(|(value, bound)| value.map(|v| dsl::range(field, bound, v)))
        .collect()
}

/// Deserialize client parameters for the field at `path`. `null` means no
/// constraint and yields the empty filter.
pub fn parse_params<T>(path: &FieldPath, params: &Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match params {
        Value::Null => Ok(T::default()),
        Value::Object(_) => serde_json::from_value(params.clone())
            .map_err(|e| Error::argument(path.dotted(), e.to_string())),
        other => Err(Error::argument(
            path.dotted(),
            format!("expected a filter object, got {other}"),
        )),
    }
}

fn filter_type(name: &str, scalar: &str, extra: &[&str]) -> NamedType {
    let fields = std::iter::once("equals")
        .chain(RANGE_KEYS)
        .chain(extra.iter().copied())
        .map(|key| InputValue::new(key, TypeRef::named(scalar)))
        .collect();
    NamedType::input_object(name, fields)
}

pub fn boolean_filter_type() -> NamedType {
    NamedType::input_object(
        BOOLEAN_FILTER,
        vec![InputValue::new("equals", TypeRef::named(BOOLEAN))],
    )
}

pub fn int_filter_type() -> NamedType {
    filter_type(INT_FILTER, INT, &[])
}

pub fn float_filter_type() -> NamedType {
    filter_type(FLOAT_FILTER, FLOAT, &[])
}

pub fn string_filter_type() -> NamedType {
    filter_type(STRING_FILTER, STRING, &["contains", "startsWith", "endsWith"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(name: &str) -> FieldPath {
        FieldPath::root().child(name)
    }

    #[test]
    fn int_equality_targets_keyword_and_ranges_do_not() {
        let filter: IntFilter =
            parse_params(&path("age"), &json!({"equals": 45, "greaterThan": 18, "lessEqualTo": 70}))
                .unwrap();
        assert_eq!(
            filter.fragments(&path("age")),
            vec![
                json!({"term": {"age.keyword": 45}}),
                json!({"range": {"age": {"gt": 18}}}),
                json!({"range": {"age": {"lte": 70}}}),
            ]
        );
    }

    #[test]
    fn string_filters_cover_every_key() {
        let filter: StringFilter = parse_params(
            &path("name"),
            &json!({
                "equals": "Tim", "lessThan": "Z", "contains": "im",
                "startsWith": "T", "endsWith": "m"
            }),
        )
        .unwrap();
        assert_eq!(
            filter.fragments(&path("name")),
            vec![
                json!({"term": {"name.keyword": "Tim"}}),
                json!({"range": {"name.keyword": {"lt": "Z"}}}),
                json!({"match": {"name": {"query": "im"}}}),
                json!({"wildcard": {"name": {"value": "T*"}}}),
                json!({"wildcard": {"name": {"value": "*m"}}}),
            ]
        );
    }

    #[test]
    fn null_keys_and_empty_filters_add_nothing() {
        let filter: BooleanFilter = parse_params(&path("ok"), &json!({"equals": null})).unwrap();
        assert!(filter.fragments(&path("ok")).is_empty());
        let filter: FloatFilter = parse_params(&path("score"), &json!({})).unwrap();
        assert!(filter.fragments(&path("score")).is_empty());
        let filter: IntFilter = parse_params(&path("age"), &Value::Null).unwrap();
        assert_eq!(filter, IntFilter::default());
    }

    #[test]
    fn malformed_parameters_are_argument_errors() {
        let err = parse_params::<IntFilter>(&path("age"), &json!({"equals": "old"})).unwrap_err();
        assert!(matches!(err, Error::Argument { ref field, .. } if field == "age"));
        assert!(parse_params::<IntFilter>(&path("age"), &json!({"equals": 1.5})).is_err());
        assert!(parse_params::<BooleanFilter>(&path("ok"), &json!({"is": true})).is_err());
        assert!(parse_params::<StringFilter>(&path("name"), &json!("Tim")).is_err());
    }

    #[test]
    fn filter_input_types_list_their_keys() {
        assert_eq!(
            string_filter_type().entry_names(),
            [
                "equals", "greaterThan", "greaterEqualTo", "lessThan", "lessEqualTo",
                "contains", "startsWith", "endsWith"
            ]
        );
        assert_eq!(float_filter_type().entry_names().len(), 5);
        assert_eq!(boolean_filter_type().entry_names(), ["equals"]);
    }
}
