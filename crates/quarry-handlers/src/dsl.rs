//! Builders for the backend query DSL (Elasticsearch-compatible JSON).

use quarry_core::FieldPath;
use serde_json::{json, Map, Value};

use crate::direction::Direction;

/// Exact-match sub-field carried by `int` and `string` mappings. Equality and
/// sort for those types target `<path>.keyword`.
pub const KEYWORD: &str = "keyword";

pub fn keyword_field(path: &FieldPath) -> String {
    format!("{}.{KEYWORD}", path.dotted())
}

/// Mapping property with an exact-match `keyword` sub-field.
pub fn with_keyword(ty: &str) -> Value {
    json!({ "type": ty, "fields": { KEYWORD: { "type": "keyword" } } })
}

fn single(key: impl Into<String>, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.into(), value);
    Value::Object(map)
}

pub fn match_all() -> Value {
    json!({ "match_all": {} })
}

pub fn term(field: &str, value: impl Into<Value>) -> Value {
    single("term", single(field, value.into()))
}

/// `bound` is one of `gt`, `gte`, `lt`, `lte`.
pub fn range(field: &str, bound: &str, value: impl Into<Value>) -> Value {
    single("range", single(field, single(bound, value.into())))
}

pub fn match_query(field: &str, query: &str) -> Value {
    single("match", single(field, json!({ "query": query })))
}

pub fn wildcard(field: &str, pattern: String) -> Value {
    single("wildcard", single(field, json!({ "value": pattern })))
}

pub fn bool_filter(clauses: Vec<Value>) -> Value {
    json!({ "bool": { "filter": clauses } })
}

pub fn bool_should(clauses: Vec<Value>) -> Value {
    json!({ "bool": { "should": clauses } })
}

pub fn bool_must_not(clauses: Vec<Value>) -> Value {
    json!({ "bool": { "must_not": clauses } })
}

/// The clauses of a pure conjunction (`{bool: {filter: [...]}}` and nothing
/// else), if `query` is one.
pub fn conjunction_clauses(query: &Value) -> Option<&Vec<Value>> {
    let bool_query = query.as_object().filter(|o| o.len() == 1)?.get("bool")?;
    let bool_query = bool_query.as_object().filter(|o| o.len() == 1)?;
    bool_query.get("filter")?.as_array()
}

pub fn sort_clause(field: &str, direction: Direction) -> Value {
    single(field, Value::from(direction.as_backend()))
}

pub fn script(source: &str, params: Map<String, Value>) -> Value {
    json!({ "source": source, "params": params })
}

pub fn script_query(script: Value) -> Value {
    json!({ "script": { "script": script } })
}

/// `kind` is the script's value type: `number` or `string`.
pub fn script_sort(kind: &str, direction: Direction, script: Value) -> Value {
    json!({ "_script": { "type": kind, "order": direction.as_backend(), "script": script } })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_term_and_range_fragments() {
        assert_eq!(term("name.keyword", "Tim"), json!({"term": {"name.keyword": "Tim"}}));
        assert_eq!(range("age", "gt", 18), json!({"range": {"age": {"gt": 18}}}));
        assert_eq!(
            wildcard("name", "Ti*".into()),
            json!({"wildcard": {"name": {"value": "Ti*"}}})
        );
        assert_eq!(sort_clause("age.keyword", Direction::Desc), json!({"age.keyword": "desc"}));
    }

    #[test]
    fn recognises_pure_conjunctions() {
        let conj = bool_filter(vec![term("a", 1)]);
        assert_eq!(conjunction_clauses(&conj).map(Vec::len), Some(1));

        let should = bool_should(vec![term("a", 1)]);
        assert!(conjunction_clauses(&should).is_none());

        let mixed = json!({"bool": {"filter": [], "must_not": []}});
        assert!(conjunction_clauses(&mixed).is_none());
        assert!(conjunction_clauses(&match_all()).is_none());
    }

    #[test]
    fn keyword_paths_use_dotted_form() {
        let path = FieldPath::root().child("person").child("name");
        assert_eq!(keyword_field(&path), "person.name.keyword");
        assert_eq!(
            with_keyword("text"),
            json!({"type": "text", "fields": {"keyword": {"type": "keyword"}}})
        );
    }
}
