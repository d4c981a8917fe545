//! End-to-end filter/order scenarios over a small `people` index

use quarry_core::{EngineConfig, Field, Primitive, RecordType};
use quarry_exec::{Engine, MemoryBackend};
use quarry_handlers::HandlerRegistry;
use quarry_planner::{compile_filter, Catalog, Dataset, FilterNode};
use serde_json::{json, Value};

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

fn engine() -> Engine<MemoryBackend> {
    let catalog = Catalog::new().with_dataset("people", people());
    let engine = Engine::new(EngineConfig::default(), catalog, MemoryBackend::new())
        .expect("catalog is valid");
    engine.create_indices().expect("indices created");
    engine
        .backend()
        .extend(
            "people",
            [
                json!({"name": "Tim", "age": 45, "isAdult": true}),
                json!({"name": "Juan", "age": 12, "isAdult": false}),
                json!({"name": "Lin", "age": 64, "isAdult": true}),
            ],
        )
        .expect("documents inserted");
    engine
}

fn names(hits: &[Value]) -> Vec<&str> {
    hits.iter().filter_map(|h| h["name"].as_str()).collect()
}

fn compile(filter: Option<Value>) -> Value {
    let node: Option<FilterNode> = filter.map(|f| serde_json::from_value(f).unwrap());
    compile_filter(&people(), &HandlerRegistry::standard(), node.as_ref()).unwrap()
}

#[test]
fn test_equality_filter() {
    let engine = engine();
    let args = json!({"filter": {"cond": {"name": {"equals": "Tim"}}}});

    let request = engine.compile("people", &args).unwrap();
    assert_eq!(
        request.to_value(),
        json!({"query": {"bool": {"filter": [{"term": {"name.keyword": "Tim"}}]}}})
    );
    assert_eq!(names(&engine.search("people", &args).unwrap()), ["Tim"]);
}

#[test]
fn test_or_filter_stays_in_filter_context() {
    let engine = engine();
    let args = json!({"filter": {"or": [
        {"cond": {"name": {"equals": "Tim"}}},
        {"cond": {"age": {"greaterThan": 60}}}
    ]}});

    let request = engine.compile("people", &args).unwrap();
    let outer = &request.query["bool"]["filter"];
    assert_eq!(outer.as_array().map(Vec::len), Some(1));
    assert_eq!(outer[0]["bool"]["should"].as_array().map(Vec::len), Some(2));
    assert!(request.query["bool"].get("must").is_none());

    assert_eq!(names(&engine.search("people", &args).unwrap()), ["Tim", "Lin"]);
}

#[test]
fn test_order_by_age_descending() {
    let engine = engine();
    let args = json!({"order": [{"age": "DESC"}]});

    let request = engine.compile("people", &args).unwrap();
    assert_eq!(request.sort, Some(vec![json!({"age.keyword": "desc"})]));
    assert_eq!(request.query, json!({"match_all": {}}));
    assert_eq!(
        names(&engine.search("people", &args).unwrap()),
        ["Lin", "Tim", "Juan"]
    );
}

#[test]
fn test_two_sort_clauses_keep_their_order() {
    let engine = engine();
    let args = json!({"order": [{"isAdult": "DESC"}, {"name": "ASC"}]});

    let request = engine.compile("people", &args).unwrap();
    assert_eq!(
        request.sort,
        Some(vec![json!({"isAdult": "desc"}), json!({"name.keyword": "asc"})])
    );
    assert_eq!(
        names(&engine.search("people", &args).unwrap()),
        ["Lin", "Tim", "Juan"]
    );
}

#[test]
fn test_vacuous_filters_are_match_all() {
    let match_all = json!({"match_all": {}});
    assert_eq!(compile(None), match_all);
    assert_eq!(compile(Some(json!({}))), match_all);
    assert_eq!(compile(Some(json!({"and": []}))), match_all);
    assert_eq!(compile(Some(json!({"or": []}))), match_all);
    assert_eq!(compile(Some(json!({"cond": {}}))), match_all);
}

#[test]
fn test_single_and_child_equals_child() {
    let f = json!({"cond": {"age": {"greaterEqualTo": 18}, "isAdult": {"equals": true}}});
    assert_eq!(compile(Some(json!({"and": [f.clone()]}))), compile(Some(f)));
}

#[test]
fn test_combined_conditions_search() {
    let engine = engine();
    let args = json!({
        "filter": {
            "cond": {"isAdult": {"equals": true}},
            "and": [{"cond": {"name": {"startsWith": "L"}}}]
        }
    });
    assert_eq!(names(&engine.search("people", &args).unwrap()), ["Lin"]);

    let args = json!({"filter": {"cond": {"name": {"contains": "juan"}}}});
    assert_eq!(names(&engine.search("people", &args).unwrap()), ["Juan"]);
}

#[test]
fn test_no_arguments_return_everything_in_insertion_order() {
    let engine = engine();
    let request = engine.compile("people", &json!({})).unwrap();
    assert_eq!(request.to_value(), json!({"query": {"match_all": {}}}));
    assert_eq!(
        names(&engine.search("people", &Value::Null).unwrap()),
        ["Tim", "Juan", "Lin"]
    );
}
