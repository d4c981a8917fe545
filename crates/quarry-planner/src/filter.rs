//! Filter compiler: client filter tree to backend boolean query.
//!
//! Every clause lands in filter context (`bool.filter`); disjunctions are
//! `bool.should` nested inside it. A node with no constraints is vacuous and
//! a vacuous root compiles to `match_all`.

use quarry_core::{FieldPath, Result};
use quarry_handlers::dsl;
use quarry_handlers::HandlerRegistry;
use serde_json::{Map, Value};

use crate::catalog::{Dataset, Member};
use crate::request::FilterNode;

/// A compiled node: either no constraint at all, or a backend query.
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    Vacuous,
    Query(Value),
}

pub struct FilterCompiler<'a> {
    dataset: &'a Dataset,
    registry: &'a HandlerRegistry,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(dataset: &'a Dataset, registry: &'a HandlerRegistry) -> Self {
        Self { dataset, registry }
    }

    /// Compile a root filter. Absent and vacuous filters match everything.
    pub fn compile(&self, filter: Option<&FilterNode>) -> Result<Value> {
        let compiled = match filter {
            Some(node) => self.compile_node(node)?,
            None => Compiled::Vacuous,
        };
        Ok(match compiled {
            Compiled::Vacuous => dsl::match_all(),
            Compiled::Query(query) => query,
        })
    }

    pub fn compile_node(&self, node: &FilterNode) -> Result<Compiled> {
        let mut clauses = Vec::new();

        if let Some(cond) = &node.cond {
            clauses.extend(self.compile_cond(cond)?);
        }

        for child in node.and.iter().flatten() {
            match self.compile_node(child)? {
                Compiled::Vacuous => {}
                Compiled::Query(query) => match dsl::conjunction_clauses(&query) {
                    Some(inner) => clauses.extend(inner.iter().cloned()),
                    None => clauses.push(query),
                },
            }
        }

        if let Some(disjunction) = self.compile_or(node.or.as_deref().unwrap_or_default())? {
            clauses.push(disjunction);
        }

        Ok(if clauses.is_empty() {
            Compiled::Vacuous
        } else {
            Compiled::Query(dsl::bool_filter(clauses))
        })
    }

    /// `None` when any branch (or the empty list) makes the disjunction
    /// always true.
    fn compile_or(&self, children: &[FilterNode]) -> Result<Option<Value>> {
        if children.is_empty() {
            return Ok(None);
        }
        let mut branches = Vec::with_capacity(children.len());
        for child in children {
            match self.compile_node(child)? {
                Compiled::Vacuous => return Ok(None),
                Compiled::Query(query) => branches.push(query),
            }
        }
        Ok(Some(dsl::bool_should(branches)))
    }

    fn compile_cond(&self, cond: &Map<String, Value>) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        for (name, params) in cond {
            if params.is_null() {
                continue;
            }
            let Some(member) = self.dataset.member(name) else {
                #[cfg(feature = "tracing")]
                tracing::trace!(field = %name, "filter on unknown field ignored");
                continue;
            };
            let path = FieldPath::root().child(name);
            let fragments = match member {
                Member::Stored(field) => self.registry.filter(&field.ty, &path, params)?,
                Member::Computed(_, computed) => {
                    computed.filter.resolve(&member.site(self.registry, &path), params)?
                }
            };
            out.extend(fragments.into_iter().flatten());
        }
        Ok(out)
    }
}

/// Compile `filter` against `dataset`.
pub fn compile_filter(
    dataset: &Dataset,
    registry: &HandlerRegistry,
    filter: Option<&FilterNode>,
) -> Result<Value> {
    FilterCompiler::new(dataset, registry).compile(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{Error, Field, Primitive, RecordType};
    use serde_json::json;

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

    fn compile(filter: Value) -> Result<Value> {
        let node: FilterNode = serde_json::from_value(filter).unwrap();
        compile_filter(&people(), &HandlerRegistry::standard(), Some(&node))
    }

    #[test]
    fn vacuous_filters_match_all() {
        let registry = HandlerRegistry::standard();
        let match_all = json!({"match_all": {}});
        assert_eq!(compile_filter(&people(), &registry, None).unwrap(), match_all);
        assert_eq!(compile(json!({})).unwrap(), match_all);
        assert_eq!(compile(json!({"and": []})).unwrap(), match_all);
        assert_eq!(compile(json!({"or": []})).unwrap(), match_all);
        assert_eq!(compile(json!({"cond": {"age": {}}})).unwrap(), match_all);
        assert_eq!(compile(json!({"cond": {"height": {"equals": 3}}})).unwrap(), match_all);
        assert_eq!(compile(json!({"cond": {"age": null}})).unwrap(), match_all);
    }

    #[test]
    fn cond_compiles_to_filter_context() {
        assert_eq!(
            compile(json!({"cond": {"name": {"equals": "Tim"}}})).unwrap(),
            json!({"bool": {"filter": [{"term": {"name.keyword": "Tim"}}]}})
        );
    }

    #[test]
    fn single_child_and_is_the_child() {
        let f = json!({"cond": {"age": {"greaterThan": 18}}});
        assert_eq!(compile(json!({"and": [f.clone()]})).unwrap(), compile(f).unwrap());
    }

    #[test]
    fn and_flattens_conjunctions() {
        let compiled = compile(json!({
            "cond": {"isAdult": {"equals": true}},
            "and": [
                {"cond": {"age": {"lessThan": 60}}},
                {"cond": {"name": {"startsWith": "T"}}}
            ]
        }))
        .unwrap();
        assert_eq!(
            compiled,
            json!({"bool": {"filter": [
                {"term": {"isAdult": true}},
                {"range": {"age": {"lt": 60}}},
                {"wildcard": {"name": {"value": "T*"}}}
            ]}})
        );
    }

    #[test]
    fn or_nests_should_inside_filter() {
        let compiled = compile(json!({"or": [
            {"cond": {"name": {"equals": "Tim"}}},
            {"cond": {"name": {"equals": "Lin"}}}
        ]}))
        .unwrap();
        assert_eq!(
            compiled,
            json!({"bool": {"filter": [{"bool": {"should": [
                {"bool": {"filter": [{"term": {"name.keyword": "Tim"}}]}},
                {"bool": {"filter": [{"term": {"name.keyword": "Lin"}}]}}
            ]}}]}})
        );
    }

    #[test]
    fn or_with_a_vacuous_branch_is_vacuous() {
        let compiled = compile(json!({"or": [
            {"cond": {"name": {"equals": "Tim"}}},
            {}
        ]}))
        .unwrap();
        assert_eq!(compiled, json!({"match_all": {}}));
    }

    #[test]
    fn malformed_terms_are_argument_errors() {
        let err = compile(json!({"cond": {"age": {"equals": "old"}}})).unwrap_err();
        assert!(matches!(err, Error::Argument { ref field, .. } if field == "age"));
        assert!(compile(json!({"cond": {"age": {"near": 3}}})).is_err());
    }
}
