//! Interpreter for the query and sort DSL that quarry compiles.
//!
//! Covers `match_all`, `bool` (`filter`, `must`, `should`, `must_not`),
//! `term`, `range`, `match` and `wildcard`, plus field sorts. Text fields are
//! analysed into lowercase alphanumeric tokens; `<field>.keyword` resolves
//! to the exact value when the mapping declares the sub-field. Keyword forms
//! of numbers and booleans are their decimal/literal strings.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::{ExecError, Result};

const KEYWORD_SUFFIX: &str = ".keyword";

static NULL: Value = Value::Null;

/// Read-only view of an index mapping (`{properties}`).
#[derive(Debug, Clone, Copy)]
pub struct MappingView<'a> {
    properties: Option<&'a Map<String, Value>>,
}

impl<'a> MappingView<'a> {
    pub fn new(mapping: &'a Value) -> Self {
        Self {
            properties: mapping.get("properties").and_then(Value::as_object),
        }
    }

    fn property(&self, path: &str) -> Option<&'a Value> {
        let mut properties = self.properties?;
        let mut segments = path.split('.').peekable();
        loop {
            let property = properties.get(segments.next()?)?;
            if segments.peek().is_none() {
                return Some(property);
            }
            properties = property.get("properties")?.as_object()?;
        }
    }

    fn has_keyword(&self, path: &str) -> bool {
        self.property(path)
            .and_then(|p| p.get("fields"))
            .and_then(|f| f.get("keyword"))
            .is_some()
    }

    fn is_text(&self, path: &str) -> bool {
        self.property(path).and_then(|p| p.get("type")).and_then(Value::as_str) == Some("text")
    }
}

/// How a DSL field name addresses a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target<'q> {
    Keyword(&'q str),
    Text(&'q str),
    Plain(&'q str),
}

impl<'q> Target<'q> {
    fn resolve(field: &'q str, mapping: &MappingView<'_>) -> Self {
        if let Some(base) = field.strip_suffix(KEYWORD_SUFFIX) {
            if mapping.has_keyword(base) {
                return Target::Keyword(base);
            }
        }
        if mapping.is_text(field) {
            Target::Text(field)
        } else {
            Target::Plain(field)
        }
    }

    fn path(&self) -> &'q str {
        match *self {
            Target::Keyword(p) | Target::Text(p) | Target::Plain(p) => p,
        }
    }
}

fn lookup<'d>(doc: &'d Value, path: &str) -> Option<&'d Value> {
    path.split('.')
        .try_fold(doc, |value, segment| value.get(segment))
        .filter(|v| !v.is_null())
}

fn keyword(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Order two values the way `target` is indexed.
fn compare_as(target: Target<'_>, doc_value: &Value, other: &Value) -> Option<Ordering> {
    match target {
        Target::Keyword(_) => Some(keyword(doc_value)?.cmp(&keyword(other)?)),
        Target::Text(_) | Target::Plain(_) => compare(doc_value, other),
    }
}

/// `*` matches any run, `?` any single character.
fn glob(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}

fn malformed(kind: &str, body: &Value) -> ExecError {
    ExecError::Backend(format!("malformed {kind} query: {body}"))
}

/// The single `{field: params}` pair of a leaf query.
fn leaf<'q>(kind: &str, body: &'q Value) -> Result<(&'q str, &'q Value)> {
    let object = body.as_object().filter(|o| o.len() == 1);
    object
        .and_then(|o| o.iter().next())
        .map(|(field, params)| (field.as_str(), params))
        .ok_or_else(|| malformed(kind, body))
}

/// Either `{<key>: v}` or the bare value `v`.
fn unwrap_param<'q>(params: &'q Value, key: &str) -> &'q Value {
    match params {
        Value::Object(o) => o.get(key).unwrap_or(&NULL),
        other => other,
    }
}

pub struct Matcher<'a> {
    mapping: MappingView<'a>,
}

impl<'a> Matcher<'a> {
    pub fn new(mapping: MappingView<'a>) -> Self {
        Self { mapping }
    }

    pub fn matches(&self, query: &Value, doc: &Value) -> Result<bool> {
        let (kind, body) = leaf("top-level", query)?;
        match kind {
            "match_all" => Ok(true),
            "bool" => self.bool_query(body, doc),
            "term" => self.term(body, doc),
            "range" => self.range(body, doc),
            "match" => self.match_text(body, doc),
            "wildcard" => self.wildcard(body, doc),
            other => Err(ExecError::Unsupported(format!("'{other}' queries"))),
        }
    }

    fn clauses<'q>(&self, body: &'q Value, key: &str) -> Result<&'q [Value]> {
        match body.get(key) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(malformed("bool", body)),
        }
    }

    fn all(&self, clauses: &[Value], doc: &Value) -> Result<bool> {
        for clause in clauses {
            if !self.matches(clause, doc)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn count(&self, clauses: &[Value], doc: &Value) -> Result<usize> {
        let mut n = 0;
        for clause in clauses {
            if self.matches(clause, doc)? {
                n += 1;
            }
        }
        Ok(n)
    }

    fn bool_query(&self, body: &Value, doc: &Value) -> Result<bool> {
        let filter = self.clauses(body, "filter")?;
        let must = self.clauses(body, "must")?;
        let should = self.clauses(body, "should")?;
        let must_not = self.clauses(body, "must_not")?;

        if !self.all(filter, doc)? || !self.all(must, doc)? {
            return Ok(false);
        }
        if self.count(must_not, doc)? > 0 {
            return Ok(false);
        }
        let minimum = match body.get("minimum_should_match").and_then(Value::as_u64) {
            Some(n) => n as usize,
            None if should.is_empty() || !filter.is_empty() || !must.is_empty() => 0,
            None => 1,
        };
        Ok(self.count(should, doc)? >= minimum)
    }

    fn term(&self, body: &Value, doc: &Value) -> Result<bool> {
        let (field, params) = leaf("term", body)?;
        let expected = unwrap_param(params, "value");
        let target = Target::resolve(field, &self.mapping);
        let Some(actual) = lookup(doc, target.path()) else {
            return Ok(false);
        };
        Ok(match target {
            Target::Text(_) => match expected.as_str() {
                Some(term) => actual.as_str().map_or(false, |text| tokens(text).iter().any(|t| t == term)),
                None => false,
            },
            _ => compare_as(target, actual, expected) == Some(Ordering::Equal),
        })
    }

    fn range(&self, body: &Value, doc: &Value) -> Result<bool> {
        let (field, params) = leaf("range", body)?;
        let bounds = params.as_object().ok_or_else(|| malformed("range", body))?;
        let target = Target::resolve(field, &self.mapping);
        let Some(actual) = lookup(doc, target.path()) else {
            return Ok(false);
        };
        for (bound, limit) in bounds {
            let ordering = compare_as(target, actual, limit);
            let ok = match bound.as_str() {
                "gt" => ordering == Some(Ordering::Greater),
                "gte" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                "lt" => ordering == Some(Ordering::Less),
                "lte" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                _ => return Err(malformed("range", body)),
            };
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn match_text(&self, body: &Value, doc: &Value) -> Result<bool> {
        let (field, params) = leaf("match", body)?;
        let query = unwrap_param(params, "query");
        let query = keyword(query).ok_or_else(|| malformed("match", body))?;
        let Some(actual) = lookup(doc, field).and_then(keyword) else {
            return Ok(false);
        };
        let haystack = tokens(&actual);
        Ok(tokens(&query).iter().any(|t| haystack.contains(t)))
    }

    fn wildcard(&self, body: &Value, doc: &Value) -> Result<bool> {
        let (field, params) = leaf("wildcard", body)?;
        let pattern = unwrap_param(params, "value")
            .as_str()
            .ok_or_else(|| malformed("wildcard", body))?;
        let target = Target::resolve(field, &self.mapping);
        let Some(actual) = lookup(doc, target.path()).and_then(keyword) else {
            return Ok(false);
        };
        Ok(match target {
            Target::Text(_) => {
                let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
                tokens(&actual).iter().any(|t| {
                    let chars: Vec<char> = t.chars().collect();
                    glob(&pattern, &chars)
                })
            }
            _ => {
                let pattern: Vec<char> = pattern.chars().collect();
                let chars: Vec<char> = actual.chars().collect();
                glob(&pattern, &chars)
            }
        })
    }
}

/// One parsed sort clause.
#[derive(Debug, Clone)]
struct SortKey<'q> {
    target: Target<'q>,
    descending: bool,
}

fn parse_sort<'q>(clauses: &'q [Value], mapping: &MappingView<'_>) -> Result<Vec<SortKey<'q>>> {
    clauses
        .iter()
        .map(|clause| {
            let (field, spec) = match clause {
                Value::String(field) => (field.as_str(), &NULL),
                _ => leaf("sort", clause)?,
            };
            if field.starts_with('_') {
                return Err(ExecError::Unsupported(format!("'{field}' sorts")));
            }
            let order = unwrap_param(spec, "order");
            let descending = match order.as_str() {
                None | Some("asc") => false,
                Some("desc") => true,
                Some(_) => return Err(malformed("sort", clause)),
            };
            Ok(SortKey {
                target: Target::resolve(field, mapping),
                descending,
            })
        })
        .collect()
}

/// Stable sort by `clauses`. Documents missing a sort value go last.
pub fn sort_documents(docs: &mut [Value], clauses: &[Value], mapping: &MappingView<'_>) -> Result<()> {
    let keys = parse_sort(clauses, mapping)?;
    docs.sort_by(|a, b| {
        for key in &keys {
            let ordering = match (lookup(a, key.target.path()), lookup(b, key.target.path())) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => {
                    let ordering = compare_as(key.target, x, y).unwrap_or(Ordering::Equal);
                    if key.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping() -> Value {
        json!({"properties": {
            "name": {"type": "text", "fields": {"keyword": {"type": "keyword"}}},
            "age": {"type": "integer", "fields": {"keyword": {"type": "keyword"}}},
            "score": {"type": "float"},
            "address": {"type": "object", "properties": {
                "city": {"type": "text", "fields": {"keyword": {"type": "keyword"}}}
            }}
        }})
    }

    fn doc() -> Value {
        json!({"name": "Juan Lopez", "age": 12, "score": 0.5, "address": {"city": "Lima"}})
    }

    fn check(query: Value) -> bool {
        let mapping = mapping();
        Matcher::new(MappingView::new(&mapping)).matches(&query, &doc()).unwrap()
    }

    #[test]
    fn term_queries_use_keyword_forms() {
        assert!(check(json!({"term": {"name.keyword": "Juan Lopez"}})));
        assert!(!check(json!({"term": {"name.keyword": "juan lopez"}})));
        assert!(check(json!({"term": {"age.keyword": 12}})));
        assert!(check(json!({"term": {"address.city.keyword": "Lima"}})));
        assert!(check(json!({"term": {"score": 0.5}})));
    }

    #[test]
    fn ranges_compare_numbers_and_keywords() {
        assert!(check(json!({"range": {"age": {"gt": 10, "lte": 12}}})));
        assert!(!check(json!({"range": {"age": {"gte": 13}}})));
        assert!(check(json!({"range": {"name.keyword": {"lt": "K"}}})));
        assert!(!check(json!({"range": {"missing": {"gt": 0}}})));
    }

    #[test]
    fn text_queries_work_on_tokens() {
        assert!(check(json!({"match": {"name": {"query": "lopez"}}})));
        assert!(!check(json!({"match": {"name": {"query": "tim"}}})));
        assert!(check(json!({"wildcard": {"name": {"value": "Ju*"}}})));
        assert!(check(json!({"wildcard": {"name": {"value": "*pez"}}})));
        assert!(!check(json!({"wildcard": {"name": {"value": "*an*z"}}})));
    }

    #[test]
    fn bool_queries_combine_clauses() {
        assert!(check(json!({"bool": {"filter": [{"term": {"age.keyword": 12}}]}})));
        assert!(check(json!({"bool": {"should": [
            {"term": {"age.keyword": 1}}, {"term": {"age.keyword": 12}}
        ]}})));
        assert!(!check(json!({"bool": {"should": [{"term": {"age.keyword": 1}}]}})));
        assert!(!check(json!({"bool": {"must_not": [{"match_all": {}}]}})));
        assert!(check(json!({"bool": {}})));
    }

    #[test]
    fn scripts_are_unsupported() {
        let mapping = mapping();
        let matcher = Matcher::new(MappingView::new(&mapping));
        let err = matcher
            .matches(&json!({"script": {"script": {"source": "true"}}}), &doc())
            .unwrap_err();
        assert!(matches!(err, ExecError::Unsupported(_)));
    }

    #[test]
    fn sorts_keyword_numbers_lexicographically() {
        let mapping = mapping();
        let view = MappingView::new(&mapping);
        let mut docs = vec![json!({"age": 9}), json!({"age": 45}), json!({}), json!({"age": 100})];
        sort_documents(&mut docs, &[json!({"age.keyword": "asc"})], &view).unwrap();
        assert_eq!(docs, vec![json!({"age": 100}), json!({"age": 45}), json!({"age": 9}), json!({})]);

        sort_documents(&mut docs, &[json!({"age": {"order": "desc"}})], &view).unwrap();
        assert_eq!(docs[0], json!({"age": 100}));
        assert_eq!(docs[3], json!({}));
    }

    #[test]
    fn glob_handles_stars_and_marks() {
        let g = |p: &str, t: &str| {
            glob(&p.chars().collect::<Vec<_>>(), &t.chars().collect::<Vec<_>>())
        };
        assert!(g("t*", "tim"));
        assert!(g("*m", "tim"));
        assert!(g("t?m", "tim"));
        assert!(!g("t?", "tim"));
        assert!(g("*", ""));
    }
}
