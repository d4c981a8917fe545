//! Engine trace points. Without the `tracing` feature `record` compiles to
//! nothing.

/// What the engine just did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    SchemaBuilt,
    QueryCompiled,
    Search,
    IndexCreated,
}

impl Milestone {
    pub fn as_str(self) -> &'static str {
        match self {
            Milestone::SchemaBuilt => "schema_built",
            Milestone::QueryCompiled => "query_compiled",
            Milestone::Search => "search",
            Milestone::IndexCreated => "index_created",
        }
    }
}

/// Record `milestone` inside a `quarry.engine` span. `subject` names what it
/// concerns (a dataset, an index, a schema fingerprint).
#[cfg(feature = "tracing")]
pub fn record(milestone: Milestone, subject: &str, details: &[(&str, String)]) {
    let span = tracing::debug_span!(
        "quarry.engine",
        milestone = milestone.as_str(),
        subject = %subject
    );
    let _entered = span.enter();
    for (key, value) in details {
        tracing::debug!(detail = %key, value = %value);
    }
}

#[cfg(not(feature = "tracing"))]
pub fn record(_milestone: Milestone, _subject: &str, _details: &[(&str, String)]) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_have_stable_names() {
        assert_eq!(Milestone::SchemaBuilt.as_str(), "schema_built");
        assert_eq!(Milestone::IndexCreated.as_str(), "index_created");
        record(Milestone::Search, "people", &[("hits", "0".into())]);
    }
}
