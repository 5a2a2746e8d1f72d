//! Sample graph workload.

/// A labelled Gremlin script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleQuery {
    /// Short name printed before the query runs.
    pub label: &'static str,
    /// Gremlin script.
    pub gremlin: &'static str,
}

const fn sample(label: &'static str, gremlin: &'static str) -> SampleQuery {
    SampleQuery { label, gremlin }
}

/// Builds a small social graph, queries it and tears part of it down.
/// Must run in order: later entries depend on the vertices and edges added
/// by earlier ones.
pub const SAMPLE_QUERIES: &[SampleQuery] = &[
    sample("Cleanup", "g.V().drop()"),
    sample(
        "AddVertex 1",
        "g.addV('person').property('id', 'thomas').property('firstName', 'Thomas').property('age', 44)",
    ),
    sample(
        "AddVertex 2",
        "g.addV('person').property('id', 'mary').property('firstName', 'Mary').property('lastName', 'Andersen').property('age', 39)",
    ),
    sample(
        "AddVertex 3",
        "g.addV('person').property('id', 'ben').property('firstName', 'Ben').property('lastName', 'Miller')",
    ),
    sample(
        "AddVertex 4",
        "g.addV('person').property('id', 'robin').property('firstName', 'Robin').property('lastName', 'Wakefield')",
    ),
    sample("AddEdge 1", "g.V('thomas').addE('knows').to(g.V('mary'))"),
    sample("AddEdge 2", "g.V('thomas').addE('knows').to(g.V('ben'))"),
    sample("AddEdge 3", "g.V('ben').addE('knows').to(g.V('robin'))"),
    sample("UpdateVertex", "g.V('thomas').property('age', 44)"),
    sample("CountVertices", "g.V().count()"),
    sample("Filter Range", "g.V().hasLabel('person').has('age', gt(40))"),
    sample("Project", "g.V().hasLabel('person').values('firstName')"),
    sample("Sort", "g.V().hasLabel('person').order().by('firstName', decr)"),
    sample("Traverse", "g.V('thomas').out('knows').hasLabel('person')"),
    sample(
        "Traverse 2x",
        "g.V('thomas').out('knows').hasLabel('person').out('knows').hasLabel('person')",
    ),
    sample(
        "Loop",
        "g.V('thomas').repeat(out()).until(has('id', 'robin')).path()",
    ),
    sample(
        "DropEdge",
        "g.V('thomas').outE('knows').where(inV().has('id', 'mary')).drop()",
    ),
    sample("CountEdges", "g.E().count()"),
    sample("DropVertex", "g.V('thomas').drop()"),
];

/// Returns the sample queries in execution order.
#[must_use]
pub fn sample_queries() -> &'static [SampleQuery] {
    SAMPLE_QUERIES
}

/// Looks a sample query up by label, ignoring case.
#[must_use]
pub fn find(label: &str) -> Option<&'static SampleQuery> {
    SAMPLE_QUERIES
        .iter()
        .find(|q| q.label.eq_ignore_ascii_case(label))
}
