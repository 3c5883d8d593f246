//! Graphviz DOT rendering for graphs and queries.

use std::fmt::Write;

use causetable_engine::{Dag, Query};

/// Styling switches for [`query_to_dot`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draws a short stub arrow into every intervened node.
    pub emphasize_interventions: bool,
}

impl RenderOptions {
    /// Builder method to toggle intervention stubs.
    #[must_use]
    pub fn with_emphasized_interventions(mut self, enabled: bool) -> Self {
        self.emphasize_interventions = enabled;
        self
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Id of the invisible node an intervention stub starts from. Leading
/// spaces are added until it names no graph node.
fn stub_id(dag: &Dag, node: &str) -> String {
    let mut id = format!(" do:{node}");
    while dag.has_node(&id) {
        id.insert(0, ' ');
    }
    id
}

fn header(out: &mut String) {
    out.push_str("digraph {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=circle];\n");
}

/// Renders the graph's nodes and edges.
#[must_use]
pub fn dag_to_dot(dag: &Dag) -> String {
    let mut out = String::new();
    header(&mut out);
    for node in dag.nodes() {
        let _ = writeln!(out, "  {};", quote(node));
    }
    for (source, sink) in dag.edges() {
        let _ = writeln!(out, "  {} -> {};", quote(source), quote(sink));
    }
    out.push_str("}\n");
    out
}

/// Renders a query's graph, highlighting its evidence and interventions.
///
/// Fixed nodes are drawn as double circles. Edges into intervened nodes
/// are dashed and gray since inference ignores them; edges between two
/// fixed nodes are gray.
#[must_use]
pub fn query_to_dot(query: &Query, options: &RenderOptions) -> String {
    let dag = query.dag();
    let intervened = |n: &str| query.interventions().contains_key(n);

    let mut out = String::new();
    header(&mut out);
    for node in dag.nodes() {
        if query.is_fixed(node) {
            let _ = writeln!(out, "  {} [shape=doublecircle];", quote(node));
        } else {
            let _ = writeln!(out, "  {};", quote(node));
        }
    }

    for (source, sink) in dag.edges() {
        let style = if intervened(sink) {
            " [style=dashed, color=lightgray]"
        } else if query.is_fixed(source) && query.is_fixed(sink) {
            " [color=lightgray]"
        } else {
            ""
        };
        let _ = writeln!(out, "  {} -> {}{style};", quote(source), quote(sink));
    }

    if options.emphasize_interventions {
        for node in query.interventions().keys() {
            let stub = quote(&stub_id(dag, node));
            let _ = writeln!(out, "  {stub} [shape=point, style=invis];");
            let _ = writeln!(out, "  {stub} -> {} [penwidth=2];", quote(node));
        }
    }

    out.push_str("}\n");
    out
}
