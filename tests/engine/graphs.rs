//! Integration tests for graph construction and node tables

use causetable_foundation::{ErrorCategory, Value};

use crate::{triangle, unconnected};

#[test]
fn rejected_edges_leave_graph_unchanged() {
    let dag = triangle();
    let before = dag.edges().len();

    assert_eq!(dag.add_edge("b", "a").unwrap_err().category(), ErrorCategory::Cycle);
    assert_eq!(dag.add_edge("c", "c").unwrap_err().category(), ErrorCategory::Cycle);
    assert_eq!(dag.add_edge("a", "zzz").unwrap_err().category(), ErrorCategory::Domain);
    assert_eq!(dag.edges().len(), before);
}

#[test]
fn copies_are_independent() {
    let original = unconnected(3).add_edge("v0", "v1").unwrap();
    let copy = original.add_edge("v1", "v2").unwrap();
    assert!(!original.has_edge("v1", "v2"));
    assert!(copy.has_edge("v1", "v2"));

    let removed = copy.remove_edge("v0", "v1").unwrap();
    assert!(copy.has_edge("v0", "v1"));
    assert!(!removed.has_edge("v0", "v1"));
}

#[test]
fn structure_queries() {
    let dag = triangle();
    assert_eq!(dag.parents("b").unwrap().into_iter().collect::<Vec<_>>(), vec!["a", "c"]);
    assert_eq!(dag.children("a").unwrap().into_iter().collect::<Vec<_>>(), vec!["b", "c"]);
    assert_eq!(dag.connections("c").unwrap().len(), 2);
    assert_eq!(dag.origin_nodes(), vec!["a"]);
    assert_eq!(dag.parents("nope").unwrap_err().category(), ErrorCategory::Domain);
}

#[test]
fn node_tables_are_conditional_distributions() {
    let dag = triangle();
    let table = dag.calc_node_table("b").unwrap();
    let names: Vec<&str> = table.column_names().collect();
    assert_eq!(names.last(), Some(&"b"));

    for a in 0..2 {
        for c in 0..2 {
            let parent = [("a", Value::Int(a)), ("c", Value::Int(c))];
            let group = table.prob_where(&parent).unwrap();
            if group > 0.0 {
                assert!((group - 1.0).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn marginal_table_sums_to_one() {
    for dag in [triangle(), unconnected(4), unconnected(4).add_edge("v0", "v3").unwrap()] {
        let joint = dag.marginal_table().unwrap();
        assert!((joint.total() - 1.0).abs() < 1e-6);
        assert_eq!(joint.columns().len(), dag.nodes().count());
    }
}

#[test]
fn baked_graphs_refuse_edges_but_agree_on_tables() {
    let dag = triangle();
    let baked = dag.bake().unwrap();
    assert!(baked.is_baked());
    assert_eq!(baked.add_edge("b", "c").unwrap_err().category(), ErrorCategory::State);
    assert_eq!(baked.remove_edge("a", "b").unwrap_err().category(), ErrorCategory::State);
    assert!(
        baked
            .marginal_table()
            .unwrap()
            .approx_eq(&dag.marginal_table().unwrap(), 1e-12)
    );
}

#[test]
fn values_for_node_is_observed_domain() {
    let domain = triangle().values_for_node("a").unwrap();
    assert_eq!(domain.into_iter().collect::<Vec<_>>(), vec![Value::Int(0), Value::Int(1)]);
}
