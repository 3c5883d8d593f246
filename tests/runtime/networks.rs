//! Integration tests for BIF networks feeding the engine

use causetable_engine::Query;
use causetable_foundation::{ErrorCategory, Value};
use causetable_runtime::bif;
use causetable_runtime::render::{RenderOptions, dag_to_dot, query_to_dot};

use crate::NETWORK;

#[test]
fn joint_table_matches_declared_tables() {
    let network = bif::parse(NETWORK).unwrap();
    assert_eq!(network.network_type, "unknown");
    assert_eq!(network.variables.len(), 4);
    assert_eq!(network.table.len(), 16);
    assert!((network.table.total() - 1.0).abs() < 1e-9);

    let b = network.table.distribution("B").unwrap();
    assert!((b[&Value::from("yes")] - 0.5).abs() < 1e-12);
    let c = network.table.distribution("C").unwrap();
    assert!((c[&Value::from("yes")] - 0.03).abs() < 1e-12);
}

#[test]
fn generated_dataset_supports_queries() {
    let network = bif::parse(NETWORK).unwrap();
    let dag = network.to_dag(10_000).unwrap().bake().unwrap();
    assert_eq!(dag.edge_count(), 3);

    let out = Query::new(dag).given([("D", "no")]).unwrap().infer().unwrap();
    assert!((out.prob("A", &Value::from("no")).unwrap() - 1.0).abs() < 1e-9);
    assert!((out.prob("B", &Value::from("no")).unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn small_datasets_keep_size_and_drop_impossible_rows() {
    let network = bif::parse(NETWORK).unwrap();
    let data = network.to_dataset(100).unwrap();
    assert_eq!(data.len(), 100);
    // D is certain to be "yes" whenever A or B is "yes".
    let counts = data.count_by(&["A", "D"]).unwrap();
    assert!(!counts.contains_key(&vec![Value::from("yes"), Value::from("no")]));
    let rare = counts
        .get(&vec![Value::from("yes"), Value::from("yes")])
        .copied()
        .unwrap_or(0);
    assert!(rare <= 2);
}

#[test]
fn malformed_networks_report_lines() {
    let err = bif::parse("network unknown {\n}\nvariable X {\n  type discrete [ 3 ] { a, b };\n}\n")
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn rendering_reflects_query() {
    let dag = bif::parse(NETWORK).unwrap().to_dag(1_000).unwrap();
    let plain = dag_to_dot(&dag);
    assert!(plain.contains("\"B\" -> \"C\";"));

    let query = Query::new(dag).intervene([("D", "yes")]).unwrap();
    let dot = query_to_dot(&query, &RenderOptions::default());
    assert!(dot.contains("\"A\" -> \"D\" [style=dashed, color=lightgray];"));
    assert!(dot.contains("\"D\" [shape=doublecircle];"));
}
