//! Integration tests for observational and interventional queries

use causetable_engine::{InferenceConfig, Query};
use causetable_foundation::{ErrorCategory, Value};

use crate::triangle;

fn v(n: i64) -> Value {
    Value::Int(n)
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

#[test]
fn observation_updates_children() {
    let low = Query::new(triangle()).given([("a", 0)]).unwrap().infer().unwrap();
    assert!(close(low.prob("b", &v(0)), 0.25));
    assert!(close(low.prob("b", &v(1)), 0.75));

    let high = Query::new(triangle()).given([("a", 1)]).unwrap().infer().unwrap();
    assert!(close(high.prob("b", &v(0)), 0.5));
    assert!(close(high.prob("b", &v(1)), 0.5));
}

#[test]
fn intervention_leaves_causes_alone() {
    let out = Query::new(triangle()).intervene([("b", 1)]).unwrap().infer().unwrap();
    assert!(close(out.prob("b", &v(1)), 1.0));
    assert!(close(out.prob("a", &v(0)), 0.5));
    assert!(close(out.prob("a", &v(1)), 0.5));
}

#[test]
fn intervention_does_not_touch_base_graph() {
    let dag = triangle();
    let query = Query::new(dag.clone()).intervene([("b", 1)]).unwrap();
    let cut = query.inference_dag().unwrap();
    assert!(cut.parents("b").unwrap().is_empty());
    assert_eq!(dag.parents("b").unwrap().len(), 2);
}

#[test]
fn chained_and_combined_givens_agree() {
    let chained = Query::new(triangle())
        .given([("a", 1)])
        .unwrap()
        .given([("c", 0)])
        .unwrap()
        .infer_table()
        .unwrap();
    let combined = Query::new(triangle())
        .given([("a", 1), ("c", 0)])
        .unwrap()
        .infer_table()
        .unwrap();
    assert!(chained.approx_eq(&combined, 1e-12));
    assert!((combined.total() - 1.0).abs() < 1e-6);
}

#[test]
fn keys_are_validated() {
    let query = Query::new(triangle()).given([("a", 1)]).unwrap();
    assert_eq!(query.given([("z", 1)]).unwrap_err().category(), ErrorCategory::Domain);
    assert_eq!(query.given([("b", 9)]).unwrap_err().category(), ErrorCategory::Domain);
    assert_eq!(
        query.intervene([("a", 0)]).unwrap_err().category(),
        ErrorCategory::DuplicateKey
    );
    assert_eq!(
        Query::new(triangle())
            .given([("b", 0), ("b", 1)])
            .unwrap_err()
            .category(),
        ErrorCategory::DuplicateKey
    );
}

#[test]
fn unsupported_evidence_is_zero_support() {
    let err = Query::new(triangle())
        .given([("a", 1), ("c", 1), ("b", 1)])
        .unwrap()
        .infer()
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ZeroSupport);
}

#[test]
fn samples_respect_evidence() {
    let sample = Query::new(triangle())
        .given([("a", 1)])
        .unwrap()
        .sample(200)
        .unwrap();
    assert_eq!(sample.len(), 200);
    let total: i64 = sample.column("a").unwrap().filter_map(Value::as_int).sum();
    assert_eq!(total, 200);
}

#[test]
fn sampling_is_seeded() {
    let query = Query::new(triangle()).with_config(InferenceConfig::default().with_seed(7));
    assert_eq!(query.sample(50).unwrap(), query.sample(50).unwrap());
    assert_eq!(query.config().seed, 7);
    let inherited = query.given([("a", 0)]).unwrap();
    assert_eq!(inherited.config().seed, 7);
}

#[test]
fn most_likely_value() {
    let out = Query::new(triangle()).given([("a", 0)]).unwrap().infer().unwrap();
    assert_eq!(out.most_likely("b"), Some(&v(1)));
    assert_eq!(out.len(), 3);
}
