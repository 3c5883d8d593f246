//! Integration tests for counterfactual queries

use causetable_engine::{Query, SupposeQuery};
use causetable_foundation::{ErrorCategory, Value};

use crate::triangle;

#[test]
fn seen_then_supposed() {
    let seen = Query::new(triangle()).given([("a", 0)]).unwrap();
    let out = SupposeQuery::new(triangle())
        .when(seen)
        .unwrap()
        .suppose_intervene([("a", 1)])
        .unwrap()
        .infer()
        .unwrap();
    assert!((out.prob("b", &Value::Int(1)).unwrap() - 0.8).abs() < 1e-9);
    assert!((out.prob("c", &Value::Int(0)).unwrap() - 0.8).abs() < 1e-9);
}

#[test]
fn table_is_normalized() {
    let seen = Query::new(triangle()).given([("b", 1)]).unwrap();
    let table = SupposeQuery::new(triangle())
        .when(seen)
        .unwrap()
        .suppose_given([("c", 0)])
        .unwrap()
        .infer_table()
        .unwrap();
    assert!((table.total() - 1.0).abs() < 1e-9);
}

#[test]
fn state_errors() {
    assert_eq!(
        SupposeQuery::new(triangle()).infer().unwrap_err().category(),
        ErrorCategory::State
    );
    let seen = Query::new(triangle());
    let twice = SupposeQuery::new(triangle())
        .when(seen.clone())
        .unwrap()
        .when(seen)
        .unwrap_err();
    assert_eq!(twice.category(), ErrorCategory::State);
}

#[test]
fn suppose_keys_are_disjoint() {
    let err = SupposeQuery::new(triangle())
        .suppose_given([("c", 1)])
        .unwrap()
        .suppose_intervene([("c", 0)])
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::DuplicateKey);
}
