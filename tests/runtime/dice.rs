//! Integration tests for dice arithmetic and discretization

use causetable_engine::{Dag, Query};
use causetable_foundation::Value;
use causetable_runtime::Dice;
use causetable_runtime::datasets::quantize;
use causetable_storage::Dataset;

#[test]
fn two_dice_as_a_query() {
    // Throw two fair dice and compare the exact distribution of their sum
    // with one inferred from a graph over every equally likely outcome.
    let d6 = Dice::make_simple_dice(6).unwrap();
    let total = &d6 + &d6;

    let rows = (1..=6i64).flat_map(|a| {
        (1..=6i64).map(move |b| vec![Value::Int(a), Value::Int(b), Value::Int(a + b)])
    });
    let data = Dataset::from_rows(["first", "second", "total"], rows).unwrap();
    let dag = Dag::new(data)
        .add_edges([("first", "total"), ("second", "total")])
        .unwrap();
    let out = Query::new(dag).infer().unwrap();
    for (eyes, p) in total.iter() {
        assert!((out.prob("total", eyes).unwrap() - p).abs() < 1e-9);
    }
}

#[test]
fn dice_tables_join_with_other_tables() {
    let coin = Dice::from_string("01").unwrap().to_table("coin").unwrap();
    let die = Dice::make_simple_dice(3).unwrap().to_table("die").unwrap();
    let joint = coin.join(&die).unwrap();
    assert_eq!(joint.len(), 6);
    assert!((joint.total() - 1.0).abs() < 1e-12);
}

#[test]
fn quantized_columns_become_categories() {
    let data = Dataset::from_columns([("score", vec![0.1, 0.4, 0.6, 0.9])]).unwrap();
    let binned = quantize(&data, "score", 2).unwrap();
    let labels: Vec<Value> = binned.column("score").unwrap().cloned().collect();
    assert_eq!(labels, vec![Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(2)]);
}
