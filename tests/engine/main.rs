//! Integration tests for Layer 2: Engine
//!
//! Tests for causal graphs, d-separation, queries, and counterfactuals.

mod counterfactuals;
mod graphs;
mod queries;
mod separation;

use causetable_engine::Dag;
use causetable_storage::Dataset;

/// The eight-row `a`, `b`, `c` fixture with `a -> b`, `a -> c`, `c -> b`.
pub fn triangle() -> Dag {
    let data = Dataset::from_columns([
        ("a", vec![1, 1, 1, 1, 0, 0, 0, 0]),
        ("b", vec![0, 1, 0, 1, 1, 1, 1, 0]),
        ("c", vec![0, 0, 1, 0, 0, 1, 0, 1]),
    ])
    .unwrap();
    Dag::new(data)
        .add_edges([("a", "b"), ("a", "c"), ("c", "b")])
        .unwrap()
}

/// A graph with no edges over `width` binary columns named `v0`, `v1`, ...
pub fn unconnected(width: usize) -> Dag {
    let names: Vec<String> = (0..width).map(|i| format!("v{i}")).collect();
    let columns = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), (0..8).map(move |r| ((r >> (i % 3)) & 1) as i64)));
    Dag::new(Dataset::from_columns(columns).unwrap())
}
