//! Integration tests for path enumeration and d-separation

use causetable_engine::{DirectedPath, NodeRole};
use causetable_foundation::ErrorCategory;

use crate::unconnected;

const NONE: [&str; 0] = [];

#[test]
fn chain_path_counts() {
    let chain = unconnected(5)
        .add_edges([("v0", "v1"), ("v1", "v2"), ("v2", "v3"), ("v3", "v4")])
        .unwrap();
    assert_eq!(chain.undirected_paths("v0", "v4").unwrap().len(), 1);

    let shortcut = chain.add_edges([("v0", "v4"), ("v1", "v4")]).unwrap();
    assert_eq!(shortcut.undirected_paths("v0", "v4").unwrap().len(), 3);
}

#[test]
fn directed_paths_carry_arrows() {
    let dag = unconnected(3).add_edges([("v0", "v1"), ("v2", "v1")]).unwrap();
    let paths = dag.directed_paths("v0", "v2").unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].to_string(), "v0 -> v1 <- v2");
}

#[test]
fn collider_blocks_until_conditioned() {
    let dag = unconnected(3).add_edges([("v0", "v2"), ("v1", "v2")]).unwrap();
    assert!(dag.active_paths("v0", "v1", &NONE).unwrap().is_empty());
    assert!(dag.is_independent("v0", "v1", &NONE).unwrap());
    assert_eq!(dag.active_paths("v0", "v1", &["v2"]).unwrap().len(), 1);
}

#[test]
fn chain_and_fork_block_when_conditioned() {
    let chain: DirectedPath = "a -> b -> c".parse().unwrap();
    assert!(!chain.is_blocked(&NONE).unwrap());
    assert_eq!(chain.blocking_node(&["b"]).unwrap(), Some(("b", NodeRole::Chain)));

    let fork: DirectedPath = "a <- b -> c".parse().unwrap();
    assert_eq!(fork.blocking_node(&["b"]).unwrap(), Some(("b", NodeRole::Fork)));
}

#[test]
fn collider_descendants_are_not_consulted() {
    // v0 -> v2 <- v1, v2 -> v3: conditioning on v3 alone keeps the path blocked.
    let dag = unconnected(4)
        .add_edges([("v0", "v2"), ("v1", "v2"), ("v2", "v3")])
        .unwrap();
    assert!(dag.is_independent("v0", "v1", &["v3"]).unwrap());
}

#[test]
fn malformed_paths_are_invalid() {
    let broken: DirectedPath = "a -> b c -> d".parse().unwrap();
    let err = broken.is_blocked(&NONE).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::InvalidPath);
}

#[test]
fn unconnected_pairs_are_reported() {
    let dag = unconnected(3);
    let err = dag.edge_direction("v0", "v1").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Domain);
}
