//! Integration tests for model snapshots

use causetable_engine::{Dag, Query};
use causetable_foundation::{ErrorCategory, Value};
use causetable_runtime::datasets::{FakeDatasetConfig, make_fake_dataset};
use causetable_runtime::serialize::{ModelSnapshot, from_bytes, load_from_file, save_to_file, to_bytes};

fn model() -> Dag {
    let data = make_fake_dataset(&FakeDatasetConfig::default().with_nodes(4).with_rows(200))
        .unwrap();
    Dag::new(data)
        .add_edges([("a", "b"), ("b", "c"), ("a", "d")])
        .unwrap()
}

#[test]
fn snapshot_preserves_inference() {
    let dag = model();
    let bytes = to_bytes(&ModelSnapshot::from_dag(&dag)).unwrap();
    let restored = from_bytes(&bytes).unwrap().to_dag().unwrap();

    let before = Query::new(dag).given([("c", 1)]).unwrap().infer_table().unwrap();
    let after = Query::new(restored).given([("c", 1)]).unwrap().infer_table().unwrap();
    assert!(before.approx_eq(&after, 1e-12));
}

#[test]
fn snapshot_files() {
    let path = std::env::temp_dir().join(format!("causetable_it_{}.model", std::process::id()));
    let snapshot = ModelSnapshot::from_dag(&model());
    save_to_file(&snapshot, &path).unwrap();
    let loaded = load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded.edges.len(), 3);
    assert_eq!(loaded.dataset.len(), 200);
    assert_eq!(
        loaded.dataset.row(0).map(<[Value]>::to_vec),
        snapshot.dataset.row(0).map(<[Value]>::to_vec)
    );
}

#[test]
fn truncated_bytes_fail() {
    let bytes = to_bytes(&ModelSnapshot::from_dag(&model())).unwrap();
    let err = from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Serialization);
}
