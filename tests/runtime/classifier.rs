//! Integration tests for the graph classifier

use causetable_engine::Dag;
use causetable_foundation::Value;
use causetable_runtime::DagClassifier;
use causetable_runtime::datasets::simple_study_dataset;

fn model() -> DagClassifier {
    let data = simple_study_dataset().unwrap();
    let dag = Dag::new(data.clone())
        .add_edges([("study", "grade"), ("hard", "grade")])
        .unwrap();
    DagClassifier::new(dag, "grade").unwrap().fit(&data).unwrap()
}

#[test]
fn predict_is_argmax_of_proba() {
    let model = model();
    let rows = simple_study_dataset().unwrap();
    let proba = model.predict_proba(&rows).unwrap();
    let labels = model.predict(&rows).unwrap();
    assert_eq!(proba.len(), 600);
    for (dist, label) in proba.iter().zip(&labels) {
        let best = dist.values().copied().fold(f64::MIN, f64::max);
        assert!((dist[label] - best).abs() < 1e-12);
        assert!((dist.values().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn target_column_is_ignored_as_evidence() {
    let model = model();
    let rows = simple_study_dataset().unwrap();
    let labels = model.predict(&rows).unwrap();
    // Every "lots of study, easy exam" student is predicted a good grade,
    // whatever grade they actually got.
    for (row, label) in rows.rows().zip(&labels) {
        if row[0] == Value::from("lots") && row[1] == Value::from("no") {
            assert_eq!(*label, Value::from("good"));
        }
    }
}
