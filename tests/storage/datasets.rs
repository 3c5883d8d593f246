//! Integration tests for Dataset

use causetable_foundation::{ErrorCategory, Value};
use causetable_storage::Dataset;

fn weather() -> Dataset {
    Dataset::from_columns([
        ("rain", vec!["yes", "yes", "no", "no", "no"]),
        ("wet", vec!["yes", "yes", "no", "yes", "no"]),
    ])
    .unwrap()
}

#[test]
fn columns_and_rows_agree() {
    let data = weather();
    assert_eq!(data.len(), 5);
    assert_eq!(data.width(), 2);
    assert_eq!(data.row(3), Some(&[Value::from("no"), Value::from("yes")][..]));
    assert_eq!(data.row(5), None);

    let by_rows = Dataset::from_rows(["rain", "wet"], data.rows().map(<[Value]>::to_vec)).unwrap();
    assert_eq!(by_rows, data);
}

#[test]
fn counts_group_by_columns() {
    let counts = weather().count_by(&["rain", "wet"]).unwrap();
    assert_eq!(counts[&vec![Value::from("no"), Value::from("no")]], 2);
    assert_eq!(counts[&vec![Value::from("yes"), Value::from("yes")]], 2);
    assert_eq!(counts.values().sum::<usize>(), 5);
}

#[test]
fn values_for_is_sorted_domain() {
    let domain = weather().values_for("rain").unwrap();
    let domain: Vec<_> = domain.into_iter().collect();
    assert_eq!(domain, vec![Value::from("no"), Value::from("yes")]);
}

#[test]
fn select_keeps_requested_order() {
    let selected = weather().select(&["wet"]).unwrap();
    let names: Vec<&str> = selected.column_names().collect();
    assert_eq!(names, vec!["wet"]);
    assert_eq!(selected.len(), 5);
}

#[test]
fn malformed_input_is_rejected() {
    let ragged = Dataset::from_columns([("a", vec![1, 2]), ("b", vec![1])]);
    assert_eq!(ragged.unwrap_err().category(), ErrorCategory::Domain);

    let repeated = Dataset::from_columns([("a", vec![1]), ("a", vec![2])]);
    assert_eq!(repeated.unwrap_err().category(), ErrorCategory::Domain);

    let unknown = weather().column_index("snow");
    assert_eq!(unknown.unwrap_err().category(), ErrorCategory::Domain);
}
