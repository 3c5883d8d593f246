//! Integration tests for ProbabilityTable

use causetable_foundation::{ErrorCategory, Value};
use causetable_storage::ProbabilityTable;

fn v(n: i64) -> Value {
    Value::Int(n)
}

fn coin() -> ProbabilityTable {
    ProbabilityTable::from_rows(["coin"], vec![(vec![v(0)], 0.5), (vec![v(1)], 0.5)]).unwrap()
}

fn lamp_given_coin() -> ProbabilityTable {
    ProbabilityTable::from_rows(
        ["coin", "lamp"],
        vec![
            (vec![v(0), v(0)], 0.9),
            (vec![v(0), v(1)], 0.1),
            (vec![v(1), v(0)], 0.2),
            (vec![v(1), v(1)], 0.8),
        ],
    )
    .unwrap()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn duplicate_rows_merge() {
    let table =
        ProbabilityTable::from_rows(["x"], vec![(vec![v(1)], 0.25), (vec![v(1)], 0.25)]).unwrap();
    assert_eq!(table.len(), 1);
    assert!((table.total() - 0.5).abs() < 1e-12);
}

#[test]
fn invalid_tables_rejected() {
    let reserved = ProbabilityTable::from_rows(["prob"], vec![(vec![v(0)], 1.0)]);
    assert_eq!(reserved.unwrap_err().category(), ErrorCategory::Domain);

    let negative = ProbabilityTable::from_rows(["x"], vec![(vec![v(0)], -0.1)]);
    assert_eq!(negative.unwrap_err().category(), ErrorCategory::Domain);

    let wide = ProbabilityTable::from_rows(["x"], vec![(vec![v(0), v(1)], 0.1)]);
    assert_eq!(wide.unwrap_err().category(), ErrorCategory::Domain);
}

#[test]
fn unit_is_join_identity() {
    let joined = ProbabilityTable::unit().join(&coin()).unwrap();
    assert!(joined.approx_eq(&coin(), 1e-12));
}

// =============================================================================
// Operations
// =============================================================================

#[test]
fn join_on_shared_column_then_marginalize() {
    let joint = coin().join(&lamp_given_coin()).unwrap();
    assert_eq!(joint.len(), 4);
    assert!((joint.total() - 1.0).abs() < 1e-12);

    let lamp = joint.distribution("lamp").unwrap();
    assert!((lamp[&v(1)] - 0.45).abs() < 1e-12);
}

#[test]
fn outer_product_without_shared_columns() {
    let other = ProbabilityTable::from_rows(["die"], vec![(vec![v(1)], 0.5), (vec![v(2)], 0.5)])
        .unwrap();
    let joint = coin().join(&other).unwrap();
    assert_eq!(joint.len(), 4);
    let names: Vec<&str> = joint.column_names().collect();
    assert_eq!(names, vec!["coin", "die"]);
}

#[test]
fn filter_then_normalize_is_conditioning() {
    let joint = coin().join(&lamp_given_coin()).unwrap();
    let posterior = joint.filter_eq("lamp", &v(1)).unwrap().normalized().unwrap();
    let coin = posterior.distribution("coin").unwrap();
    assert!((coin[&v(1)] - 0.8 / 0.9).abs() < 1e-12);
}

#[test]
fn empty_mass_is_zero_support() {
    let none = coin().filter_eq("coin", &v(7)).unwrap();
    assert!(none.is_empty());
    assert_eq!(none.normalized().unwrap_err().category(), ErrorCategory::ZeroSupport);

    let tiny = ProbabilityTable::from_rows(["x"], vec![(vec![v(0)], 1e-15)]).unwrap();
    assert!(tiny.normalized().is_ok());
    assert_eq!(
        tiny.normalized_above(1e-12).unwrap_err().category(),
        ErrorCategory::ZeroSupport
    );
}

#[test]
fn project_sums_out_columns() {
    let joint = coin().join(&lamp_given_coin()).unwrap();
    let lamp = joint.project(&["lamp"]).unwrap();
    assert_eq!(lamp.len(), 2);
    assert!((lamp.prob_where(&[("lamp", v(0))]).unwrap() - 0.55).abs() < 1e-12);
}

#[test]
fn expand_repeats_rows_per_value() {
    let values = [v(0), v(1), v(2)];
    let expanded = coin().expand("extra", &values).unwrap();
    assert_eq!(expanded.len(), 6);
    assert!((expanded.total() - 3.0).abs() < 1e-12);
    assert_eq!(
        coin().expand("coin", &values).unwrap_err().category(),
        ErrorCategory::Domain
    );
}

#[test]
fn approx_eq_ignores_column_order() {
    let a = lamp_given_coin();
    let b = a.project(&["lamp", "coin"]).unwrap();
    assert!(a.approx_eq(&b, 1e-12));
    assert!(!a.approx_eq(&coin(), 1e-12));
}

#[test]
fn display_has_header_and_rows() {
    let text = coin().to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "coin\tprob");
    assert_eq!(lines[1], "0\t0.500000");
    assert_eq!(lines.len(), 3);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn marginalizing_keeps_mass(weights in prop::collection::vec(0.01f64..10.0, 6)) {
            let rows = weights
                .iter()
                .enumerate()
                .map(|(i, w)| (vec![v(i as i64 / 3), v(i as i64 % 3)], *w));
            let table = ProbabilityTable::from_rows(["x", "y"], rows).unwrap().normalized().unwrap();
            prop_assert!((table.total() - 1.0).abs() < 1e-9);
            for column in ["x", "y"] {
                let marginal = table.project(&[column]).unwrap();
                prop_assert!((marginal.total() - 1.0).abs() < 1e-9);
            }
            let joined = table.join(&coin().filter_eq("coin", &v(0)).unwrap()).unwrap();
            prop_assert!((joined.total() - 0.5).abs() < 1e-9);
        }
    }
}
