//! Integration tests for Value

use causetable_foundation::Value;

#[test]
fn tokens_parse_to_most_specific_variant() {
    assert_eq!(Value::parse_token("true"), Value::Bool(true));
    assert_eq!(Value::parse_token("false"), Value::Bool(false));
    assert_eq!(Value::parse_token("-12"), Value::Int(-12));
    assert_eq!(Value::parse_token("yes"), Value::from("yes"));
    assert_eq!(Value::parse_token("1.5"), Value::Float(1.5));
    assert_eq!(Value::parse_token("-2e3"), Value::Float(-2000.0));
    assert_eq!(Value::parse_token("1.5kg"), Value::from("1.5kg"));
    assert_eq!(Value::parse_token("infinity"), Value::from("infinity"));
}

#[test]
fn numeric_categories_stay_distinct() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert_eq!(Value::Float(0.5), Value::from(0.5));
    assert_eq!(Value::Float(3.0).to_string(), "3.0");
    assert_eq!(Value::parse_token(&Value::Float(3.0).to_string()), Value::Float(3.0));
    assert_eq!(Value::Int(3).as_number(), Some(3.0));
    assert!(Value::Float(0.5).is_numeric());
    assert!(!Value::from("0.5").is_numeric());
}

#[test]
fn variants_order_bool_int_float_str() {
    let mut values = vec![
        Value::from("a"),
        Value::Float(-4.5),
        Value::Int(3),
        Value::Bool(true),
        Value::Int(-1),
    ];
    values.sort();
    assert_eq!(
        values,
        vec![
            Value::Bool(true),
            Value::Int(-1),
            Value::Int(3),
            Value::Float(-4.5),
            Value::from("a")
        ]
    );
}

#[test]
fn display_is_bare() {
    assert_eq!(Value::from("good").to_string(), "good");
    assert_eq!(Value::Int(7).to_string(), "7");
    assert_eq!(Value::Bool(false).to_string(), "false");
}

#[test]
fn accessors() {
    assert_eq!(Value::Int(4).as_int(), Some(4));
    assert_eq!(Value::Int(4).as_str(), None);
    assert_eq!(Value::from("x").as_str(), Some("x"));
    assert_eq!(Value::Bool(true).as_bool(), Some(true));
}

#[test]
fn conversions() {
    assert_eq!(Value::from(3i32), Value::Int(3));
    assert_eq!(Value::from(3u8), Value::Int(3));
    assert_eq!(Value::from(String::from("s")), Value::from("s"));
    let v = Value::from("v");
    assert_eq!(Value::from(&v), v);
}
