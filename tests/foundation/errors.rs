//! Integration tests for Error types
//!
//! Tests error construction, display, categories, and context frames.

use causetable_foundation::{Error, ErrorCategory, ErrorKind, Value};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_unknown_variable() {
    let err = Error::unknown_variable("foobar");
    assert!(matches!(err.kind, ErrorKind::UnknownVariable(_)));
    assert!(err.to_string().contains("foobar"));
    assert_eq!(err.category(), ErrorCategory::Domain);
}

#[test]
fn error_unknown_value() {
    let err = Error::unknown_value("a", Value::Int(1000));
    assert!(err.to_string().contains("1000"));
    assert_eq!(err.category(), ErrorCategory::Domain);
}

#[test]
fn error_cycle() {
    let err = Error::cycle("c", "a");
    assert!(matches!(err.kind, ErrorKind::Cycle { .. }));
    assert_eq!(err.to_string(), "edge c -> a would create a cycle");
    assert_eq!(err.category(), ErrorCategory::Cycle);
}

#[test]
fn error_categories() {
    assert_eq!(Error::not_connected("a", "b").category(), ErrorCategory::Domain);
    assert_eq!(Error::shape("ragged").category(), ErrorCategory::Domain);
    assert_eq!(Error::duplicate_key("a").category(), ErrorCategory::DuplicateKey);
    assert_eq!(Error::state("baked").category(), ErrorCategory::State);
    assert_eq!(Error::invalid_path("a", "b").category(), ErrorCategory::InvalidPath);
    assert_eq!(Error::parse("bad", 3).category(), ErrorCategory::Parse);
    assert_eq!(Error::new(ErrorKind::ZeroSupport).category(), ErrorCategory::ZeroSupport);
    assert_eq!(
        Error::new(ErrorKind::Io("disk".into())).category(),
        ErrorCategory::Serialization
    );
    assert_eq!(
        Error::new(ErrorKind::Internal("oops".into())).category(),
        ErrorCategory::Internal
    );
}

#[test]
fn parse_error_reports_line() {
    let err = Error::parse("unexpected token", 12);
    assert_eq!(err.to_string(), "parse error at line 12: unexpected token");
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn frames_accumulate() {
    let err = Error::state("no base")
        .with_frame("when query")
        .with_frame("repl");
    let context = err.context.unwrap();
    assert_eq!(context.stack, vec!["when query", "repl"]);
}
