//! Scripted read and write tests

use std::cell::RefCell;
use std::rc::Rc;

use insta::assert_snapshot;
use understudy::{
    Access, Fallback, Schema, ScriptKind, Stub, StubError, Value, assert_scripts_completed, get,
    get_with, json, set, set_accepting, set_with,
};

use crate::common::{init_tracing, read_value, retaining};

#[test]
fn get_then_set_leaves_fallback_untouched() {
    init_tracing();
    let stub = Stub::with_fallback(
        Fallback::new().with_value("foo", "def"),
        [("foo", get("")), ("foo", set(Schema::literal("abc")))],
    )
    .unwrap();

    assert_eq!(read_value(&stub, "foo"), json!(""));
    assert!(stub.set("foo", json!("abc")).unwrap());
    assert_eq!(read_value(&stub, "foo"), json!("def"));
    assert_scripts_completed(&stub);
}

#[test]
fn producer_runs_on_read() {
    let reads = Rc::new(RefCell::new(0_u32));
    let counter = Rc::clone(&reads);
    let stub = Stub::new([(
        "clock",
        get_with(move || {
            *counter.borrow_mut() += 1;
            "12:00"
        }),
    )])
    .unwrap();
    assert_eq!(*reads.borrow(), 0);
    assert_eq!(stub.read::<String>("clock").unwrap(), "12:00");
    assert_eq!(*reads.borrow(), 1);
}

#[test]
fn bad_value_is_a_multiline_error() {
    init_tracing();
    let stub = Stub::new([(
        "user",
        set(json!({"id": 1, "tags": ["a", "b"]})),
    )])
    .unwrap();
    let err = stub
        .set("user", json!({"id": 2, "tags": ["a", "c"], "extra": true}))
        .unwrap_err();
    assert_snapshot!(err.to_string(), @r#"
    Unexpected value:
      [id] Expecting 1, got 2.
      [tags.1] Expecting "b", got "c".
    "#);
}

#[test]
fn root_issue_has_no_path_prefix() {
    let stub = Stub::new([("count", set(Schema::number()))]).unwrap();
    let err = stub.set("count", json!("three")).unwrap_err();
    assert_snapshot!(err.to_string(), @r"
    Unexpected value:
      Expected number, getting string.
    ");
}

#[test]
fn failed_write_is_retried_when_retained() {
    let stub = Stub::with_config(
        Fallback::new(),
        [("mode", set(Schema::literal("dark")))],
        retaining(),
    )
    .unwrap();
    assert!(stub.set("mode", json!("light")).unwrap_err().is_constraint());
    assert!(stub.set("mode", json!("dark")).unwrap());
    assert_scripts_completed(&stub);
}

#[test]
fn handler_receives_value_and_decides() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let stub = Stub::new([
        (
            "volume",
            set_with(Schema::integer(), move |value: &Value| {
                log.borrow_mut().push(value.clone());
                value.as_i64().is_some_and(|v| v <= 10)
            }),
        ),
        ("volume", set_with(Schema::Any, |_: &Value| {})),
        ("volume", set_accepting(Schema::Any, false)),
    ])
    .unwrap();

    assert!(!stub.set("volume", json!(11)).unwrap());
    assert!(stub.set("volume", json!(5)).unwrap());
    assert!(matches!(
        stub.assign("volume", json!(3)).unwrap_err(),
        StubError::WriteRejected { .. }
    ));
    assert_eq!(*seen.borrow(), vec![json!(11)]);
    assert_scripts_completed(&stub);
}

#[test]
fn unexpected_key_on_read_and_write() {
    let stub = Stub::new([("known", get(1))]).unwrap();
    for err in [
        stub.get("unknown").unwrap_err(),
        stub.set("unknown", json!(1)).unwrap_err(),
    ] {
        assert_eq!(err.to_string(), r#"Unexpected key "unknown""#);
    }
    assert!(!stub.is_complete());
}

#[test]
fn access_mismatch_keeps_the_head() {
    let stub = Stub::new([("a", set(json!(1))), ("b", get(2))]).unwrap();
    match stub.get("a").unwrap_err() {
        StubError::UnexpectedScriptType { kind, key, access } => {
            assert_eq!(kind, ScriptKind::Set);
            assert_eq!(key, "a");
            assert_eq!(access, Access::Read);
        }
        other => panic!("expected UnexpectedScriptType, got {other}"),
    }
    stub.assign("a", json!(1)).unwrap();
    assert_eq!(read_value(&stub, "b"), json!(2));
    assert_scripts_completed(&stub);
}
