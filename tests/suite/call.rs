//! Scripted call tests

use insta::assert_snapshot;
use understudy::{
    Fallback, Schema, ScriptKind, ScriptRef, Stub, StubError, Value, assert_scripts_completed,
    call, call_returning, call_with, json,
};

use crate::common::{init_tracing, read_method, retaining};

#[test]
fn void_then_returning_call() {
    init_tracing();
    let stub = Stub::new([
        ("foo", call(vec![])),
        ("bar", call_returning(vec![Schema::literal(123)], true)),
    ])
    .unwrap();

    assert_eq!(stub.invoke("foo", &[]).unwrap(), Value::Null);
    assert_eq!(stub.invoke("bar", &[json!(123)]).unwrap(), json!(true));
    assert_scripts_completed(&stub);

    let err = stub.invoke("bar", &[json!(123)]).unwrap_err();
    assert!(matches!(err, StubError::NoPendingScripts { .. }));
    assert_eq!(err.to_string(), "Unexpected script call bar, no pending scripts");
}

#[test]
fn reversed_invocation_names_expected_entry() {
    init_tracing();
    let stub = Stub::new([("first", call(vec![])), ("second", call(vec![]))]).unwrap();
    let first = read_method(&stub, "first");
    let second = read_method(&stub, "second");

    match second.invoke(&[]).unwrap_err() {
        StubError::OutOfOrder { invoked, expected } => {
            assert_eq!(invoked, ScriptRef::new(ScriptKind::Call, "second"));
            assert_eq!(expected, ScriptRef::new(ScriptKind::Call, "first"));
        }
        other => panic!("expected OutOfOrder, got {other}"),
    }
    // The rejected invocation does not disturb the pending queue.
    first.invoke(&[]).unwrap();
    second.invoke(&[]).unwrap();
    assert_scripts_completed(&stub);
}

#[test]
fn same_key_scripted_twice_is_read_one_entry_at_a_time() {
    let stub = Stub::new([
        ("next", call_returning(vec![], 1)),
        ("next", call_returning(vec![], 2)),
    ])
    .unwrap();
    let a = read_method(&stub, "next");
    let b = read_method(&stub, "next");
    assert!(a.ptr_eq(&b));
    assert_eq!(b.invoke(&[]).unwrap(), json!(1));
    assert_eq!(stub.invoke("next", &[]).unwrap(), json!(2));
    assert_scripts_completed(&stub);
}

#[test]
fn bad_argument_reports_its_index() {
    init_tracing();
    let stub = Stub::new([(
        "bar",
        call_returning(vec![Schema::string(), Schema::literal(123)], true),
    )])
    .unwrap();
    let err = stub.invoke("bar", &[json!("ok"), json!(456)]).unwrap_err();
    let constraint = err.constraint().expect("constraint error");
    assert_eq!(constraint.issues.len(), 1);
    assert_eq!(constraint.issues[0].path.to_string(), "1");
    assert_snapshot!(err.to_string(), @r"
    Unexpected parameters:
      [1] Expecting 123, got 456.
    ");
}

#[test]
fn every_bad_argument_is_listed() {
    let stub = Stub::new([(
        "move_to",
        call(vec![
            Schema::integer(),
            Schema::integer(),
            Schema::shape(json!({"smooth": true})),
        ]),
    )])
    .unwrap();
    let err = stub
        .invoke("move_to", &[json!(1.5), json!("2"), json!({"smooth": false})])
        .unwrap_err();
    assert_snapshot!(err.to_string(), @r"
    Unexpected parameters:
      [0] Expected integer, getting number.
      [1] Expected integer, getting string.
      [2.smooth] Expecting true, got false.
    ");
}

#[test]
fn missing_arguments_are_null() {
    let stub = Stub::new([("f", call(vec![Schema::Any, Schema::null()]))]).unwrap();
    stub.invoke("f", &[json!("only one")]).unwrap();
    assert_scripts_completed(&stub);
}

#[test]
fn implementation_sees_arguments() {
    let stub = Stub::new([(
        "sum",
        call_with(vec![Schema::number(), Schema::number()], |args: &[Value]| {
            args.iter().filter_map(Value::as_f64).sum::<f64>()
        }),
    )])
    .unwrap();
    assert_eq!(stub.call::<f64>("sum", &[json!(1.5), json!(2)]).unwrap(), 3.5);
}

#[test]
fn corrected_retry_matches_when_retained() {
    let stub = Stub::with_config(
        Fallback::new(),
        [("save", call_returning(vec![Schema::string()], "saved"))],
        retaining(),
    )
    .unwrap();
    let save = read_method(&stub, "save");
    assert!(save.invoke(&[json!(42)]).unwrap_err().is_constraint());
    assert!(!stub.is_complete());
    assert_eq!(save.invoke(&[json!("doc")]).unwrap(), json!("saved"));
    assert_scripts_completed(&stub);
}

#[test]
fn fallback_methods_are_unscripted() {
    let stub = Stub::with_fallback(
        Fallback::new().with_method("now", |_: &[Value]| 1_700_000_000),
        [("tick", call(vec![]))],
    )
    .unwrap();
    assert_eq!(stub.invoke("now", &[]).unwrap(), json!(1_700_000_000));
    stub.invoke("tick", &[]).unwrap();
    assert_eq!(stub.invoke("now", &[]).unwrap(), json!(1_700_000_000));
    assert_scripts_completed(&stub);
}
