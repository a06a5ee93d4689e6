//! Property (baked value) tests

use understudy::{Fallback, Stub, StubError, assert_scripts_completed, get, json, property};

use crate::common::read_value;

#[test]
fn property_survives_repeated_reads() {
    let stub = Stub::new([("name", property("ada")), ("age", get(36))]).unwrap();
    assert_eq!(read_value(&stub, "name"), json!("ada"));
    assert_eq!(read_value(&stub, "age"), json!(36));
    for _ in 0..3 {
        assert_eq!(read_value(&stub, "name"), json!("ada"));
    }
    assert_scripts_completed(&stub);
}

#[test]
fn property_overrides_fallback_value() {
    let stub = Stub::with_fallback(
        Fallback::new().with_value("theme", "light"),
        [("theme", property("dark"))],
    )
    .unwrap();
    assert_eq!(read_value(&stub, "theme"), json!("dark"));
    assert_eq!(read_value(&stub, "theme"), json!("dark"));
}

#[test]
fn baked_property_is_writable() {
    let stub = Stub::new([("count", property(1))]).unwrap();
    stub.get("count").unwrap();
    stub.assign("count", json!(2)).unwrap();
    assert_eq!(stub.read::<u32>("count").unwrap(), 2);
}

#[test]
fn unread_property_is_not_writable() {
    let stub = Stub::new([("count", property(1))]).unwrap();
    assert!(matches!(
        stub.set("count", json!(2)).unwrap_err(),
        StubError::UnexpectedScriptType { .. }
    ));
}
