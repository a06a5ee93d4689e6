//! Config file tests

use std::fs;

use understudy::{
    ConfigError, Fallback, Schema, Stub, StubConfig, ValidationFailurePolicy,
    assert_scripts_completed, json, set,
};

#[test]
fn loaded_policy_drives_the_stub() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("understudy.toml");
    fs::write(&path, "on_validation_failure = \"retain\"\n").unwrap();

    let config = StubConfig::load(&path).unwrap();
    assert_eq!(config.on_validation_failure, ValidationFailurePolicy::Retain);
    assert!(!config.verify_on_drop);

    let stub = Stub::builder()
        .fallback(Fallback::new())
        .script("level", set(Schema::integer()))
        .config(config)
        .build()
        .unwrap();
    assert!(stub.set("level", json!("high")).unwrap_err().is_constraint());
    assert!(stub.set("level", json!(3)).unwrap());
    assert_scripts_completed(&stub);
}

#[test]
fn parse_error_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "verify_on_drop = \"sometimes\"\n").unwrap();

    let err = StubConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), path.as_path());
}

#[test]
#[should_panic(expected = "Stub still has pending scripts: set level")]
fn verify_on_drop_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("understudy.toml");
    fs::write(&path, "verify_on_drop = true\n").unwrap();

    let config = StubConfig::load(&path).unwrap();
    let _stub = Stub::with_config(Fallback::new(), [("level", set(Schema::Any))], config).unwrap();
}
