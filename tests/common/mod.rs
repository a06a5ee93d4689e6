//! Shared test utilities and fixtures

#![allow(dead_code)]

use tracing_subscriber::EnvFilter;
use understudy::{Member, Method, Stub, StubConfig, ValidationFailurePolicy, Value};

/// Route engine events to the test harness. Honours `RUST_LOG`; safe to call
/// from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn retaining() -> StubConfig {
    StubConfig::default().with_validation_failure(ValidationFailurePolicy::Retain)
}

/// Read `key` and expect a plain value.
pub fn read_value(stub: &Stub, key: &str) -> Value {
    match stub.get(key) {
        Ok(Member::Value(value)) => value,
        Ok(Member::Method(method)) => panic!("{key} is a method: {method:?}"),
        Err(err) => panic!("read of {key} failed: {err}"),
    }
}

/// Read `key` and expect a method reference.
pub fn read_method(stub: &Stub, key: &str) -> Method {
    match stub.get(key) {
        Ok(Member::Method(method)) => method,
        Ok(Member::Value(value)) => panic!("{key} is a value: {value}"),
        Err(err) => panic!("read of {key} failed: {err}"),
    }
}
