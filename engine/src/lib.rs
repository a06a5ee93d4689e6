//! Interaction engine for understudy.
//!
//! A [`Stub`] replays an ordered script of property reads, property writes
//! and method calls, and fails on the first deviation. Scripts are built with
//! [`call`], [`get`], [`set`], [`property`] and their variants; unscripted
//! keys are served from a [`Fallback`] object.
//!
//! ```
//! use serde_json::json;
//! use understudy_engine::{Stub, assert_scripts_completed, call, call_returning};
//! use understudy_schema::Schema;
//!
//! let stub = Stub::new([
//!     ("foo", call(vec![])),
//!     ("bar", call_returning(vec![Schema::literal(123)], true)),
//! ])?;
//!
//! assert_eq!(stub.invoke("foo", &[])?, json!(null));
//! assert_eq!(stub.invoke("bar", &[json!(123)])?, json!(true));
//! assert_scripts_completed(&stub);
//! # Ok::<(), understudy_engine::StubError>(())
//! ```

mod error;
mod fallback;
mod method;
pub mod script;
mod stub;


pub use error::StubError;
pub use fallback::{Fallback, Member};
pub use method::Method;
pub use script::{
    Script, ScriptValue, SetOutcome, call, call_returning, call_with, get, get_with, property,
    set, set_accepting, set_with,
};
pub use stub::{Intercept, Stub, StubBuilder, assert_scripts_completed, ensure_scripts_completed};
