//! Scripted stand-in objects.
//!
//! A [`Stub`] is built from an ordered list of expected interactions and
//! replays them: property reads ([`get`], [`property`]), property writes
//! ([`set`]) and method calls ([`call`]). Anything outside the script is
//! served by a [`Fallback`] object or rejected with a [`StubError`].
//!
//! ```
//! use understudy::{Fallback, Schema, Stub, assert_scripts_completed, call_returning, get, json};
//!
//! let stub = Stub::with_fallback(
//!     Fallback::new().with_value("name", "default"),
//!     [
//!         ("name", get("scripted")),
//!         ("greet", call_returning(vec![Schema::string()], "hi")),
//!     ],
//! )?;
//!
//! assert_eq!(stub.read::<String>("name")?, "scripted");
//! assert_eq!(stub.call::<String>("greet", &[json!("ada")])?, "hi");
//! assert_eq!(stub.read::<String>("name")?, "default");
//! assert_scripts_completed(&stub);
//! # Ok::<(), understudy::StubError>(())
//! ```

pub use serde_json::{Value, json};

pub use understudy_config::{CONFIG_ENV, ConfigError, StubConfig, ValidationFailurePolicy};
pub use understudy_engine::{
    Fallback, Intercept, Member, Method, Script, ScriptValue, SetOutcome, Stub, StubBuilder,
    StubError, assert_scripts_completed, call, call_returning, call_with,
    ensure_scripts_completed, get, get_with, property, set, set_accepting, set_with,
};
pub use understudy_schema::{
    Diagnose, JsonSchema, Schema, SchemaError, ValueType, diagnose, validate,
};
pub use understudy_types::{
    Access, ConstraintError, Issue, IssuePath, PathSegment, ScriptId, ScriptKind, ScriptRef,
};
