//! Script entries and the builders that produce them.
//!
//! Each builder embeds its own validation in the payload it returns; the
//! engine only decides *when* a payload runs.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use understudy_schema::{Schema, validate};
use understudy_types::ScriptKind;

use crate::StubError;

/// Implementation of a scripted or fallback call.
pub type CallFn = Rc<dyn Fn(&[Value]) -> Result<Value, StubError>>;
/// Producer behind a scripted read.
pub type ProduceFn = Rc<dyn Fn() -> Value>;
/// Handler behind a scripted write; `None` means "accepted".
pub type HandleFn = Rc<dyn Fn(&Value) -> Result<Option<bool>, StubError>>;

/// Payload of a script entry.
#[derive(Clone)]
pub enum ScriptValue {
    Literal(Value),
    Producer(ProduceFn),
    Handler(HandleFn),
    Variadic(CallFn),
}

impl ScriptValue {
    /// Short name of the payload shape, for diagnostics.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            ScriptValue::Literal(_) => "literal",
            ScriptValue::Producer(_) => "producer",
            ScriptValue::Handler(_) => "handler",
            ScriptValue::Variadic(_) => "variadic",
        }
    }
}

impl fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            other => write!(f, "{}(..)", other.shape()),
        }
    }
}

/// One declared interaction, not yet bound to a key.
#[derive(Debug, Clone)]
pub struct Script {
    kind: ScriptKind,
    value: ScriptValue,
}

impl Script {
    /// A raw entry. The builders below always pair kind and payload
    /// correctly; entries made here are checked when the stub is built.
    #[must_use]
    pub fn new(kind: ScriptKind, value: ScriptValue) -> Self {
        Self { kind, value }
    }

    #[must_use]
    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> &ScriptValue {
        &self.value
    }

    pub(crate) fn into_parts(self) -> (ScriptKind, ScriptValue) {
        (self.kind, self.value)
    }
}

/// What a `set_with` handler reports back.
///
/// `()` accepts the write; a `bool` is the verdict itself.
pub trait SetOutcome {
    fn verdict(self) -> Option<bool>;
}

impl SetOutcome for () {
    fn verdict(self) -> Option<bool> {
        None
    }
}

impl SetOutcome for bool {
    fn verdict(self) -> Option<bool> {
        Some(self)
    }
}

fn call_script<F>(params: Vec<Schema>, implementation: F) -> Script
where
    F: Fn(&[Value]) -> Value + 'static,
{
    let schema = Schema::Tuple(params);
    Script::new(
        ScriptKind::Call,
        ScriptValue::Variadic(Rc::new(
            move |args: &[Value]| -> Result<Value, StubError> {
                validate(&schema, &Value::Array(args.to_vec()), "Unexpected parameters")?;
                Ok(implementation(args))
            },
        )),
    )
}

/// A void call whose arguments must match `params`.
#[must_use]
pub fn call(params: Vec<Schema>) -> Script {
    call_script(params, |_| Value::Null)
}

/// A call answering with a constant.
pub fn call_returning(params: Vec<Schema>, value: impl Into<Value>) -> Script {
    let value = value.into();
    call_script(params, move |_| value.clone())
}

/// A call answered by `implementation`.
pub fn call_with<F, R>(params: Vec<Schema>, implementation: F) -> Script
where
    F: Fn(&[Value]) -> R + 'static,
    R: Into<Value>,
{
    call_script(params, move |args| implementation(args).into())
}

/// A read answering with a constant.
pub fn get(value: impl Into<Value>) -> Script {
    let value = value.into();
    get_with(move || value.clone())
}

/// A read answered by `producer`.
pub fn get_with<F, R>(producer: F) -> Script
where
    F: Fn() -> R + 'static,
    R: Into<Value>,
{
    Script::new(
        ScriptKind::Get,
        ScriptValue::Producer(Rc::new(move || producer().into())),
    )
}

fn set_script<F>(schema: Schema, implementation: F) -> Script
where
    F: Fn(&Value) -> Option<bool> + 'static,
{
    Script::new(
        ScriptKind::Set,
        ScriptValue::Handler(Rc::new(
            move |value: &Value| -> Result<Option<bool>, StubError> {
                validate(&schema, value, "Unexpected value")?;
                Ok(implementation(value))
            },
        )),
    )
}

/// A write whose value must match `schema`; accepted when it does.
pub fn set(schema: impl Into<Schema>) -> Script {
    set_script(schema.into(), |_| None)
}

/// A write with a constant verdict.
pub fn set_accepting(schema: impl Into<Schema>, accepted: bool) -> Script {
    set_script(schema.into(), move |_| Some(accepted))
}

/// A write handed to `implementation` once validated.
pub fn set_with<F, R>(schema: impl Into<Schema>, implementation: F) -> Script
where
    F: Fn(&Value) -> R + 'static,
    R: SetOutcome,
{
    set_script(schema.into(), move |value| implementation(value).verdict())
}

/// A value baked into the fallback object the first time it is read.
pub fn property(value: impl Into<Value>) -> Script {
    Script::new(ScriptKind::Property, ScriptValue::Literal(value.into()))
}
