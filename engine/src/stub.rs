//! The interaction engine.
//!
//! A [`Stub`] owns three pieces of state:
//! - the main queue of script entries, matched only at its head;
//! - the pending-call queue: call entries whose reference was read but not
//!   yet invoked, in read order;
//! - the fallback object, which absorbs every key no script governs.
//!
//! Reads, writes and invocations are resolved against that state in a fixed
//! priority order. Any deviation is returned as a [`StubError`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::thread;

use serde::de::DeserializeOwned;
use serde_json::Value;
use understudy_config::{StubConfig, ValidationFailurePolicy};
use understudy_types::{Access, ScriptId, ScriptKind, ScriptRef};

use crate::script::{CallFn, HandleFn, ProduceFn, Script, ScriptValue};
use crate::{Fallback, Member, Method, StubError};

/// Payload of a queued entry; kind and shape always agree.
enum Payload {
    Property(Value),
    Get(ProduceFn),
    Set(HandleFn),
    Call(CallFn),
}

impl Payload {
    fn kind(&self) -> ScriptKind {
        match self {
            Payload::Property(_) => ScriptKind::Property,
            Payload::Get(_) => ScriptKind::Get,
            Payload::Set(_) => ScriptKind::Set,
            Payload::Call(_) => ScriptKind::Call,
        }
    }

    fn from_script(key: &str, script: Script) -> Result<Self, StubError> {
        match script.into_parts() {
            (ScriptKind::Call, ScriptValue::Variadic(implementation)) => {
                Ok(Payload::Call(implementation))
            }
            (ScriptKind::Call, _) => Err(StubError::NotInvokable {
                key: key.to_string(),
            }),
            (ScriptKind::Property, ScriptValue::Literal(value)) => Ok(Payload::Property(value)),
            (ScriptKind::Get, ScriptValue::Producer(producer)) => Ok(Payload::Get(producer)),
            (ScriptKind::Set, ScriptValue::Handler(handler)) => Ok(Payload::Set(handler)),
            (kind, _) => Err(StubError::MalformedScript {
                kind,
                key: key.to_string(),
            }),
        }
    }
}

struct ScriptEntry {
    id: ScriptId,
    key: String,
    payload: Payload,
}

impl ScriptEntry {
    fn script_ref(&self) -> ScriptRef {
        ScriptRef::new(self.payload.kind(), self.key.clone())
    }
}

pub(crate) struct PendingCall {
    pub(crate) id: ScriptId,
    pub(crate) key: String,
    pub(crate) method: Method,
}

impl PendingCall {
    pub(crate) fn script_ref(&self) -> ScriptRef {
        ScriptRef::new(ScriptKind::Call, self.key.clone())
    }
}

pub(crate) struct StubState {
    queue: VecDeque<ScriptEntry>,
    pub(crate) pending: VecDeque<PendingCall>,
    fallback: Fallback,
    pub(crate) config: StubConfig,
}

impl StubState {
    /// Pop the head entry if it is scripted for `key`.
    fn pop_head(&mut self, key: &str) -> Option<ScriptEntry> {
        if self.queue.front().is_some_and(|head| head.key == key) {
            self.queue.pop_front()
        } else {
            None
        }
    }

    fn is_complete(&self) -> bool {
        self.queue.is_empty() && self.pending.is_empty()
    }

    fn remaining(&self) -> Vec<ScriptRef> {
        self.pending
            .iter()
            .map(PendingCall::script_ref)
            .chain(self.queue.iter().map(ScriptEntry::script_ref))
            .collect()
    }
}

/// A scripted stand-in object.
///
/// Built from an ordered list of `(key, Script)` pairs and an optional
/// fallback object. Single-threaded: the stub and the methods it hands out
/// share state through `Rc`.
pub struct Stub {
    state: Rc<RefCell<StubState>>,
}

impl Stub {
    /// Build a stub over an empty fallback with the default config.
    pub fn new<K, I>(scripts: I) -> Result<Self, StubError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Script)>,
    {
        Self::with_config(Fallback::new(), scripts, StubConfig::default())
    }

    /// Build a stub over `fallback` with the default config.
    pub fn with_fallback<K, I>(fallback: impl Into<Fallback>, scripts: I) -> Result<Self, StubError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Script)>,
    {
        Self::with_config(fallback, scripts, StubConfig::default())
    }

    /// Build a stub; fails if any script's payload does not fit its kind.
    pub fn with_config<K, I>(
        fallback: impl Into<Fallback>,
        scripts: I,
        config: StubConfig,
    ) -> Result<Self, StubError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Script)>,
    {
        let mut queue = VecDeque::new();
        for (index, (key, script)) in scripts.into_iter().enumerate() {
            let key = key.into();
            let payload = Payload::from_script(&key, script)?;
            queue.push_back(ScriptEntry {
                id: ScriptId::new(index as u64),
                key,
                payload,
            });
        }
        tracing::debug!(scripts = queue.len(), ?config, "stub created");

        Ok(Self {
            state: Rc::new(RefCell::new(StubState {
                queue,
                pending: VecDeque::new(),
                fallback: fallback.into(),
                config,
            })),
        })
    }

    #[must_use]
    pub fn builder() -> StubBuilder {
        StubBuilder::default()
    }

    /// Resolve a read of `key`.
    ///
    /// Priority: a pending call for `key`, then the queue head, then the
    /// fallback object.
    pub fn get(&self, key: &str) -> Result<Member, StubError> {
        let mut state = self.state.borrow_mut();

        if let Some(pending) = state.pending.iter().find(|pending| pending.key == key) {
            tracing::trace!(key, "read of pending call");
            return Ok(Member::Method(pending.method.clone()));
        }

        if let Some(entry) = state.pop_head(key) {
            let ScriptEntry { id, key, payload } = entry;
            match payload {
                Payload::Property(value) => {
                    tracing::debug!(key = %key, "property script consumed");
                    state.fallback.insert(key, value.clone());
                    return Ok(Member::Value(value));
                }
                Payload::Get(producer) => {
                    tracing::debug!(key = %key, "get script consumed");
                    drop(state);
                    return Ok(Member::Value(producer()));
                }
                Payload::Call(implementation) => {
                    let method =
                        Method::scripted(id, &key, implementation, Rc::downgrade(&self.state));
                    tracing::debug!(key = %key, id = %id, "call script read; pending invocation");
                    state.pending.push_back(PendingCall {
                        id,
                        key: key.clone(),
                        method: method.clone(),
                    });
                    state.fallback.insert(key, method.clone());
                    return Ok(Member::Method(method));
                }
                payload @ Payload::Set(_) => {
                    let kind = payload.kind();
                    state.queue.push_front(ScriptEntry {
                        id,
                        key: key.clone(),
                        payload,
                    });
                    tracing::warn!(key = %key, %kind, "read hit a write script");
                    return Err(StubError::UnexpectedScriptType {
                        kind,
                        key,
                        access: Access::Read,
                    });
                }
            }
        }

        match state.fallback.get(key) {
            Some(member) => {
                tracing::trace!(key, "fallback read");
                Ok(member.clone())
            }
            None => {
                tracing::warn!(key, "read of unexpected key");
                Err(StubError::UnexpectedKey {
                    key: key.to_string(),
                })
            }
        }
    }

    /// Resolve a write of `key`.
    ///
    /// Returns the script's verdict (`true` unless a handler says otherwise);
    /// the verdict is never stored as the value.
    pub fn set(&self, key: &str, value: Value) -> Result<bool, StubError> {
        let mut state = self.state.borrow_mut();

        if let Some(entry) = state.pop_head(key) {
            let ScriptEntry { id, key, payload } = entry;
            let handler = match payload {
                Payload::Set(handler) => handler,
                payload => {
                    let kind = payload.kind();
                    state.queue.push_front(ScriptEntry {
                        id,
                        key: key.clone(),
                        payload,
                    });
                    tracing::warn!(key = %key, %kind, "write hit a non-write script");
                    return Err(StubError::UnexpectedScriptType {
                        kind,
                        key,
                        access: Access::Write,
                    });
                }
            };
            let policy = state.config.on_validation_failure;
            drop(state);

            tracing::debug!(key = %key, "set script consumed");
            return match handler(&value) {
                Ok(verdict) => Ok(verdict.unwrap_or(true)),
                Err(err) => {
                    if err.is_constraint() {
                        tracing::warn!(key = %key, %err, "written value failed validation");
                    }
                    if err.is_constraint() && policy == ValidationFailurePolicy::Retain {
                        tracing::debug!(key = %key, "write rejected; retaining script");
                        self.state.borrow_mut().queue.push_front(ScriptEntry {
                            id,
                            key,
                            payload: Payload::Set(handler),
                        });
                    }
                    Err(err)
                }
            };
        }

        if state.fallback.assign(key, value) {
            tracing::debug!(key, "fallback assignment");
            Ok(true)
        } else {
            tracing::warn!(key, "write of unexpected key");
            Err(StubError::UnexpectedKey {
                key: key.to_string(),
            })
        }
    }

    /// Like [`Stub::set`], but a `false` verdict is an error.
    pub fn assign(&self, key: &str, value: Value) -> Result<(), StubError> {
        if self.set(key, value)? {
            Ok(())
        } else {
            Err(StubError::WriteRejected {
                key: key.to_string(),
            })
        }
    }

    /// Read `key` and invoke the method found there.
    pub fn invoke(&self, key: &str, args: &[Value]) -> Result<Value, StubError> {
        match self.get(key)? {
            Member::Method(method) => method.invoke(args),
            Member::Value(_) => Err(StubError::NotCallable {
                key: key.to_string(),
            }),
        }
    }

    /// Read `key` as a value and decode it.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<T, StubError> {
        match self.get(key)? {
            Member::Value(value) => decode(key, value),
            Member::Method(_) => Err(StubError::NotAValue {
                key: key.to_string(),
            }),
        }
    }

    /// Invoke `key` and decode its result.
    pub fn call<T: DeserializeOwned>(&self, key: &str, args: &[Value]) -> Result<T, StubError> {
        let value = self.invoke(key, args)?;
        decode(key, value)
    }

    /// True once every scripted interaction has happened.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.borrow().is_complete()
    }

    /// Unconsumed scripts: pending calls first, then the main queue.
    #[must_use]
    pub fn remaining(&self) -> Vec<ScriptRef> {
        self.state.borrow().remaining()
    }

    #[must_use]
    pub fn config(&self) -> StubConfig {
        self.state.borrow().config
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, StubError> {
    serde_json::from_value(value).map_err(|source| StubError::Decode {
        key: key.to_string(),
        source,
    })
}

impl Drop for Stub {
    fn drop(&mut self) {
        let Ok(state) = self.state.try_borrow() else {
            return;
        };
        if !state.config.verify_on_drop || state.is_complete() || thread::panicking() {
            return;
        }
        let err = StubError::Incomplete {
            remaining: state.remaining(),
        };
        drop(state);
        tracing::warn!(%err, "stub dropped with pending scripts");
        panic!("{err}");
    }
}

/// Capability set for intercepted objects.
///
/// Typed stand-ins (hand-written or generated) implement their own trait by
/// delegating every member access to one of these.
pub trait Intercept {
    fn on_read(&self, key: &str) -> Result<Member, StubError>;

    fn on_write(&self, key: &str, value: Value) -> Result<bool, StubError>;

    fn on_invoke(&self, key: &str, args: &[Value]) -> Result<Value, StubError> {
        match self.on_read(key)? {
            Member::Method(method) => method.invoke(args),
            Member::Value(_) => Err(StubError::NotCallable {
                key: key.to_string(),
            }),
        }
    }
}

impl Intercept for Stub {
    fn on_read(&self, key: &str) -> Result<Member, StubError> {
        self.get(key)
    }

    fn on_write(&self, key: &str, value: Value) -> Result<bool, StubError> {
        self.set(key, value)
    }

    fn on_invoke(&self, key: &str, args: &[Value]) -> Result<Value, StubError> {
        self.invoke(key, args)
    }
}

/// Fluent construction of a [`Stub`].
#[derive(Default)]
pub struct StubBuilder {
    fallback: Fallback,
    scripts: Vec<(String, Script)>,
    config: StubConfig,
}

impl StubBuilder {
    #[must_use]
    pub fn fallback(mut self, fallback: impl Into<Fallback>) -> Self {
        self.fallback = fallback.into();
        self
    }

    #[must_use]
    pub fn script(mut self, key: impl Into<String>, script: Script) -> Self {
        self.scripts.push((key.into(), script));
        self
    }

    #[must_use]
    pub fn config(mut self, config: StubConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Stub, StubError> {
        Stub::with_config(self.fallback, self.scripts, self.config)
    }
}

/// `Ok` once both of the stub's queues are empty.
pub fn ensure_scripts_completed(stub: &Stub) -> Result<(), StubError> {
    if stub.is_complete() {
        Ok(())
    } else {
        Err(StubError::Incomplete {
            remaining: stub.remaining(),
        })
    }
}

/// Panic unless every scripted interaction of `stub` has happened.
#[track_caller]
pub fn assert_scripts_completed(stub: &Stub) {
    if let Err(err) = ensure_scripts_completed(stub) {
        panic!("{err}");
    }
}
