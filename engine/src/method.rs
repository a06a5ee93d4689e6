//! Invokable members and the guard around scripted calls.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;
use understudy_config::ValidationFailurePolicy;
use understudy_types::{ScriptId, ScriptKind, ScriptRef};

use crate::StubError;
use crate::script::CallFn;
use crate::stub::{PendingCall, StubState};

/// A method reference handed out by a stub or stored in its fallback.
///
/// Cloning is cheap and preserves identity: every clone of a scripted method
/// is the same pending call.
#[derive(Clone)]
pub struct Method(Rc<MethodKind>);

enum MethodKind {
    Plain(CallFn),
    Scripted(Guard),
}

struct Guard {
    id: ScriptId,
    key: String,
    implementation: CallFn,
    state: Weak<RefCell<StubState>>,
}

impl Method {
    /// An unscripted method, e.g. for a fallback object.
    pub fn new<F>(implementation: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, StubError> + 'static,
    {
        Self(Rc::new(MethodKind::Plain(Rc::new(implementation))))
    }

    pub(crate) fn scripted(
        id: ScriptId,
        key: &str,
        implementation: CallFn,
        state: Weak<RefCell<StubState>>,
    ) -> Self {
        Self(Rc::new(MethodKind::Scripted(Guard {
            id,
            key: key.to_string(),
            implementation,
            state,
        })))
    }

    /// The script this method was read from, if any.
    #[must_use]
    pub fn script_id(&self) -> Option<ScriptId> {
        match &*self.0 {
            MethodKind::Plain(_) => None,
            MethodKind::Scripted(guard) => Some(guard.id),
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Invoke the method.
    ///
    /// A scripted method only runs when it is the head of its stub's
    /// pending-call queue.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, StubError> {
        match &*self.0 {
            MethodKind::Plain(implementation) => implementation(args),
            MethodKind::Scripted(guard) => guard.invoke(self, args),
        }
    }
}

impl Guard {
    fn script_ref(&self) -> ScriptRef {
        ScriptRef::new(ScriptKind::Call, self.key.clone())
    }

    fn invoke(&self, method: &Method, args: &[Value]) -> Result<Value, StubError> {
        let Some(state) = self.state.upgrade() else {
            return Err(StubError::Detached {
                invoked: self.script_ref(),
            });
        };

        let policy = {
            let mut state = state.borrow_mut();
            match state.pending.front() {
                Some(head) if head.id == self.id => {
                    state.pending.pop_front();
                }
                Some(head) => {
                    let expected = head.script_ref();
                    tracing::warn!(invoked = %self.key, %expected, "scripted call invoked out of order");
                    return Err(StubError::OutOfOrder {
                        invoked: self.script_ref(),
                        expected,
                    });
                }
                None => {
                    tracing::warn!(invoked = %self.key, "scripted call invoked with no pending scripts");
                    return Err(StubError::NoPendingScripts {
                        invoked: self.script_ref(),
                    });
                }
            }
            state.config.on_validation_failure
        };
        tracing::debug!(key = %self.key, id = %self.id, "scripted call invoked");

        let result = (self.implementation)(args);
        if let Err(err) = &result {
            if err.is_constraint() {
                tracing::warn!(key = %self.key, %err, "call arguments failed validation");
            }
            if err.is_constraint() && policy == ValidationFailurePolicy::Retain {
                tracing::debug!(key = %self.key, "call rejected; retaining pending entry");
                state.borrow_mut().pending.push_front(PendingCall {
                    id: self.id,
                    key: self.key.clone(),
                    method: method.clone(),
                });
            }
        }
        result
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            MethodKind::Plain(_) => f.write_str("Method(plain)"),
            MethodKind::Scripted(guard) => {
                write!(f, "Method({} {})", guard.script_ref(), guard.id)
            }
        }
    }
}
