//! Errors surfaced by stubs.

use thiserror::Error;
use understudy_types::{Access, ConstraintError, ScriptKind, ScriptRef};

/// Every deviation from the script, plus construction and decoding failures.
#[derive(Debug, Error)]
pub enum StubError {
    #[error("Script call {key:?} is not invokable")]
    NotInvokable { key: String },
    #[error("Script {kind} {key:?} carries a payload of the wrong shape")]
    MalformedScript { kind: ScriptKind, key: String },
    #[error("Unexpected key {key:?}")]
    UnexpectedKey { key: String },
    #[error("Unexpected script type {kind} on {access} of key {key:?}")]
    UnexpectedScriptType {
        kind: ScriptKind,
        key: String,
        access: Access,
    },
    #[error("Unexpected script {invoked}, expecting {expected}")]
    OutOfOrder {
        invoked: ScriptRef,
        expected: ScriptRef,
    },
    #[error("Unexpected script {invoked}, no pending scripts")]
    NoPendingScripts { invoked: ScriptRef },
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
    #[error("Stub still has pending scripts: {}", join_scripts(.remaining))]
    Incomplete { remaining: Vec<ScriptRef> },
    #[error("Write to key {key:?} was rejected")]
    WriteRejected { key: String },
    #[error("Key {key:?} is not a method")]
    NotCallable { key: String },
    #[error("Key {key:?} holds a method, not a value")]
    NotAValue { key: String },
    #[error("Script {invoked} was invoked after its stub was dropped")]
    Detached { invoked: ScriptRef },
    #[error("Failed to decode key {key:?}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StubError {
    /// Whether this is a value or argument validation failure.
    #[must_use]
    pub fn is_constraint(&self) -> bool {
        matches!(self, StubError::Constraint(_))
    }

    #[must_use]
    pub fn constraint(&self) -> Option<&ConstraintError> {
        match self {
            StubError::Constraint(err) => Some(err),
            _ => None,
        }
    }
}

fn join_scripts(scripts: &[ScriptRef]) -> String {
    scripts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
