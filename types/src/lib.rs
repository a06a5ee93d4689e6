//! Core domain types for understudy.
//!
//! This crate contains pure domain types with no IO and minimal dependencies.
//! The engine, the schema collaborator and the config loader all build on it.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod issue;
pub use issue::{ConstraintError, Issue, IssuePath, PathSegment};

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Script Kinds
// ============================================================================

/// The interaction a script entry expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// A value baked into the fallback object on first read.
    Property,
    /// A read answered by a producer.
    Get,
    /// A write checked by a handler.
    Set,
    /// A method reference read now and invoked later.
    Call,
}

impl ScriptKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScriptKind::Property => "property",
            ScriptKind::Get => "get",
            ScriptKind::Set => "set",
            ScriptKind::Call => "call",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stub-unique identity of a script entry.
///
/// Two entries with the same key and kind are still different scripts; guards
/// compare ids, never payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptId(u64);

impl ScriptId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Human-facing name of a script entry: its kind and key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptRef {
    pub kind: ScriptKind,
    pub key: String,
}

impl ScriptRef {
    pub fn new(kind: ScriptKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.key)
    }
}

/// The kind of access that reached the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("read"),
            Access::Write => f.write_str("write"),
        }
    }
}
