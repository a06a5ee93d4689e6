//! The plain object behind a stub.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::Method;

/// What a key resolves to: a value or a method reference.
#[derive(Debug, Clone)]
pub enum Member {
    Value(Value),
    Method(Method),
}

impl Member {
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Member::Value(value) => Some(value),
            Member::Method(_) => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Member::Value(value) => Some(value),
            Member::Method(_) => None,
        }
    }

    #[must_use]
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(method) => Some(method),
            Member::Value(_) => None,
        }
    }

    #[must_use]
    pub fn is_method(&self) -> bool {
        matches!(self, Member::Method(_))
    }
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        Member::Value(value)
    }
}

impl From<Method> for Member {
    fn from(method: Method) -> Self {
        Member::Method(method)
    }
}

/// Backing store for keys no script currently governs.
#[derive(Debug, Clone, Default)]
pub struct Fallback {
    members: BTreeMap<String, Member>,
}

impl Fallback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(key.into(), Member::Value(value.into()));
        self
    }

    /// Add an unscripted method; it may be called any number of times.
    #[must_use]
    pub fn with_method<F, R>(mut self, key: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&[Value]) -> R + 'static,
        R: Into<Value>,
    {
        let method = Method::new(move |args| Ok(implementation(args).into()));
        self.members.insert(key.into(), Member::Method(method));
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Member> {
        self.members.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, member: impl Into<Member>) {
        self.members.insert(key.into(), member.into());
    }

    /// Ordinary assignment to an existing key. Returns `false` and leaves the
    /// object untouched when the key is absent.
    pub fn assign(&mut self, key: &str, value: Value) -> bool {
        match self.members.get_mut(key) {
            Some(member) => {
                *member = Member::Value(value);
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl From<Map<String, Value>> for Fallback {
    fn from(object: Map<String, Value>) -> Self {
        Self {
            members: object
                .into_iter()
                .map(|(key, value)| (key, Member::Value(value)))
                .collect(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Member)> for Fallback {
    fn from_iter<I: IntoIterator<Item = (K, Member)>>(iter: I) -> Self {
        Self {
            members: iter
                .into_iter()
                .map(|(key, member)| (key.into(), member))
                .collect(),
        }
    }
}
