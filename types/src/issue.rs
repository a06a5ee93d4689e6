//! Validation issues and the error that aggregates them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One step into a nested value: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

/// Location of an issue inside the validated value.
///
/// Renders its segments joined with `.` (`0`, `foo`, `bar.0`); issue lines
/// wrap it in brackets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssuePath(Vec<PathSegment>);

impl IssuePath {
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// A new path one segment deeper.
    #[must_use]
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// `self` followed by every segment of `relative`.
    #[must_use]
    pub fn join(&self, relative: &IssuePath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(relative.0.iter().cloned());
        Self(segments)
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for IssuePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for IssuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Index(index) => write!(f, "{index}")?,
                PathSegment::Key(key) => f.write_str(key)?,
            }
        }
        Ok(())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub path: IssuePath,
    pub message: String,
}

impl Issue {
    pub fn new(path: IssuePath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// The same issue relocated under `base`.
    #[must_use]
    pub fn under(self, base: &IssuePath) -> Self {
        Self {
            path: base.join(&self.path),
            message: self.message,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_root() {
            write!(f, "[{}] ", self.path)?;
        }
        f.write_str(&self.message)?;
        if !self.message.ends_with('.') {
            f.write_str(".")?;
        }
        Ok(())
    }
}

/// A value or argument list did not satisfy its schema.
///
/// Displays as the summary line followed by one indented line per issue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.summary, .issues))]
pub struct ConstraintError {
    pub summary: String,
    pub issues: Vec<Issue>,
}

impl ConstraintError {
    pub fn new(summary: impl Into<String>, issues: Vec<Issue>) -> Self {
        Self {
            summary: summary.into(),
            issues,
        }
    }
}

fn render(summary: &str, issues: &[Issue]) -> String {
    if issues.is_empty() {
        return summary.to_string();
    }
    let mut out = format!("{summary}:");
    for issue in issues {
        out.push_str("\n  ");
        out.push_str(&issue.to_string());
    }
    out
}
