//! Stub configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock behavior. A config file is TOML:
//!
//! ```toml
//! on_validation_failure = "retain"
//! verify_on_drop = true
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a config file for [`StubConfig::discover`].
pub const CONFIG_ENV: &str = "UNDERSTUDY_CONFIG";

/// What happens to a `set` or `call` entry whose value or arguments fail
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailurePolicy {
    /// The entry stays consumed; later accesses fall through to the next
    /// entry, the fallback, or an unexpected-key error.
    #[default]
    Consume,
    /// The entry goes back to the head of its queue so a corrected retry
    /// matches it.
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StubConfig {
    pub on_validation_failure: ValidationFailurePolicy,
    /// Panic when a stub with unconsumed scripts is dropped.
    pub verify_on_drop: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl StubConfig {
    /// Builder-style override of the validation failure policy.
    #[must_use]
    pub fn with_validation_failure(mut self, policy: ValidationFailurePolicy) -> Self {
        self.on_validation_failure = policy;
        self
    }

    #[must_use]
    pub fn with_verify_on_drop(mut self, verify: bool) -> Self {
        self.verify_on_drop = verify;
        self
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?config, "loaded stub config");
        Ok(config)
    }

    /// Load the file named by `UNDERSTUDY_CONFIG`, or defaults when unset.
    pub fn discover() -> Result<Self, ConfigError> {
        Self::load_optional(env::var_os(CONFIG_ENV).map(PathBuf::from).as_deref())
    }

    fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
