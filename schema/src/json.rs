//! JSON Schema documents as schemas.

use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::Value;
use understudy_types::{Issue, IssuePath};

use crate::SchemaError;

/// A compiled JSON Schema document.
///
/// Each validation error becomes one issue located at the path where this
/// schema was applied; the nested location is part of the message.
#[derive(Clone)]
pub struct JsonSchema {
    document: Arc<Value>,
    validator: Arc<Validator>,
}

impl JsonSchema {
    /// Compile `document`.
    pub fn compile(document: Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(&document).map_err(|e| SchemaError::InvalidJsonSchema {
                message: e.to_string(),
            })?;
        Ok(Self {
            document: Arc::new(document),
            validator: Arc::new(validator),
        })
    }

    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub(crate) fn diagnose(&self, value: &Value, path: &IssuePath) -> Vec<Issue> {
        self.validator
            .iter_errors(value)
            .map(|err| Issue::new(path.clone(), err.to_string()))
            .collect()
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JsonSchema").field(&self.document).finish()
    }
}
