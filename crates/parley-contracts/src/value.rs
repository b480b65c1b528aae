//! The result of a successful extraction.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;

/// A JSON value that has passed conformance against an `OutputSchema`.
///
/// Parsers construct this only after every declared field has been checked,
/// so consumers may decode it into their typed view without re-validating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredValue(Value);

impl StructuredValue {
    /// Wrap a value the caller has already checked against its schema.
    pub fn conformed(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Decode into a typed view such as `IntentResult` or `DomainRecord`.
    ///
    /// Fails only when the typed view is stricter than the schema the value
    /// was checked against.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_json::from_value(self.0.clone()).map_err(|e| ParseError::SchemaMismatch {
            field_path: "$".to_string(),
            reason: format!("value does not decode into the typed view: {e}"),
        })
    }
}
