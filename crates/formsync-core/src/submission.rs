//! A form submission as seen by the connector.
//!
//! The host stores submissions; we only read field values out of them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flattened form submission values, keyed by form-field handle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub values: HashMap<String, Value>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, handle: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(handle.into(), value.into());
        self
    }

    pub fn value(&self, handle: &str) -> Option<&Value> {
        self.values.get(handle)
    }

    /// String form of a field value; missing and null both read as empty.
    pub fn value_str(&self, handle: &str) -> String {
        self.values
            .get(handle)
            .map(crate::object::value_to_string)
            .unwrap_or_default()
    }
}
