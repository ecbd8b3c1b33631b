//! Required-subfield validation for composite form fields.
//!
//! A composite field (a "Name" field with first/last parts, an address
//! field with street/city/zip) carries per-subfield configuration: each
//! part can be individually enabled and individually required. Validation
//! runs unconditionally, even when the composite value as a whole is
//! empty, so a half-filled field still surfaces per-part errors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-subfield configuration, indexed by handle.
///
/// An explicit struct rather than computed property names: label,
/// enabled, and required all travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfieldSpec {
    pub handle: String,
    /// Configured display label, used verbatim in error messages.
    pub label: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub required: bool,
}

impl SubfieldSpec {
    pub fn new(handle: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            label: label.into(),
            enabled: true,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// One validation failure, keyed by the subfield's configured label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubfieldError {
    pub label: String,
    pub message: String,
}

/// The composite value: sub-key to sub-value.
pub type CompositeValue = HashMap<String, Value>;

/// True when a value is empty or whitespace-only after trimming.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Validate a composite value against its subfield specs.
///
/// For each enabled spec, the part is required when the whole field is
/// required or the part itself is. One error per blank-but-required
/// part, in spec declaration order. Disabled parts never error.
pub fn validate_subfields(
    value: &CompositeValue,
    specs: &[SubfieldSpec],
    field_required: bool,
) -> Vec<SubfieldError> {
    let mut errors = Vec::new();

    for spec in specs {
        if !spec.enabled {
            continue;
        }

        let required = field_required || spec.required;
        if required && is_blank(value.get(&spec.handle)) {
            errors.push(SubfieldError {
                label: spec.label.clone(),
                message: format!("\"{}\" cannot be blank.", spec.label),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name_value(first: &str, last: &str) -> CompositeValue {
        let mut value = CompositeValue::new();
        value.insert("first".into(), json!(first));
        value.insert("last".into(), json!(last));
        value
    }

    #[test]
    fn test_blank_required_subfield_errors() {
        // first filled, last blank but required; whole field optional.
        let specs = vec![
            SubfieldSpec::new("first", "First Name"),
            SubfieldSpec::new("last", "Last Name").required(),
        ];
        let errors = validate_subfields(&name_value("Jane", ""), &specs, false);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].label, "Last Name");
        assert_eq!(errors[0].message, "\"Last Name\" cannot be blank.");
    }

    #[test]
    fn test_field_required_propagates_to_all_enabled() {
        let specs = vec![
            SubfieldSpec::new("first", "First Name"),
            SubfieldSpec::new("last", "Last Name"),
        ];
        let errors = validate_subfields(&name_value("", ""), &specs, true);
        assert_eq!(errors.len(), 2);
        // Declaration order.
        assert_eq!(errors[0].label, "First Name");
        assert_eq!(errors[1].label, "Last Name");
    }

    #[test]
    fn test_disabled_subfield_never_errors() {
        let specs = vec![
            SubfieldSpec::new("first", "First Name").required(),
            SubfieldSpec::new("last", "Last Name").required().disabled(),
        ];
        let errors = validate_subfields(&name_value("", ""), &specs, false);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].label, "First Name");
    }

    #[test]
    fn test_whitespace_counts_as_blank() {
        let specs = vec![SubfieldSpec::new("last", "Last Name").required()];
        let errors = validate_subfields(&name_value("", "   \t"), &specs, false);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_missing_key_counts_as_blank() {
        let specs = vec![SubfieldSpec::new("middle", "Middle Name").required()];
        let errors = validate_subfields(&CompositeValue::new(), &specs, false);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].label, "Middle Name");
    }

    #[test]
    fn test_optional_blank_subfield_passes() {
        let specs = vec![
            SubfieldSpec::new("first", "First Name"),
            SubfieldSpec::new("last", "Last Name"),
        ];
        let errors = validate_subfields(&name_value("", ""), &specs, false);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_non_string_value_is_not_blank() {
        let mut value = CompositeValue::new();
        value.insert("count".into(), json!(0));
        let specs = vec![SubfieldSpec::new("count", "Count").required()];
        let errors = validate_subfields(&value, &specs, false);
        assert!(errors.is_empty());
    }
}
