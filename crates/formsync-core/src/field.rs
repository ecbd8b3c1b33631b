//! Normalized CRM field descriptors.
//!
//! Providers describe their object schemas in wildly different shapes.
//! Adapters translate those into `FieldDescriptor`s so the mapping UI and
//! the resolver only ever see one model.

use serde::{Deserialize, Serialize};

/// Normalized field type across providers.
///
/// Adapters map provider-specific type strings through a fixed lookup
/// table; anything unrecognized passes through as `Text` rather than
/// being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    Date,
    DateTime,
    Phone,
    Enumeration,
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

/// A single selectable value in a picklist field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    /// Whatever the provider's write API expects back: an opaque id for
    /// some providers, the literal label for others. Stored verbatim.
    pub value: String,
}

/// Grouped picklist options with their own display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    pub label: String,
    pub options: Vec<FieldOption>,
}

/// One field of a CRM object schema, normalized. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// API handle used when writing the field.
    pub handle: String,
    /// Display label for the mapping UI.
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub options: Option<FieldOptions>,
}

impl FieldDescriptor {
    /// Plain text field with no options, the common case.
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            field_type: FieldType::Text,
            required: false,
            options: None,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.field_type = FieldType::Enumeration;
        self.options = Some(options);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let field = FieldDescriptor::new("dealstage", "Deal Stage")
            .required()
            .with_options(FieldOptions {
                label: "Stages".into(),
                options: vec![FieldOption {
                    label: "Sales: Won".into(),
                    value: "won".into(),
                }],
            });

        assert_eq!(field.handle, "dealstage");
        assert!(field.required);
        assert_eq!(field.field_type, FieldType::Enumeration);
        assert_eq!(field.options.unwrap().options.len(), 1);
    }

    #[test]
    fn test_serde_shape() {
        let field = FieldDescriptor::new("email", "Email").required();
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["handle"], "email");
        assert_eq!(json["type"], "text");
        // No options key when there are none.
        assert!(json.get("options").is_none());
    }
}
