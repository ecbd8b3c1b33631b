//! Zoho field metadata parsing.

use formsync_core::{FieldDescriptor, FieldOption, FieldOptions, FieldType};
use serde_json::Value;

/// Zoho reports both a `json_type` and a `data_type`; the json type wins
/// when present. Unrecognized types pass through as text rather than
/// being dropped.
fn map_type(type_str: &str) -> FieldType {
    match type_str {
        "integer" | "double" | "currency" | "number" | "bigint" | "decimal" => FieldType::Number,
        "boolean" => FieldType::Boolean,
        "datetime" => FieldType::DateTime,
        "date" => FieldType::Date,
        "phone" => FieldType::Phone,
        "picklist" | "multiselectpicklist" => FieldType::Enumeration,
        _ => FieldType::Text,
    }
}

/// Normalize the `fields` array of a `settings/fields?module=...`
/// response. Read-only fields are skipped; picklist values keep Zoho's
/// id-when-present, literal-value-otherwise semantics.
pub fn parse_fields(fields: &Value) -> Vec<FieldDescriptor> {
    let Some(fields) = fields.as_array() else {
        return Vec::new();
    };

    let mut parsed = Vec::new();
    for field in fields {
        let read_only = field["read_only"].as_bool().unwrap_or(false)
            || field["field_read_only"].as_bool().unwrap_or(false);
        if read_only {
            continue;
        }

        let Some(api_name) = field["api_name"].as_str() else {
            continue;
        };
        let label = field["field_label"].as_str().unwrap_or(api_name);

        let type_str = field["json_type"]
            .as_str()
            .or_else(|| field["data_type"].as_str())
            .unwrap_or_default();

        let options: Vec<FieldOption> = field["pick_list_values"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|pick| {
                let display = pick["display_value"].as_str()?;
                // The write API expects the id when Zoho assigns one,
                // otherwise the actual value string.
                let value = match &pick["id"] {
                    Value::String(id) => id.clone(),
                    Value::Number(id) => id.to_string(),
                    _ => pick["actual_value"].as_str()?.to_string(),
                };
                Some(FieldOption {
                    label: display.to_string(),
                    value,
                })
            })
            .collect();

        let mut descriptor = FieldDescriptor::new(api_name, label).with_type(map_type(type_str));
        descriptor.required = field["system_mandatory"].as_bool().unwrap_or(false);
        if !options.is_empty() {
            descriptor = descriptor.with_options(FieldOptions {
                label: label.to_string(),
                options,
            });
        }

        parsed.push(descriptor);
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_basic_field() {
        let fields = json!([{
            "api_name": "Last_Name",
            "field_label": "Last Name",
            "json_type": "string",
            "system_mandatory": true,
            "read_only": false,
            "field_read_only": false,
        }]);
        let parsed = parse_fields(&fields);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].handle, "Last_Name");
        assert!(parsed[0].required);
        assert_eq!(parsed[0].field_type, FieldType::Text);
    }

    #[test]
    fn test_skips_read_only_variants() {
        let fields = json!([
            {"api_name": "a", "field_label": "A", "read_only": true},
            {"api_name": "b", "field_label": "B", "field_read_only": true},
            {"api_name": "c", "field_label": "C", "json_type": "string"},
        ]);
        let parsed = parse_fields(&fields);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].handle, "c");
    }

    #[test]
    fn test_data_type_fallback_and_passthrough() {
        let fields = json!([
            {"api_name": "When", "field_label": "When", "data_type": "datetime"},
            {"api_name": "Blob", "field_label": "Blob", "data_type": "somethingnew"},
        ]);
        let parsed = parse_fields(&fields);
        assert_eq!(parsed[0].field_type, FieldType::DateTime);
        // Unknown types degrade to text instead of disappearing.
        assert_eq!(parsed[1].field_type, FieldType::Text);
    }

    #[test]
    fn test_picklist_prefers_id_over_actual_value() {
        let fields = json!([{
            "api_name": "Lead_Source",
            "field_label": "Lead Source",
            "data_type": "picklist",
            "pick_list_values": [
                {"display_value": "Web", "id": "4201883000000006871", "actual_value": "Web"},
                {"display_value": "Phone", "actual_value": "Phone Enquiry"},
            ],
        }]);
        let parsed = parse_fields(&fields);
        let options = parsed[0].options.as_ref().unwrap();

        assert_eq!(options.label, "Lead Source");
        assert_eq!(options.options[0].value, "4201883000000006871");
        assert_eq!(options.options[1].value, "Phone Enquiry");
        assert_eq!(parsed[0].field_type, FieldType::Enumeration);
    }
}
