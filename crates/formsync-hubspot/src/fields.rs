//! HubSpot property metadata parsing.

use formsync_core::{FieldDescriptor, FieldType};
use serde_json::Value;

/// HubSpot property types we accept; everything else is skipped, as are
/// read-only, hidden, and calculated properties.
fn map_type(type_str: &str) -> Option<FieldType> {
    match type_str {
        "string" => Some(FieldType::Text),
        "enumeration" => Some(FieldType::Enumeration),
        "datetime" => Some(FieldType::DateTime),
        "date" => Some(FieldType::Date),
        "phone_number" => Some(FieldType::Phone),
        "bool" => Some(FieldType::Boolean),
        "number" => Some(FieldType::Number),
        _ => None,
    }
}

/// Normalize the `results` array of a `crm/v3/properties/{object}`
/// response, excluding properties already covered by built-in fields.
pub fn parse_custom_fields(results: &Value, exclude_names: &[&str]) -> Vec<FieldDescriptor> {
    let Some(fields) = results.as_array() else {
        return Vec::new();
    };

    let mut custom = Vec::new();
    for field in fields {
        let read_only = field["modificationMetadata"]["readOnlyValue"]
            .as_bool()
            .unwrap_or(false);
        let hidden = field["hidden"].as_bool().unwrap_or(false);
        let calculated = field["calculated"].as_bool().unwrap_or(false);
        if read_only || hidden || calculated {
            continue;
        }

        let Some(field_type) = field["type"].as_str().and_then(map_type) else {
            continue;
        };

        let Some(name) = field["name"].as_str() else {
            continue;
        };
        if exclude_names.contains(&name) {
            continue;
        }

        let label = field["label"].as_str().unwrap_or(name);
        custom.push(FieldDescriptor::new(name, label).with_type(field_type));
    }

    custom
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn property(name: &str, label: &str, type_str: &str) -> Value {
        json!({
            "name": name,
            "label": label,
            "type": type_str,
            "hidden": false,
            "calculated": false,
            "modificationMetadata": {"readOnlyValue": false},
        })
    }

    #[test]
    fn test_parses_supported_types() {
        let results = json!([
            property("firstname", "First Name", "string"),
            property("amount", "Amount", "number"),
            property("closedate", "Close Date", "datetime"),
        ]);
        let fields = parse_custom_fields(&results, &[]);

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].handle, "firstname");
        assert_eq!(fields[0].name, "First Name");
        assert_eq!(fields[1].field_type, FieldType::Number);
        assert_eq!(fields[2].field_type, FieldType::DateTime);
    }

    #[test]
    fn test_skips_read_only_hidden_calculated() {
        let mut read_only = property("a", "A", "string");
        read_only["modificationMetadata"]["readOnlyValue"] = json!(true);
        let mut hidden = property("b", "B", "string");
        hidden["hidden"] = json!(true);
        let mut calculated = property("c", "C", "string");
        calculated["calculated"] = json!(true);

        let results = json!([read_only, hidden, calculated, property("d", "D", "string")]);
        let fields = parse_custom_fields(&results, &[]);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].handle, "d");
    }

    #[test]
    fn test_skips_unsupported_types() {
        let results = json!([
            property("files", "Files", "object_list"),
            property("ok", "Ok", "bool"),
        ]);
        let fields = parse_custom_fields(&results, &[]);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type, FieldType::Boolean);
    }

    #[test]
    fn test_excludes_builtin_names() {
        let results = json!([
            property("email", "Email", "string"),
            property("website", "Website", "string"),
        ]);
        let fields = parse_custom_fields(&results, &["email"]);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].handle, "website");
    }
}
