//! Stored field mappings and per-object sync settings.
//!
//! These are read-only to the connector: the host's configuration storage
//! owns them, we only deserialize and consume.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ObjectType;

/// One configured correspondence: an external field handle and the
/// form-side reference that produces its value. The reference is either
/// literal text or a template expression like `{emailField}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// External CRM field handle.
    pub field: String,
    /// Form-field reference or literal text.
    pub source: String,
}

/// Ordered mapping for one target object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub entries: Vec<MappingEntry>,
}

impl FieldMapping {
    pub fn new(entries: Vec<(impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(field, source)| MappingEntry {
                    field: field.into(),
                    source: source.into(),
                })
                .collect(),
        }
    }

    pub fn source_for(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.source.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mapping plus enablement for one object type (the mapToContact /
/// mapToDeal / ... flags).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSync {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mapping: FieldMapping,
}

/// All per-object sync settings for one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default)]
    pub objects: BTreeMap<ObjectType, ObjectSync>,
}

impl SyncSettings {
    /// Enable an object type with the given mapping.
    pub fn map_to(mut self, object: ObjectType, mapping: FieldMapping) -> Self {
        self.objects.insert(
            object,
            ObjectSync {
                enabled: true,
                mapping,
            },
        );
        self
    }

    pub fn enabled(&self, object: ObjectType) -> bool {
        self.objects.get(&object).is_some_and(|o| o.enabled)
    }

    pub fn mapping(&self, object: ObjectType) -> Option<&FieldMapping> {
        self.objects
            .get(&object)
            .filter(|o| o.enabled)
            .map(|o| &o.mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_flag() {
        let settings = SyncSettings::default().map_to(
            ObjectType::Contact,
            FieldMapping::new(vec![("email", "{emailField}")]),
        );

        assert!(settings.enabled(ObjectType::Contact));
        assert!(!settings.enabled(ObjectType::Deal));
        assert!(settings.mapping(ObjectType::Contact).is_some());
        assert!(settings.mapping(ObjectType::Deal).is_none());
    }

    #[test]
    fn test_disabled_mapping_not_returned() {
        let mut settings = SyncSettings::default();
        settings.objects.insert(
            ObjectType::Deal,
            ObjectSync {
                enabled: false,
                mapping: FieldMapping::new(vec![("dealname", "Won")]),
            },
        );
        assert!(settings.mapping(ObjectType::Deal).is_none());
    }

    #[test]
    fn test_source_lookup() {
        let mapping = FieldMapping::new(vec![("email", "{emailField}"), ("note", "fixed")]);
        assert_eq!(mapping.source_for("email"), Some("{emailField}"));
        assert_eq!(mapping.source_for("nope"), None);
    }
}
