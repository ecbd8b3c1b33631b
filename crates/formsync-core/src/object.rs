//! CRM object types, per-object payloads, and dispatch outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A CRM entity category. Each provider supports its own subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Contact,
    Deal,
    Lead,
    Account,
    Company,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Contact => "contact",
            ObjectType::Deal => "deal",
            ObjectType::Lead => "lead",
            ObjectType::Account => "account",
            ObjectType::Company => "company",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved field values for one target object, in mapping order.
///
/// Order matters on the wire for some providers (HubSpot sends properties
/// as an ordered list), so this is a small insertion-ordered map rather
/// than a HashMap. Transient: built per submission, discarded after
/// dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPayload {
    entries: Vec<(String, Value)>,
}

impl ObjectPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping first-insertion order.
    pub fn insert(&mut self, handle: impl Into<String>, value: Value) {
        let handle = handle.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == handle) {
            entry.1 = value;
        } else {
            self.entries.push((handle, value));
        }
    }

    pub fn get(&self, handle: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == handle).map(|(_, v)| v)
    }

    /// String form of a value, for endpoints that splice values into URLs.
    pub fn get_str(&self, handle: &str) -> Option<String> {
        self.get(handle).map(value_to_string)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flat JSON object, in entry order.
    pub fn to_object(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (k, v) in &self.entries {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

/// Render a JSON scalar the way a form value reads, without quotes.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Result of one dispatch step, in sequence order.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    #[serde(rename = "objectType")]
    pub object_type: ObjectType,
    #[serde(rename = "externalId", skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub success: bool,
    #[serde(rename = "errorDetail", skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl DispatchResult {
    pub fn ok(object_type: ObjectType, external_id: Option<String>) -> Self {
        Self {
            object_type,
            external_id,
            success: true,
            error_detail: None,
        }
    }

    pub fn failed(object_type: ObjectType, detail: impl Into<String>) -> Self {
        Self {
            object_type,
            external_id: None,
            success: false,
            error_detail: Some(detail.into()),
        }
    }
}

/// The full set of step results for one submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncOutcome {
    pub results: Vec<DispatchResult>,
    pub success: bool,
}

impl SyncOutcome {
    /// External id reported by the step for `object_type`, if any.
    pub fn external_id(&self, object_type: ObjectType) -> Option<&str> {
        self.results
            .iter()
            .find(|r| r.object_type == object_type)
            .and_then(|r| r.external_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_preserves_order() {
        let mut payload = ObjectPayload::new();
        payload.insert("zzz", json!("1"));
        payload.insert("aaa", json!("2"));
        payload.insert("mmm", json!("3"));

        let keys: Vec<&str> = payload.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zzz", "aaa", "mmm"]);
    }

    #[test]
    fn test_payload_replace_keeps_position() {
        let mut payload = ObjectPayload::new();
        payload.insert("a", json!("1"));
        payload.insert("b", json!("2"));
        payload.insert("a", json!("updated"));

        let keys: Vec<&str> = payload.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(payload.get("a"), Some(&json!("updated")));
    }

    #[test]
    fn test_get_str_unquotes() {
        let mut payload = ObjectPayload::new();
        payload.insert("email", json!("jane@example.com"));
        payload.insert("count", json!(3));
        assert_eq!(payload.get_str("email").unwrap(), "jane@example.com");
        assert_eq!(payload.get_str("count").unwrap(), "3");
        assert!(payload.get_str("missing").is_none());
    }

    #[test]
    fn test_outcome_external_id() {
        let outcome = SyncOutcome {
            results: vec![
                DispatchResult::ok(ObjectType::Contact, Some("vid-9".into())),
                DispatchResult::failed(ObjectType::Deal, "boom"),
            ],
            success: false,
        };
        assert_eq!(outcome.external_id(ObjectType::Contact), Some("vid-9"));
        assert_eq!(outcome.external_id(ObjectType::Deal), None);
    }
}
