//! Provider capability trait.
//!
//! One fixed engine, parameterized by a small capability set per
//! provider: which objects it supports, the step ordering, the schema
//! fetch, request construction, and the response path its ids live at.
//! Adapters implement this instead of subclassing anything.

use std::collections::BTreeMap;

use async_trait::async_trait;
use formsync_core::{FieldDescriptor, ObjectPayload, ObjectType, Result};
use formsync_transport::{HttpRequest, Transport};
use serde_json::Value;

/// One step in a provider's dispatch plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSpec {
    /// Create or update one object.
    Create(ObjectType),
    /// Link two previously created objects. Always ordered after both
    /// `Create` steps in the plan.
    Associate { from: ObjectType, to: ObjectType },
}

impl StepSpec {
    /// The object type a step result is recorded under.
    pub fn object(&self) -> ObjectType {
        match self {
            StepSpec::Create(object) => *object,
            StepSpec::Associate { to, .. } => *to,
        }
    }
}

/// External ids collected from earlier steps, keyed by object type.
#[derive(Debug, Clone, Default)]
pub struct StepIds {
    ids: BTreeMap<ObjectType, String>,
}

impl StepIds {
    pub fn insert(&mut self, object: ObjectType, id: String) {
        self.ids.insert(object, id);
    }

    pub fn get(&self, object: ObjectType) -> Option<&str> {
        self.ids.get(&object).map(|s| s.as_str())
    }
}

/// Capability set a CRM provider adapter supplies to the engine.
#[async_trait]
pub trait CrmProvider: Send + Sync {
    /// Provider name for logs ("HubSpot", "Zoho").
    fn name(&self) -> &'static str;

    /// Object types this provider can map to.
    fn objects(&self) -> &[ObjectType];

    /// Canonical step ordering. The engine filters it down to enabled
    /// objects; association steps survive only when both ends do.
    fn steps(&self) -> Vec<StepSpec>;

    /// Fetch and normalize the schema for one object type. May issue
    /// several metadata calls. Filtering (read-only, hidden, calculated,
    /// excluded-by-name) and type normalization happen here.
    async fn fetch_schema(
        &self,
        transport: &Transport,
        object: ObjectType,
    ) -> Result<Vec<FieldDescriptor>>;

    /// Build the create/update request for one object. Ids from earlier
    /// steps are available for providers that embed associations in the
    /// create payload.
    fn create_request(
        &self,
        object: ObjectType,
        payload: &ObjectPayload,
        ids: &StepIds,
    ) -> Result<HttpRequest>;

    /// Build the association request linking `from_id` to `to_id`.
    fn associate_request(
        &self,
        from: ObjectType,
        from_id: &str,
        to: ObjectType,
        to_id: &str,
    ) -> Result<HttpRequest>;

    /// Pull the provider-assigned external id out of a create response.
    /// `None` or whitespace means the response is unusable.
    fn extract_id(&self, object: ObjectType, response: &Value) -> Option<String>;

    /// Whether resolved-but-empty values are dropped from payloads.
    /// Both shipped providers send empties; this exists because some
    /// providers require omission.
    fn omit_empty(&self) -> bool {
        false
    }

    /// Cheap authenticated call used by the "test connection" action.
    fn connection_probe(&self) -> HttpRequest;
}
