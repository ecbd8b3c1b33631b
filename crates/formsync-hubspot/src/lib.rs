//! HubSpot CRM provider adapter.
//!
//! API-key auth (`hapikey` query parameter), contact and deal dispatch.
//! The contact ride is a v1 createOrUpdate keyed by email; the deal
//! carries the contact association inside its own payload, so there is
//! no separate association step. Company fields are fetched for the
//! mapping UI but HubSpot submissions never dispatch a company payload.

pub mod fields;

use std::sync::Arc;

use async_trait::async_trait;
use formsync_core::{
    ConnectionConfig, Credentials, Error, FieldDescriptor, FieldOption, FieldOptions,
    ObjectPayload, ObjectType, Result, SyncSettings,
};
use formsync_engine::{Connector, CrmProvider, StepIds, StepSpec};
use formsync_transport::{AuthScheme, HttpBackend, HttpRequest, Transport};
use serde_json::{json, Value};

pub const BASE_URL: &str = "https://api.hubapi.com";

/// The HubSpot provider capability set.
pub struct HubSpot;

impl HubSpot {
    /// Build the authenticated transport for a HubSpot integration.
    pub fn transport(config: &ConnectionConfig, backend: Arc<dyn HttpBackend>) -> Result<Transport> {
        config.validate()?;
        let Credentials::ApiKey { api_key } = &config.credentials else {
            return Err(Error::Config(
                "HubSpot authenticates with an API key".into(),
            ));
        };

        let base_url = config.base_url.as_deref().unwrap_or(BASE_URL);
        Ok(Transport::new(
            backend,
            base_url,
            AuthScheme::ApiKeyQuery {
                param: "hapikey",
                key: api_key.clone(),
            },
        ))
    }

    /// Ready-to-use connector for one form's sync settings.
    pub fn connector(
        config: &ConnectionConfig,
        backend: Arc<dyn HttpBackend>,
        settings: SyncSettings,
    ) -> Result<Connector> {
        let transport = Self::transport(config, backend)?;
        Ok(Connector::new(Arc::new(HubSpot), transport, settings))
    }

    async fn fetch_deal_fields(&self, transport: &Transport) -> Result<Vec<FieldDescriptor>> {
        // Pipelines and stages feed the two built-in picklist fields.
        let response = transport
            .send(&HttpRequest::get("crm/v3/pipelines/deals"))
            .await?;
        let pipelines = response["results"].as_array().cloned().unwrap_or_default();

        let mut pipeline_options = Vec::new();
        let mut stage_options = Vec::new();
        for pipeline in &pipelines {
            let label = pipeline["label"].as_str().unwrap_or_default();
            pipeline_options.push(FieldOption {
                label: label.to_string(),
                value: id_string(&pipeline["id"]).unwrap_or_default(),
            });

            for stage in pipeline["stages"].as_array().into_iter().flatten() {
                stage_options.push(FieldOption {
                    label: format!("{}: {}", label, stage["label"].as_str().unwrap_or_default()),
                    value: id_string(&stage["id"]).unwrap_or_default(),
                });
            }
        }

        let response = transport
            .send(&HttpRequest::get("crm/v3/properties/deals"))
            .await?;

        let mut deal_fields = vec![
            FieldDescriptor::new("dealname", "Deal Name").required(),
            FieldDescriptor::new("pipeline", "Deal Pipeline")
                .required()
                .with_options(FieldOptions {
                    label: "Pipelines".into(),
                    options: pipeline_options,
                }),
            FieldDescriptor::new("dealstage", "Deal Stage")
                .required()
                .with_options(FieldOptions {
                    label: "Stages".into(),
                    options: stage_options,
                }),
        ];
        deal_fields.extend(fields::parse_custom_fields(
            &response["results"],
            &["dealname", "pipeline", "dealstage"],
        ));
        Ok(deal_fields)
    }
}

#[async_trait]
impl CrmProvider for HubSpot {
    fn name(&self) -> &'static str {
        "HubSpot"
    }

    fn objects(&self) -> &[ObjectType] {
        &[ObjectType::Contact, ObjectType::Deal, ObjectType::Company]
    }

    fn steps(&self) -> Vec<StepSpec> {
        // No associate step: the deal payload embeds the contact id.
        vec![
            StepSpec::Create(ObjectType::Contact),
            StepSpec::Create(ObjectType::Deal),
        ]
    }

    async fn fetch_schema(
        &self,
        transport: &Transport,
        object: ObjectType,
    ) -> Result<Vec<FieldDescriptor>> {
        match object {
            ObjectType::Contact => {
                let response = transport
                    .send(&HttpRequest::get("crm/v3/properties/contacts"))
                    .await?;
                let mut contact_fields = vec![FieldDescriptor::new("email", "Email").required()];
                contact_fields.extend(fields::parse_custom_fields(&response["results"], &["email"]));
                Ok(contact_fields)
            }
            ObjectType::Company => {
                let response = transport
                    .send(&HttpRequest::get("crm/v3/properties/companies"))
                    .await?;
                let mut company_fields = vec![FieldDescriptor::new("name", "Name").required()];
                company_fields.extend(fields::parse_custom_fields(&response["results"], &["name"]));
                Ok(company_fields)
            }
            ObjectType::Deal => self.fetch_deal_fields(transport).await,
            other => Err(Error::Config(format!(
                "HubSpot does not support mapping to {}",
                other
            ))),
        }
    }

    fn create_request(
        &self,
        object: ObjectType,
        payload: &ObjectPayload,
        ids: &StepIds,
    ) -> Result<HttpRequest> {
        match object {
            ObjectType::Contact => {
                let email = payload
                    .get_str("email")
                    .filter(|e| !e.trim().is_empty())
                    .ok_or_else(|| {
                        Error::Validation("contact mapping must include \"email\"".into())
                    })?;

                // v1 API wants properties as an ordered list of pairs.
                let properties: Vec<Value> = payload
                    .iter()
                    .map(|(k, v)| json!({"property": k, "value": v}))
                    .collect();

                Ok(HttpRequest::post(
                    format!("contacts/v1/contact/createOrUpdate/email/{}", email),
                    json!({"properties": properties}),
                ))
            }
            ObjectType::Deal => {
                let mut body = serde_json::Map::new();
                if let Some(contact_id) = ids.get(ObjectType::Contact) {
                    body.insert(
                        "associations".into(),
                        json!({"associatedVids": [id_value(contact_id)]}),
                    );
                }

                let properties: Vec<Value> = payload
                    .iter()
                    .map(|(k, v)| json!({"name": k, "value": v}))
                    .collect();
                body.insert("properties".into(), Value::Array(properties));

                Ok(HttpRequest::post("deals/v1/deal", Value::Object(body)))
            }
            other => Err(Error::Config(format!(
                "HubSpot does not dispatch {} payloads",
                other
            ))),
        }
    }

    fn associate_request(
        &self,
        from: ObjectType,
        _from_id: &str,
        to: ObjectType,
        _to_id: &str,
    ) -> Result<HttpRequest> {
        Err(Error::Config(format!(
            "HubSpot has no association call for {} -> {}",
            from, to
        )))
    }

    fn extract_id(&self, object: ObjectType, response: &Value) -> Option<String> {
        match object {
            ObjectType::Contact => id_string(&response["vid"]),
            ObjectType::Deal => id_string(&response["dealId"]),
            _ => None,
        }
    }

    fn connection_probe(&self) -> HttpRequest {
        HttpRequest::get("crm/v3/properties/contacts")
    }
}

/// HubSpot ids come back numeric on v1 endpoints; normalize to string.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// When a stored id parses as a number, send it back as one.
fn id_value(id: &str) -> Value {
    id.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formsync_core::{FieldMapping, FieldType, Submission};
    use formsync_transport::MemoryBackend;

    fn connector(backend: Arc<MemoryBackend>, settings: SyncSettings) -> Connector {
        HubSpot::connector(&ConnectionConfig::api_key("key-1"), backend, settings).unwrap()
    }

    fn contact_deal_settings() -> SyncSettings {
        SyncSettings::default()
            .map_to(
                ObjectType::Contact,
                FieldMapping::new(vec![("email", "{emailField}"), ("firstname", "{first}")]),
            )
            .map_to(
                ObjectType::Deal,
                FieldMapping::new(vec![("dealname", "Website Lead")]),
            )
    }

    fn submission() -> Submission {
        Submission::new()
            .with_value("emailField", "jane@example.com")
            .with_value("first", "Jane")
    }

    #[test]
    fn test_transport_requires_api_key() {
        let backend: Arc<dyn HttpBackend> = Arc::new(MemoryBackend::new());
        let oauth = ConnectionConfig::oauth("id", "secret");
        assert!(HubSpot::transport(&oauth, backend).is_err());
    }

    #[tokio::test]
    async fn test_contact_payload_shape() {
        let backend = Arc::new(MemoryBackend::new());
        backend.push_json(200, json!({"vid": 512}));
        backend.push_json(200, json!({"dealId": 9001}));

        let connector = connector(backend.clone(), contact_deal_settings());
        assert!(connector.send_payload(&submission()).await);

        let requests = backend.requests();
        assert_eq!(
            requests[0].request.path,
            "contacts/v1/contact/createOrUpdate/email/jane@example.com"
        );
        // Ordered {property, value} pairs, empties included.
        assert_eq!(
            requests[0].request.body,
            Some(json!({"properties": [
                {"property": "email", "value": "jane@example.com"},
                {"property": "firstname", "value": "Jane"},
            ]}))
        );
        // API key rides as a query parameter.
        assert!(requests[0]
            .request
            .query
            .contains(&("hapikey".to_string(), "key-1".to_string())));
    }

    #[tokio::test]
    async fn test_deal_embeds_contact_association() {
        let backend = Arc::new(MemoryBackend::new());
        backend.push_json(200, json!({"vid": 512}));
        backend.push_json(200, json!({"dealId": 9001}));

        let connector = connector(backend.clone(), contact_deal_settings());
        let outcome = connector.dispatch(&submission()).await;
        assert!(outcome.success);
        assert_eq!(outcome.external_id(ObjectType::Contact), Some("512"));
        assert_eq!(outcome.external_id(ObjectType::Deal), Some("9001"));

        let deal = &backend.requests()[1].request;
        assert_eq!(deal.path, "deals/v1/deal");
        assert_eq!(
            deal.body,
            Some(json!({
                "associations": {"associatedVids": [512]},
                "properties": [{"name": "dealname", "value": "Website Lead"}],
            }))
        );
    }

    #[tokio::test]
    async fn test_deal_without_contact_has_no_association() {
        let backend = Arc::new(MemoryBackend::new());
        backend.push_json(200, json!({"dealId": 9001}));

        let settings = SyncSettings::default().map_to(
            ObjectType::Deal,
            FieldMapping::new(vec![("dealname", "Standalone")]),
        );
        let connector = connector(backend.clone(), settings);
        assert!(connector.send_payload(&submission()).await);

        let body = backend.requests()[0].request.body.clone().unwrap();
        assert!(body.get("associations").is_none());
    }

    #[tokio::test]
    async fn test_missing_vid_aborts() {
        let backend = Arc::new(MemoryBackend::new());
        backend.push_json(200, json!({"status": "ok"}));

        let connector = connector(backend.clone(), contact_deal_settings());
        assert!(!connector.send_payload(&submission()).await);
        // Deal call never issued.
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_unmapped_email_fails_contact_step() {
        let backend = Arc::new(MemoryBackend::new());
        let settings = SyncSettings::default().map_to(
            ObjectType::Contact,
            FieldMapping::new(vec![("firstname", "{first}")]),
        );
        let connector = connector(backend.clone(), settings);

        assert!(!connector.send_payload(&submission()).await);
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_deal_schema_builds_picklists() {
        let backend = Arc::new(MemoryBackend::new());
        backend.push_json(
            200,
            json!({"results": [{
                "id": "default",
                "label": "Sales",
                "stages": [
                    {"id": "new", "label": "New"},
                    {"id": "won", "label": "Won"},
                ],
            }]}),
        );
        backend.push_json(200, json!({"results": []}));

        let connector = connector(backend, SyncSettings::default());
        let fields = connector.fetch_schema(ObjectType::Deal).await;

        assert_eq!(fields[0].handle, "dealname");
        assert!(fields[0].required);

        let pipeline = &fields[1];
        assert_eq!(pipeline.field_type, FieldType::Enumeration);
        let options = pipeline.options.as_ref().unwrap();
        assert_eq!(options.label, "Pipelines");
        assert_eq!(options.options[0].value, "default");

        let stages = fields[2].options.as_ref().unwrap();
        // Stage labels carry their pipeline prefix.
        assert_eq!(stages.options[1].label, "Sales: Won");
        assert_eq!(stages.options[1].value, "won");
    }

    #[tokio::test]
    async fn test_contact_schema_prepends_email() {
        let backend = Arc::new(MemoryBackend::new());
        backend.push_json(
            200,
            json!({"results": [
                {
                    "name": "email",
                    "label": "Email",
                    "type": "string",
                    "hidden": false,
                    "calculated": false,
                    "modificationMetadata": {"readOnlyValue": false},
                },
                {
                    "name": "firstname",
                    "label": "First Name",
                    "type": "string",
                    "hidden": false,
                    "calculated": false,
                    "modificationMetadata": {"readOnlyValue": false},
                },
            ]}),
        );

        let connector = connector(backend, SyncSettings::default());
        let fields = connector.fetch_schema(ObjectType::Contact).await;

        // Built-in email first and deduplicated from the custom list.
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].handle, "email");
        assert!(fields[0].required);
        assert_eq!(fields[1].handle, "firstname");
    }

    #[tokio::test]
    async fn test_schema_failure_is_empty_list() {
        let backend = Arc::new(MemoryBackend::new());
        backend.push_error("timeout");

        let connector = connector(backend, SyncSettings::default());
        let fields = connector.fetch_schema(ObjectType::Contact).await;
        assert!(fields.is_empty());
    }
}
