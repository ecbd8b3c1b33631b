//! Zoho CRM provider adapter.
//!
//! OAuth bearer auth against a per-account API domain. Contacts and
//! accounts go through upsert endpoints with duplicate-check fields;
//! deals and leads are plain inserts; a successful contact and deal pair
//! gets linked with an explicit association call.

pub mod fields;

use std::sync::Arc;

use async_trait::async_trait;
use formsync_core::{
    ConnectionConfig, Credentials, Error, FieldDescriptor, ObjectPayload, ObjectType, Result,
    SyncSettings,
};
use formsync_engine::{Connector, CrmProvider, StepIds, StepSpec};
use formsync_transport::{AuthScheme, HttpBackend, HttpRequest, TokenCache, TokenStore, Transport};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_API_DOMAIN: &str = "https://www.zohoapis.com";
pub const AUTHORIZE_URL: &str = "https://accounts.zoho.com/oauth/v2/auth";
pub const DEFAULT_ACCOUNTS_SERVER: &str = "https://accounts.zoho.com";
pub const OAUTH_SCOPES: &[&str] = &["ZohoCRM.modules.ALL", "ZohoCRM.settings.ALL"];

/// The association role id the original integration sends. Account
/// specific, so overridable per settings.
pub const DEFAULT_CONTACT_ROLE: &str = "4201883000000006871";

/// Per-account Zoho settings captured during the OAuth handshake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZohoSettings {
    /// API domain Zoho reports with the access token.
    #[serde(rename = "apiDomain", skip_serializing_if = "Option::is_none", default)]
    pub api_domain: Option<String>,
    /// Accounts server handed back on the OAuth redirect.
    #[serde(
        rename = "accountsServer",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub accounts_server: Option<String>,
    /// Contact role used when linking a contact to a deal.
    #[serde(
        rename = "contactRole",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub contact_role: Option<String>,
}

impl ZohoSettings {
    /// Token endpoint on the account's accounts server.
    pub fn access_token_url(&self) -> String {
        let server = self
            .accounts_server
            .as_deref()
            .unwrap_or(DEFAULT_ACCOUNTS_SERVER)
            .trim_end_matches('/');
        format!("{}/oauth/v2/token", server)
    }

    /// Extra authorization parameters for the OAuth redirect.
    pub fn authorization_options() -> &'static [(&'static str, &'static str)] {
        &[("access_type", "offline")]
    }

    fn base_url(&self) -> String {
        let domain = self
            .api_domain
            .as_deref()
            .unwrap_or(DEFAULT_API_DOMAIN)
            .trim_end_matches('/');
        format!("{}/crm/v2", domain)
    }
}

/// The Zoho provider capability set.
pub struct Zoho {
    settings: ZohoSettings,
}

impl Zoho {
    pub fn new(settings: ZohoSettings) -> Self {
        Self { settings }
    }

    fn contact_role(&self) -> &str {
        self.settings
            .contact_role
            .as_deref()
            .unwrap_or(DEFAULT_CONTACT_ROLE)
    }

    /// Build the bearer-authenticated transport for a Zoho integration.
    pub fn transport(
        config: &ConnectionConfig,
        settings: &ZohoSettings,
        backend: Arc<dyn HttpBackend>,
        token_store: Arc<dyn TokenStore>,
    ) -> Result<Transport> {
        config.validate()?;
        if !matches!(config.credentials, Credentials::OAuth { .. }) {
            return Err(Error::Config("Zoho authenticates with OAuth".into()));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| settings.base_url());
        let cache = Arc::new(TokenCache::new(token_store));
        Ok(Transport::new(
            backend,
            base_url,
            AuthScheme::OAuthBearer(cache),
        ))
    }

    /// Ready-to-use connector for one form's sync settings.
    pub fn connector(
        config: &ConnectionConfig,
        settings: ZohoSettings,
        backend: Arc<dyn HttpBackend>,
        token_store: Arc<dyn TokenStore>,
        sync: SyncSettings,
    ) -> Result<Connector> {
        let transport = Self::transport(config, &settings, backend, token_store)?;
        Ok(Connector::new(Arc::new(Zoho::new(settings)), transport, sync))
    }

    fn module(object: ObjectType) -> Result<&'static str> {
        match object {
            ObjectType::Contact => Ok("Contacts"),
            ObjectType::Deal => Ok("Deals"),
            ObjectType::Lead => Ok("Leads"),
            ObjectType::Account => Ok("Accounts"),
            other => Err(Error::Config(format!(
                "Zoho does not support mapping to {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl CrmProvider for Zoho {
    fn name(&self) -> &'static str {
        "Zoho"
    }

    fn objects(&self) -> &[ObjectType] {
        &[
            ObjectType::Contact,
            ObjectType::Deal,
            ObjectType::Lead,
            ObjectType::Account,
        ]
    }

    fn steps(&self) -> Vec<StepSpec> {
        vec![
            StepSpec::Create(ObjectType::Contact),
            StepSpec::Create(ObjectType::Account),
            StepSpec::Create(ObjectType::Deal),
            StepSpec::Associate {
                from: ObjectType::Contact,
                to: ObjectType::Deal,
            },
            StepSpec::Create(ObjectType::Lead),
        ]
    }

    async fn fetch_schema(
        &self,
        transport: &Transport,
        object: ObjectType,
    ) -> Result<Vec<FieldDescriptor>> {
        let module = Self::module(object)?;
        let response = transport
            .send(&HttpRequest::get("settings/fields").with_query("module", module))
            .await?;
        Ok(fields::parse_fields(&response["fields"]))
    }

    fn create_request(
        &self,
        object: ObjectType,
        payload: &ObjectPayload,
        _ids: &StepIds,
    ) -> Result<HttpRequest> {
        let record = payload.to_object();
        match object {
            ObjectType::Contact => Ok(HttpRequest::post(
                "Contacts/upsert",
                json!({"data": [record], "duplicate_check_fields": ["Email"]}),
            )),
            ObjectType::Account => Ok(HttpRequest::post(
                "Accounts/upsert",
                json!({"data": [record], "duplicate_check_fields": ["Account_Name"]}),
            )),
            ObjectType::Deal => Ok(HttpRequest::post("Deals", json!({"data": [record]}))),
            ObjectType::Lead => Ok(HttpRequest::post("Leads", json!({"data": [record]}))),
            other => Err(Error::Config(format!(
                "Zoho does not dispatch {} payloads",
                other
            ))),
        }
    }

    fn associate_request(
        &self,
        from: ObjectType,
        from_id: &str,
        to: ObjectType,
        to_id: &str,
    ) -> Result<HttpRequest> {
        if from != ObjectType::Contact || to != ObjectType::Deal {
            return Err(Error::Config(format!(
                "Zoho has no association call for {} -> {}",
                from, to
            )));
        }

        Ok(HttpRequest::put(
            format!("Contacts/{}/Deals/{}", from_id, to_id),
            json!({"data": [{"Contact_Role": self.contact_role()}]}),
        ))
    }

    fn extract_id(&self, _object: ObjectType, response: &Value) -> Option<String> {
        match &response["data"][0]["details"]["id"] {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    fn connection_probe(&self) -> HttpRequest {
        HttpRequest::get("Deals")
    }
}
