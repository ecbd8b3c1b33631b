//! Connection settings for a provider integration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the integration authenticates against the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Credentials {
    /// Static API key attached per provider convention (query or header).
    ApiKey {
        #[serde(rename = "apiKey")]
        api_key: String,
    },
    /// OAuth client; the actual tokens live in the host's token store.
    OAuth {
        #[serde(rename = "clientId")]
        client_id: String,
        #[serde(rename = "clientSecret")]
        client_secret: String,
    },
}

/// Long-lived connection configuration, owned by the integration's
/// persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub credentials: Credentials,
    /// Override for the provider's default base URL. Some providers hand
    /// out a per-account API domain after the OAuth handshake.
    #[serde(rename = "baseUrl", skip_serializing_if = "Option::is_none", default)]
    pub base_url: Option<String>,
    #[serde(rename = "timeoutSecs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ConnectionConfig {
    pub fn api_key(api_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::ApiKey {
                api_key: api_key.into(),
            },
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn oauth(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::OAuth {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
            },
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Validate the settings the way the original integrations validate
    /// on save: key providers need a key, OAuth providers need both
    /// client id and secret.
    pub fn validate(&self) -> Result<()> {
        match &self.credentials {
            Credentials::ApiKey { api_key } => {
                if api_key.trim().is_empty() {
                    return Err(Error::Config("apiKey cannot be blank".into()));
                }
            }
            Credentials::OAuth {
                client_id,
                client_secret,
            } => {
                if client_id.trim().is_empty() {
                    return Err(Error::Config("clientId cannot be blank".into()));
                }
                if client_secret.trim().is_empty() {
                    return Err(Error::Config("clientSecret cannot be blank".into()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_required() {
        assert!(ConnectionConfig::api_key("secret").validate().is_ok());
        assert!(ConnectionConfig::api_key("   ").validate().is_err());
    }

    #[test]
    fn test_oauth_requires_both() {
        assert!(ConnectionConfig::oauth("id", "secret").validate().is_ok());
        assert!(ConnectionConfig::oauth("", "secret").validate().is_err());
        assert!(ConnectionConfig::oauth("id", "").validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ConnectionConfig::oauth("id", "secret").with_base_url("https://example.com");
        let json = serde_json::to_string(&config).unwrap();
        let back: ConnectionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
