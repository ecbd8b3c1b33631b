//! Authenticated transport over a provider base URL.

use std::sync::Arc;

use formsync_core::{Error, Result};
use serde_json::Value;
use tracing::debug;

use crate::backend::{HttpBackend, HttpRequest, HttpResponse};
use crate::token::TokenCache;

/// How requests get authenticated, per provider convention.
#[derive(Clone)]
pub enum AuthScheme {
    /// API key as a query parameter on every call.
    ApiKeyQuery { param: &'static str, key: String },
    /// API key in a request header.
    ApiKeyHeader { header: &'static str, key: String },
    /// OAuth bearer token resolved from the cache per request.
    OAuthBearer(Arc<TokenCache>),
}

impl AuthScheme {
    /// The token cache, when this scheme carries one.
    pub fn token_cache(&self) -> Option<&Arc<TokenCache>> {
        match self {
            AuthScheme::OAuthBearer(cache) => Some(cache),
            _ => None,
        }
    }
}

/// An authenticated client for one provider integration. Cheap to clone;
/// the backend and token cache are shared.
#[derive(Clone)]
pub struct Transport {
    backend: Arc<dyn HttpBackend>,
    base_url: String,
    auth: AuthScheme,
}

impl Transport {
    pub fn new(backend: Arc<dyn HttpBackend>, base_url: impl Into<String>, auth: AuthScheme) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            backend,
            base_url,
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthScheme {
        &self.auth
    }

    /// Send a request and decode its JSON body.
    ///
    /// 401 comes back as `Error::Auth`; any other non-2xx status as
    /// `Error::Transport` carrying the status and body text. Callers
    /// decide whether an auth failure triggers a token refresh; this
    /// method never retries on its own.
    pub async fn send(&self, request: &HttpRequest) -> Result<Value> {
        let mut request = request.clone();

        match &self.auth {
            AuthScheme::ApiKeyQuery { param, key } => {
                request.query.push((param.to_string(), key.clone()));
            }
            AuthScheme::ApiKeyHeader { header, key } => {
                request.headers.push((header.to_string(), key.clone()));
            }
            AuthScheme::OAuthBearer(cache) => {
                let token = cache.current().await?;
                request.headers.push((
                    "Authorization".to_string(),
                    format!("Bearer {}", token.access_token),
                ));
                request
                    .headers
                    .push(("Content-Type".to_string(), "application/json".to_string()));
            }
        }

        let url = format!("{}/{}", self.base_url, request.path.trim_matches('/'));
        debug!("{} {}", request.method.as_str(), url);

        let HttpResponse { status, body } = self.backend.execute(&url, &request).await?;

        if status == 401 {
            return Err(Error::Auth { status });
        }
        if !(200..300).contains(&status) {
            return Err(Error::Transport(format!(
                "API error {}: {}",
                status, body
            )));
        }

        Ok(body)
    }
}
