//! OAuth token store seam and single-flight refresh cache.
//!
//! The host owns token persistence and the actual OAuth exchange; we only
//! ask it for tokens and, on auth failure, for a forced refresh. The
//! cache guarantees that concurrent refreshes collapse into one upstream
//! call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use formsync_core::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An OAuth access token as handed out by the host's token store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expiry: None,
        }
    }
}

/// External collaborator: the host's token persistence/refresh service.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token for this integration.
    async fn get_token(&self) -> Result<Token>;

    /// Exchange the refresh token for a new access token. `force` skips
    /// any expiry check the store might do.
    async fn refresh_token(&self, token: &Token, force: bool) -> Result<Token>;
}

struct CacheState {
    token: Option<Token>,
}

/// Caches the current token and serializes refreshes.
///
/// `refresh` is single-flight: callers that lose the race to the lock
/// find the token already replaced and reuse it instead of issuing a
/// second upstream refresh. A refreshed token is therefore never
/// clobbered by a concurrent stale refresh.
pub struct TokenCache {
    store: Arc<dyn TokenStore>,
    state: tokio::sync::Mutex<CacheState>,
}

impl TokenCache {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            state: tokio::sync::Mutex::new(CacheState { token: None }),
        }
    }

    /// Current token, loading it from the store on first use.
    pub async fn current(&self) -> Result<Token> {
        let mut state = self.state.lock().await;
        if let Some(token) = &state.token {
            return Ok(token.clone());
        }
        let token = self.store.get_token().await?;
        state.token = Some(token.clone());
        Ok(token)
    }

    /// Force a refresh of `stale`. If another caller already replaced it,
    /// return the replacement without hitting the store again.
    pub async fn refresh(&self, stale: &Token) -> Result<Token> {
        let mut state = self.state.lock().await;

        if let Some(current) = &state.token {
            if current.access_token != stale.access_token {
                debug!("token already refreshed by a concurrent caller, reusing");
                return Ok(current.clone());
            }
        }

        let fresh = self.store.refresh_token(stale, true).await?;
        state.token = Some(fresh.clone());
        Ok(fresh)
    }
}
