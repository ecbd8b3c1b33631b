//! Connector façade: the three operations the host calls.
//!
//! Everything here is catch-all: failures are logged with the provider
//! name and surface as `false` or an empty result, never as an error the
//! host has to handle.

use std::collections::HashMap;
use std::sync::Arc;

use formsync_core::{Error, FieldDescriptor, ObjectType, Submission, SyncOutcome, SyncSettings};
use formsync_transport::Transport;
use tracing::{error, info};

use crate::dispatch::{AllowAll, DispatchHooks, Dispatcher};
use crate::provider::CrmProvider;

/// One configured provider integration for one form.
pub struct Connector {
    provider: Arc<dyn CrmProvider>,
    transport: Transport,
    hooks: Arc<dyn DispatchHooks>,
    settings: SyncSettings,
}

impl Connector {
    pub fn new(provider: Arc<dyn CrmProvider>, transport: Transport, settings: SyncSettings) -> Self {
        Self {
            provider,
            transport,
            hooks: Arc::new(AllowAll),
            settings,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Normalized schema for one object type. Never fails: a fetch error
    /// is logged once and yields an empty list, which callers must read
    /// as "fetch failed, retry later", not "provider has no fields".
    pub async fn fetch_schema(&self, object: ObjectType) -> Vec<FieldDescriptor> {
        match self.provider.fetch_schema(&self.transport, object).await {
            Ok(fields) => fields,
            Err(e) => {
                error!(
                    provider = self.provider.name(),
                    object = %object,
                    "API error: {}", e
                );
                Vec::new()
            }
        }
    }

    /// Admin-time schema fetch across all supported object types. One
    /// failure empties the whole result, matching the all-or-nothing
    /// settings fetch of the original integrations.
    pub async fn fetch_form_settings(&self) -> HashMap<ObjectType, Vec<FieldDescriptor>> {
        match self.fetch_all_schemas().await {
            Ok(settings) => settings,
            Err(e) => {
                error!(provider = self.provider.name(), "API error: {}", e);
                HashMap::new()
            }
        }
    }

    async fn fetch_all_schemas(&self) -> formsync_core::Result<HashMap<ObjectType, Vec<FieldDescriptor>>> {
        let mut settings = HashMap::new();
        for object in self.provider.objects() {
            let fields = self.provider.fetch_schema(&self.transport, *object).await?;
            settings.insert(*object, fields);
        }
        Ok(settings)
    }

    /// Submission-time sync. Runs the full dispatch sequence; `false`
    /// means the sync failed (the host still stores the submission, and
    /// end users never see this failure).
    pub async fn send_payload(&self, submission: &Submission) -> bool {
        self.dispatch(submission).await.success
    }

    /// Like `send_payload` but with the per-step results, for hosts that
    /// record sync attempts.
    pub async fn dispatch(&self, submission: &Submission) -> SyncOutcome {
        let dispatcher = Dispatcher::new(self.provider.as_ref(), &self.transport, self.hooks.as_ref());
        let outcome = dispatcher.dispatch(submission, &self.settings).await;

        if outcome.success {
            info!(
                provider = self.provider.name(),
                steps = outcome.results.len(),
                "submission synced"
            );
        }
        outcome
    }

    /// "Test connection" admin action. On an auth failure from an OAuth
    /// provider, forces one token refresh and retries the probe once.
    /// This is the only place refresh-and-retry is wired in; dispatch
    /// treats auth failures like any other transport failure.
    pub async fn fetch_connection(&self) -> bool {
        let probe = self.provider.connection_probe();

        match self.transport.send(&probe).await {
            Ok(_) => true,
            Err(Error::Auth { status }) => {
                let Some(cache) = self.transport.auth().token_cache() else {
                    error!(
                        provider = self.provider.name(),
                        "API error: auth failed with status {}", status
                    );
                    return false;
                };

                let refreshed = async {
                    let stale = cache.current().await?;
                    cache.refresh(&stale).await
                }
                .await;

                if let Err(e) = refreshed {
                    error!(provider = self.provider.name(), "API error: {}", e);
                    return false;
                }

                match self.transport.send(&probe).await {
                    Ok(_) => true,
                    Err(e) => {
                        error!(provider = self.provider.name(), "API error: {}", e);
                        false
                    }
                }
            }
            Err(e) => {
                error!(provider = self.provider.name(), "API error: {}", e);
                false
            }
        }
    }
}
