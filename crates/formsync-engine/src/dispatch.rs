//! Payload dispatcher: the per-submission step sequence.
//!
//! One submission is one ordered pass over the provider's plan:
//! resolve payloads, send each enabled step, carry ids forward, abort at
//! the first unrecoverable step. Never retries.

use std::collections::BTreeMap;

use formsync_core::{
    DispatchResult, Error, ObjectPayload, ObjectType, Submission, SyncOutcome, SyncSettings,
};
use formsync_transport::Transport;
use serde_json::Value;
use tracing::{debug, error};

use crate::provider::{CrmProvider, StepIds, StepSpec};
use crate::resolve;

/// Pre/post send hooks. The before hook is the only cancellation point:
/// once it permits a step, the request runs to completion or failure.
pub trait DispatchHooks: Send + Sync {
    /// Return false to cancel the whole dispatch before this step sends.
    fn before_send(&self, submission: &Submission, step: &StepSpec, payload: &Value) -> bool {
        let _ = (submission, step, payload);
        true
    }

    /// Return false to classify the response as invalid, failing the step.
    fn after_send(
        &self,
        submission: &Submission,
        step: &StepSpec,
        payload: &Value,
        response: &Value,
    ) -> bool {
        let _ = (submission, step, payload, response);
        true
    }
}

/// Default hooks: permit everything.
pub struct AllowAll;

impl DispatchHooks for AllowAll {}

/// Runs one submission through a provider's dispatch plan.
pub struct Dispatcher<'a> {
    provider: &'a dyn CrmProvider,
    transport: &'a Transport,
    hooks: &'a dyn DispatchHooks,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        provider: &'a dyn CrmProvider,
        transport: &'a Transport,
        hooks: &'a dyn DispatchHooks,
    ) -> Self {
        Self {
            provider,
            transport,
            hooks,
        }
    }

    /// The provider plan narrowed to what the settings enable. A create
    /// step survives when its object is enabled and supported; an
    /// association survives only when both of its ends do.
    pub fn plan(&self, settings: &SyncSettings) -> Vec<StepSpec> {
        self.provider
            .steps()
            .into_iter()
            .filter(|step| match step {
                StepSpec::Create(object) => {
                    settings.enabled(*object) && self.provider.objects().contains(object)
                }
                StepSpec::Associate { from, to } => {
                    settings.enabled(*from) && settings.enabled(*to)
                }
            })
            .collect()
    }

    /// Execute the plan. Step failures land in the outcome rather than
    /// propagating; the first unrecoverable step aborts everything after
    /// it.
    pub async fn dispatch(
        &self,
        submission: &Submission,
        settings: &SyncSettings,
    ) -> SyncOutcome {
        let plan = self.plan(settings);
        let provider = self.provider.name();

        let mut payloads: BTreeMap<ObjectType, ObjectPayload> = BTreeMap::new();
        for step in &plan {
            if let StepSpec::Create(object) = step {
                if let Some(mapping) = settings.mapping(*object) {
                    payloads.insert(
                        *object,
                        resolve::resolve(submission, mapping, self.provider.omit_empty()),
                    );
                }
            }
        }

        let mut outcome = SyncOutcome {
            results: Vec::new(),
            success: true,
        };
        let mut ids = StepIds::default();

        for step in &plan {
            let request = match step {
                StepSpec::Create(object) => {
                    let payload = payloads.get(object).cloned().unwrap_or_default();
                    self.provider.create_request(*object, &payload, &ids)
                }
                StepSpec::Associate { from, to } => {
                    // Both ids must exist; with the enabled-filtered plan
                    // a missing id means an earlier abort got us here,
                    // which cannot happen, but stay defensive about order.
                    match (ids.get(*from), ids.get(*to)) {
                        (Some(from_id), Some(to_id)) => {
                            self.provider.associate_request(*from, from_id, *to, to_id)
                        }
                        _ => {
                            debug!(provider, "association skipped, prerequisite id missing");
                            continue;
                        }
                    }
                }
            };

            let request = match request {
                Ok(request) => request,
                Err(e) => {
                    error!(provider, "API error: {}", e);
                    outcome
                        .results
                        .push(DispatchResult::failed(step.object(), e.to_string()));
                    outcome.success = false;
                    return outcome;
                }
            };

            let body = request.body.clone().unwrap_or(Value::Null);

            if !self.hooks.before_send(submission, step, &body) {
                debug!(provider, object = %step.object(), "dispatch cancelled by before-send hook");
                outcome.results.push(DispatchResult::failed(
                    step.object(),
                    "cancelled by before-send hook",
                ));
                outcome.success = false;
                return outcome;
            }

            let response = match self.transport.send(&request).await {
                Ok(response) => response,
                Err(e) => {
                    // Mid-dispatch auth failures are plain transport
                    // failures here; refresh-and-retry lives in the
                    // connection check only.
                    error!(provider, object = %step.object(), "API error: {}", e);
                    outcome
                        .results
                        .push(DispatchResult::failed(step.object(), e.to_string()));
                    outcome.success = false;
                    return outcome;
                }
            };

            if !self.hooks.after_send(submission, step, &body, &response) {
                error!(provider, object = %step.object(), "response rejected by after-send hook");
                outcome.results.push(DispatchResult::failed(
                    step.object(),
                    "rejected by after-send hook",
                ));
                outcome.success = false;
                return outcome;
            }

            match step {
                StepSpec::Create(object) => {
                    let id = self
                        .provider
                        .extract_id(*object, &response)
                        .filter(|id| !id.trim().is_empty());

                    match id {
                        Some(id) => {
                            ids.insert(*object, id.clone());
                            outcome
                                .results
                                .push(DispatchResult::ok(*object, Some(id)));
                        }
                        None => {
                            let raw = Error::Protocol {
                                message: format!("Missing return \"{}Id\"", object),
                                body: response.to_string(),
                            };
                            error!(provider, "{} {}", raw, response);
                            outcome
                                .results
                                .push(DispatchResult::failed(*object, raw.to_string()));
                            outcome.success = false;
                            return outcome;
                        }
                    }
                }
                StepSpec::Associate { to, .. } => {
                    outcome.results.push(DispatchResult::ok(*to, None));
                }
            }
        }

        outcome
    }
}
