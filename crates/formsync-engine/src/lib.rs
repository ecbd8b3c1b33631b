//! CRM sync engine: one fixed core, parameterized per provider.
//!
//! The engine owns mapping resolution and the dispatch state machine;
//! a `CrmProvider` implementation supplies the capability set (schema
//! fetch, endpoint construction, id extraction, auth convention). The
//! `Connector` façade exposes the three host-facing operations:
//! `fetch_form_settings`, `send_payload`, `fetch_connection`.

pub mod connector;
pub mod dispatch;
pub mod provider;
pub mod resolve;

pub use connector::Connector;
pub use dispatch::{AllowAll, DispatchHooks, Dispatcher};
pub use provider::{CrmProvider, StepIds, StepSpec};
pub use resolve::{render_reference, resolve};
