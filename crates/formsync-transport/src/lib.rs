//! Authenticated HTTP transport for CRM providers.
//!
//! Splits into three seams: the `HttpBackend` execution trait (real
//! `reqwest` client or in-memory fake), the `Transport` that resolves
//! paths against a base URL and attaches auth, and the `TokenStore` /
//! `TokenCache` pair for OAuth providers with single-flight refresh.

pub mod backend;
pub mod token;
pub mod transport;

pub use backend::{
    HttpBackend, HttpRequest, HttpResponse, MemoryBackend, Method, RecordedRequest, ReqwestBackend,
};
pub use token::{Token, TokenCache, TokenStore};
pub use transport::{AuthScheme, Transport};
