//! HTTP backend trait and implementations.
//!
//! The `HttpBackend` trait abstracts over request execution.
//! Implementations:
//! - `ReqwestBackend`: real HTTP via `reqwest` with a client-level timeout
//! - `MemoryBackend`: scripted responses and recorded requests, for tests
//!   and dry runs

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use formsync_core::{Error, Result};
use parking_lot::Mutex;
use serde_json::Value;

/// HTTP method subset the connectors use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// A request as the engine sees it: relative path, query, JSON body.
/// The transport resolves it against the provider base URL and attaches
/// auth before execution.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, param: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((param.into(), value.into()));
        self
    }
}

/// A decoded response: status plus JSON body (empty bodies decode to null).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

/// Trait for HTTP execution backends.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Execute a fully-resolved request against `url`. Transport-level
    /// failures (DNS, timeout, connect) come back as `Error::Transport`;
    /// any response, success or not, comes back as `Ok`.
    async fn execute(&self, url: &str, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Real backend over `reqwest`. One client per integration, timeout set
/// at construction; all calls inherit it.
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Backend honoring the connection's configured timeout.
    pub fn from_config(config: &formsync_core::ConnectionConfig) -> Result<Self> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn execute(&self, url: &str, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(HttpResponse { status, body })
    }
}

/// A request the `MemoryBackend` saw, with the resolved URL.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub request: HttpRequest,
}

/// In-memory backend: pops scripted responses in order and records every
/// request it sees. Plays the role a live server would in tests.
#[derive(Default)]
pub struct MemoryBackend {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful JSON response.
    pub fn push_json(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .push_back(Ok(HttpResponse { status, body }));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .push_back(Err(Error::Transport(message.into())));
    }

    /// Everything executed so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpBackend for MemoryBackend {
    async fn execute(&self, url: &str, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(RecordedRequest {
            url: url.to_string(),
            request: request.clone(),
        });

        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(Error::Transport(format!("no scripted response for {}", url)))
        })
    }
}
