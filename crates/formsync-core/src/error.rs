//! Error types for FormSync.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required field or subfield was blank. Reported to the end user
    /// before any CRM dispatch happens.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network or HTTP-level failure talking to the provider.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Authentication failure (401-class status).
    #[error("Auth error: status {status}")]
    Auth { status: u16 },

    /// The provider answered, but not with the shape we expected.
    /// Carries the raw response body for the logs.
    #[error("Protocol error: {message}")]
    Protocol { message: String, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
