use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// Longest slice of an upstream error body kept in error messages
const MAX_BODY_IN_ERROR: usize = 512;

/// Errors that can occur when talking to the flight data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication with provider failed: {0}")]
    UpstreamAuth(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned {status}: {}", truncate(.body))]
    Api { status: StatusCode, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Failure of a token request awaited by several callers at once
    #[error("{0}")]
    Shared(Arc<ProviderError>),
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ProviderError::Request(e) => e.is_timeout(),
            ProviderError::Shared(inner) => inner.is_timeout(),
            _ => false,
        }
    }
}

fn truncate(body: &str) -> &str {
    if body.len() <= MAX_BODY_IN_ERROR {
        return body;
    }
    let mut end = MAX_BODY_IN_ERROR;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
