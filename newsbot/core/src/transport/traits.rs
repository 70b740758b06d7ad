//! Query Transport Traits
//!
//! The panel only needs "ask one question, get one answer or a failure".
//! Implementations deal with auth headers, wire format and status codes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::TokenError;

/// Body of a chat request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The question, trimmed
    pub prompt: String,
}

impl ChatRequest {
    /// Create a request from a raw draft
    pub fn new(prompt: impl AsRef<str>) -> Self {
        Self {
            prompt: prompt.as_ref().trim().to_string(),
        }
    }
}

/// Why an exchange failed
///
/// Only ever logged; the user sees the fallback message instead.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not obtain a session token
    #[error("Token acquisition failed: {0}")]
    Token(#[from] TokenError),

    /// Connect, timeout or body read failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with something other than 200
    #[error("Chat endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The body is not JSON or lacks a string `response` field
    #[error("Unexpected answer format: {0}")]
    Malformed(String),
}

/// Outcome of one exchange
#[derive(Debug)]
pub enum ChatResult {
    /// The endpoint answered
    Answered {
        /// Answer text
        text: String,
    },
    /// Any failure
    Failed {
        /// What went wrong
        reason: TransportError,
    },
}

impl ChatResult {
    /// Whether the endpoint answered
    #[must_use]
    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered { .. })
    }
}

impl From<Result<String, TransportError>> for ChatResult {
    fn from(result: Result<String, TransportError>) -> Self {
        match result {
            Ok(text) => Self::Answered { text },
            Err(reason) => Self::Failed { reason },
        }
    }
}

#[derive(Deserialize)]
struct ChatResponseBody {
    response: String,
}

/// Interpret a raw status + body pair from the chat endpoint
///
/// # Errors
///
/// [`TransportError::Status`] for anything but 200, [`TransportError::Malformed`]
/// when the body has no string `response` field.
pub fn parse_chat_response(status: u16, body: &str) -> Result<String, TransportError> {
    if status != 200 {
        return Err(TransportError::Status {
            status,
            body: body.to_string(),
        });
    }

    serde_json::from_str::<ChatResponseBody>(body)
        .map(|parsed| parsed.response)
        .map_err(|e| TransportError::Malformed(e.to_string()))
}

/// Sends chat requests
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &str;

    /// Send one request and wait for its outcome
    ///
    /// Never retries; never panics on bad input from the network.
    async fn send(&self, request: &ChatRequest) -> ChatResult;
}
