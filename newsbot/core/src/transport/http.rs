//! HTTP Query Transport
//!
//! POSTs `{"prompt": ...}` to the configured chat route with the session
//! token in the `Authorization` header, and expects `200` with
//! `{"response": "..."}` back.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use super::traits::{parse_chat_response, ChatRequest, ChatResult, QueryTransport, TransportError};
use crate::auth::SessionTokenProvider;
use crate::config::EndpointConfig;

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpQueryTransport {
    endpoint: EndpointConfig,
    tokens: Arc<dyn SessionTokenProvider>,
    http_client: reqwest::Client,
}

impl HttpQueryTransport {
    /// Create a transport for an endpoint
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built (e.g. no TLS backend).
    pub fn new(
        endpoint: EndpointConfig,
        tokens: Arc<dyn SessionTokenProvider>,
    ) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()?;

        Ok(Self {
            endpoint,
            tokens,
            http_client,
        })
    }

    /// The endpoint this transport talks to
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    async fn try_send(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let token = self.tokens.token().await?;

        let response = self
            .http_client
            .post(self.endpoint.url())
            .header(AUTHORIZATION, self.endpoint.authorization(&token))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::debug!(
                status = status.as_u16(),
                body = %body,
                "Chat endpoint rejected request"
            );
        }

        parse_chat_response(status.as_u16(), &body)
    }
}

#[async_trait]
impl QueryTransport for HttpQueryTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, request: &ChatRequest) -> ChatResult {
        let start = Instant::now();
        let result = self.try_send(request).await;

        tracing::debug!(
            url = %self.endpoint.url(),
            ok = result.is_ok(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat request finished"
        );

        result.into()
    }
}
