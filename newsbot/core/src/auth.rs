//! Session Token Providers
//!
//! The chat endpoint sits behind an authorizer, so every request carries a
//! token obtained from the site's authentication session. Token issuance is
//! owned elsewhere; the panel only asks for the current token right before
//! each request through [`SessionTokenProvider`].

use async_trait::async_trait;
use thiserror::Error;

/// Failure to obtain a session token
#[derive(Debug, Error)]
pub enum TokenError {
    /// No signed-in session, or the session carries no token
    #[error("No session token available")]
    Unavailable,

    /// The provider is reachable but refused or failed
    #[error("Token provider failed: {0}")]
    Provider(String),
}

/// Supplies the current authentication token on demand
///
/// May suspend (e.g. while refreshing) and may fail; a failure is reported
/// to the panel as a failed exchange.
#[async_trait]
pub trait SessionTokenProvider: Send + Sync {
    /// Get the current token
    async fn token(&self) -> Result<String, TokenError>;
}

/// Always returns the same token
#[derive(Clone, Debug)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Create a provider for a fixed token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl SessionTokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String, TokenError> {
        if self.token.is_empty() {
            return Err(TokenError::Unavailable);
        }
        Ok(self.token.clone())
    }
}

/// Reads the token from an environment variable on every request
///
/// Lets an external process rotate the token without restarting the surface.
#[derive(Clone, Debug)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    /// Default variable name
    pub const DEFAULT_VAR: &'static str = "NEWSBOT_TOKEN";

    /// Read from a specific variable
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

#[async_trait]
impl SessionTokenProvider for EnvTokenProvider {
    async fn token(&self) -> Result<String, TokenError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Ok(_) | Err(std::env::VarError::NotPresent) => Err(TokenError::Unavailable),
            Err(e) => Err(TokenError::Provider(format!("{}: {e}", self.var))),
        }
    }
}
