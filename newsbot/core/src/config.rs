//! Panel Configuration
//!
//! Timing constants, user-facing strings and the chat endpoint location.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments (applied by the surface binary)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! The configuration file lives at `$XDG_CONFIG_HOME/newsci/newsbot.toml`
//! (typically `~/.config/newsci/newsbot.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! [panel]
//! max_input_len = 200
//! reveal_step_ms = 5
//! settle_secs = 5
//! cooldown_secs = 10
//!
//! [endpoint]
//! base_url = "https://api.newsci.example"
//! path = "/chat"
//! timeout_secs = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum draft length in characters
pub const MAX_INPUT_LEN: usize = 200;

/// Delay between two revealed characters
pub const REVEAL_STEP_MS: u64 = 5;

/// Pause between a result arriving and the cooldown starting
pub const SETTLE_DELAY_SECS: u64 = 5;

/// Post-exchange lockout
pub const COOLDOWN_SECONDS: u32 = 10;

/// Longest accepted delay between revealed characters
pub const MAX_REVEAL_STEP: Duration = Duration::from_secs(1);

/// Longest accepted settle delay
pub const MAX_SETTLE_DELAY: Duration = Duration::from_secs(60);

/// Shown when the panel opens
pub const WELCOME_MESSAGE: &str =
    "Hi! I'm Newsci, your news bot. Ask me anything about our articles in the Question field below!";

/// Revealed while the request is in flight
pub const PLACEHOLDER_MESSAGE: &str = "Let me see...";

/// Revealed instead of any failure reason
pub const FALLBACK_MESSAGE: &str = "Oh no, there was an error! Please try again later.";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Where and how the chat endpoint is reached
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Scheme + host (+ optional stage prefix), without trailing slash
    pub base_url: String,
    /// Path of the chat route, starting with `/`
    pub path: String,
    /// Optional `Authorization` scheme; `None` sends the raw token
    pub auth_scheme: Option<String>,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            path: "/chat".to_string(),
            auth_scheme: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl EndpointConfig {
    /// Full URL of the chat route
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }

    /// Render the `Authorization` header value for a token
    #[must_use]
    pub fn authorization(&self, token: &str) -> String {
        match self.auth_scheme.as_deref() {
            Some(scheme) if !scheme.is_empty() => format!("{scheme} {token}"),
            _ => token.to_string(),
        }
    }
}

/// Chat panel configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    /// Maximum draft length in characters
    pub max_input_len: usize,
    /// Delay between revealed characters
    pub reveal_step: Duration,
    /// Pause between result arrival and cooldown start
    pub settle_delay: Duration,
    /// Cooldown length in seconds
    pub cooldown_secs: u32,
    /// Initial displayed text
    pub welcome_message: String,
    /// Interim text revealed while sending
    pub placeholder_message: String,
    /// Text revealed on any failure
    pub fallback_message: String,
    /// Capacity of the surface message channel
    pub event_buffer: usize,
    /// Chat endpoint
    pub endpoint: EndpointConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            max_input_len: MAX_INPUT_LEN,
            reveal_step: Duration::from_millis(REVEAL_STEP_MS),
            settle_delay: Duration::from_secs(SETTLE_DELAY_SECS),
            cooldown_secs: COOLDOWN_SECONDS,
            welcome_message: WELCOME_MESSAGE.to_string(),
            placeholder_message: PLACEHOLDER_MESSAGE.to_string(),
            fallback_message: FALLBACK_MESSAGE.to_string(),
            event_buffer: 256,
            endpoint: EndpointConfig::default(),
        }
    }
}

impl PanelConfig {
    /// Defaults overridden by environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        apply_env_config(&mut config);
        config
    }

    /// Set the endpoint base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.endpoint.base_url = base_url.into();
        self
    }

    /// Set the chat route path
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.endpoint.path = path.into();
        self
    }

    /// Set the `Authorization` scheme prefix
    #[must_use]
    pub fn with_auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.endpoint.auth_scheme = Some(scheme.into());
        self
    }

    /// Set the delay between revealed characters
    #[must_use]
    pub fn with_reveal_step(mut self, step: Duration) -> Self {
        self.reveal_step = step;
        self
    }

    /// Set the settle delay
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the cooldown length
    #[must_use]
    pub fn with_cooldown_secs(mut self, secs: u32) -> Self {
        self.cooldown_secs = secs;
        self
    }

    /// Set the draft length limit
    #[must_use]
    pub fn with_max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = len;
        self
    }

    /// Check values that would make the panel unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_len == 0 {
            return Err(ConfigError::Validation(
                "max_input_len must be greater than zero".to_string(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::Validation(
                "event_buffer must be greater than zero".to_string(),
            ));
        }
        if self.reveal_step > MAX_REVEAL_STEP {
            return Err(ConfigError::Validation(format!(
                "reveal_step must be at most {}ms, got {}ms",
                MAX_REVEAL_STEP.as_millis(),
                self.reveal_step.as_millis()
            )));
        }
        if self.settle_delay > MAX_SETTLE_DELAY {
            return Err(ConfigError::Validation(format!(
                "settle_delay must be at most {}s, got {}s",
                MAX_SETTLE_DELAY.as_secs(),
                self.settle_delay.as_secs()
            )));
        }
        if self.endpoint.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "endpoint timeout must be greater than zero".to_string(),
            ));
        }
        if self.endpoint.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("endpoint base_url is empty".to_string()));
        }
        if !self.endpoint.path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "endpoint path must start with '/': {}",
                self.endpoint.path
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[panel]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelToml {
    /// Maximum draft length in characters
    pub max_input_len: Option<usize>,
    /// Delay between revealed characters in milliseconds
    pub reveal_step_ms: Option<u64>,
    /// Settle delay in seconds
    pub settle_secs: Option<u64>,
    /// Cooldown in seconds
    pub cooldown_secs: Option<u32>,
    /// Initial displayed text
    pub welcome_message: Option<String>,
    /// Interim text while sending
    pub placeholder_message: Option<String>,
    /// Text shown on failure
    pub fallback_message: Option<String>,
    /// Surface channel capacity
    pub event_buffer: Option<usize>,
}

/// `[endpoint]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointToml {
    /// Scheme + host of the API
    pub base_url: Option<String>,
    /// Chat route path
    pub path: Option<String>,
    /// `Authorization` scheme prefix
    pub auth_scheme: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Root of `newsbot.toml`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsbotToml {
    /// Panel behaviour
    pub panel: PanelToml,
    /// Chat endpoint
    pub endpoint: EndpointToml,
}

/// Default configuration file location
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("newsci").join("newsbot.toml"))
}

/// Load configuration from the default path, then the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config() -> Result<PanelConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the environment
///
/// A missing file is not an error; defaults are used.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or yields invalid values.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PanelConfig, ConfigError> {
    let mut config = PanelConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                    path: config_path.clone(),
                    source,
                })?;
            let file: NewsbotToml = toml::from_str(&content)?;
            apply_toml_config(&mut config, file);

            tracing::info!(path = %config_path.display(), "Loaded configuration from file");
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;
    Ok(config)
}

fn apply_toml_config(config: &mut PanelConfig, file: NewsbotToml) {
    let NewsbotToml { panel, endpoint } = file;

    if let Some(len) = panel.max_input_len {
        config.max_input_len = len;
    }
    if let Some(ms) = panel.reveal_step_ms {
        config.reveal_step = Duration::from_millis(ms);
    }
    if let Some(secs) = panel.settle_secs {
        config.settle_delay = Duration::from_secs(secs);
    }
    if let Some(secs) = panel.cooldown_secs {
        config.cooldown_secs = secs;
    }
    if let Some(text) = panel.welcome_message {
        config.welcome_message = text;
    }
    if let Some(text) = panel.placeholder_message {
        config.placeholder_message = text;
    }
    if let Some(text) = panel.fallback_message {
        config.fallback_message = text;
    }
    if let Some(size) = panel.event_buffer {
        config.event_buffer = size;
    }

    if let Some(url) = endpoint.base_url {
        config.endpoint.base_url = url;
    }
    if let Some(path) = endpoint.path {
        config.endpoint.path = path;
    }
    if endpoint.auth_scheme.is_some() {
        config.endpoint.auth_scheme = endpoint.auth_scheme;
    }
    if let Some(secs) = endpoint.timeout_secs {
        config.endpoint.timeout = Duration::from_secs(secs);
    }
}

fn apply_env_config(config: &mut PanelConfig) {
    if let Some(len) = env_parse("NEWSBOT_MAX_INPUT_LEN") {
        config.max_input_len = len;
    }
    if let Some(ms) = env_parse("NEWSBOT_REVEAL_STEP_MS") {
        config.reveal_step = Duration::from_millis(ms);
    }
    if let Some(secs) = env_parse("NEWSBOT_SETTLE_SECS") {
        config.settle_delay = Duration::from_secs(secs);
    }
    if let Some(secs) = env_parse("NEWSBOT_COOLDOWN_SECS") {
        config.cooldown_secs = secs;
    }
    if let Ok(url) = std::env::var("NEWSBOT_API_URL") {
        config.endpoint.base_url = url;
    }
    if let Ok(path) = std::env::var("NEWSBOT_CHAT_PATH") {
        config.endpoint.path = path;
    }
    if let Ok(scheme) = std::env::var("NEWSBOT_AUTH_SCHEME") {
        config.endpoint.auth_scheme = Some(scheme);
    }
    if let Some(secs) = env_parse("NEWSBOT_TIMEOUT_SECS") {
        config.endpoint.timeout = Duration::from_secs(secs);
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}
