//! Query Transport
//!
//! Sends one authenticated question to the chat endpoint and folds every
//! possible outcome into a [`ChatResult`].
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use newsbot_core::auth::EnvTokenProvider;
//! use newsbot_core::transport::{ChatRequest, HttpQueryTransport, QueryTransport};
//!
//! let transport = HttpQueryTransport::new(config.endpoint, Arc::new(EnvTokenProvider::default()))?;
//! let result = transport.send(&ChatRequest::new("What is dark matter?")).await;
//! ```

mod http;
mod traits;

pub use http::HttpQueryTransport;
pub use traits::{parse_chat_response, ChatRequest, ChatResult, QueryTransport, TransportError};
