//! Newsbot Core - Headless Chat Panel for the Newsci news site
//!
//! This crate provides the client-side orchestration of the "chat with our
//! articles" panel, independent of any UI framework. It can drive a terminal,
//! a web view, or run headless under test.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         UI Surface                            │
//! │        set_draft / submit / close (up)   PanelMessage (down)  │
//! └───────────────────────────────┬──────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┼──────────────────────────────┐
//! │                        ChatPanel (orchestrator)               │
//! │  ┌────────────┐  ┌──────────────┐  ┌───────────────┐          │
//! │  │   Input    │  │   Reveal     │  │   Cooldown    │          │
//! │  │ Controller │  │   Animator   │  │    Timer      │          │
//! │  └────────────┘  └──────────────┘  └───────────────┘          │
//! │                 ┌───────────────────────────┐                 │
//! │                 │ QueryTransport ──▶ SessionTokenProvider     │
//! │                 └───────────────────────────┘                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use newsbot_core::{ChatPanel, EnvTokenProvider, HttpQueryTransport, PanelConfig};
//! use tokio::sync::mpsc;
//!
//! let config = PanelConfig::from_env();
//! let transport = HttpQueryTransport::new(config.endpoint.clone(), Arc::new(EnvTokenProvider::default()))?;
//! let (tx, mut rx) = mpsc::channel(config.event_buffer);
//! let panel = ChatPanel::open(transport, config, tx);
//!
//! panel.set_draft("What is dark matter?");
//! panel.submit();
//! while let Some(message) = rx.recv().await {
//!     // render message
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`auth`]: Session token providers
//! - [`config`]: Timings, strings, endpoint, TOML/env loading
//! - [`cooldown`]: Post-exchange lockout countdown
//! - [`input`]: Draft text and its length limit
//! - [`messages`]: Messages to surfaces and the snapshot view model
//! - [`panel`]: The exchange state machine
//! - [`reveal`]: Character-by-character rendering
//! - [`session`]: Per-panel state
//! - [`transport`]: The authenticated chat request

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod cooldown;
pub mod input;
pub mod messages;
pub mod panel;
pub mod reveal;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use auth::{EnvTokenProvider, SessionTokenProvider, StaticTokenProvider, TokenError};
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, EndpointConfig,
    NewsbotToml, PanelConfig,
};
pub use cooldown::CooldownTimer;
pub use input::InputController;
pub use messages::{PanelMessage, PanelSnapshot};
pub use panel::{ChatPanel, SubmitOutcome, SubmitRejection};
pub use reveal::RevealAnimator;
pub use session::{ChatSession, Phase};
pub use transport::{ChatRequest, ChatResult, HttpQueryTransport, QueryTransport, TransportError};
