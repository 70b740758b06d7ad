//! Panel Messages
//!
//! Messages sent from the panel core to whatever surface renders it (terminal,
//! web view, test harness). Surfaces hold no business logic: they draw what
//! they are told and forward the user's typing and clicks back to
//! [`ChatPanel`](crate::panel::ChatPanel).

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::session::{ChatSession, Phase};

/// Messages from the panel to its surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelMessage {
    /// The displayed text changed; carries the whole current text
    Display {
        /// Full displayed text after the change
        text: String,
    },

    /// The exchange cycle moved on
    PhaseChanged {
        /// Previous phase
        from: Phase,
        /// New phase
        to: Phase,
    },

    /// One cooldown second elapsed
    Cooldown {
        /// Seconds left
        remaining: u32,
    },

    /// The panel was closed; no further messages follow
    Closed,
}

/// Sending half of the surface channel
///
/// Emits without awaiting, so callers can emit while holding the session lock
/// and messages arrive in the same order as the mutations they describe. A
/// full channel drops the message: every `Display` carries the whole text, so
/// the next one repairs the view.
#[derive(Clone, Debug)]
pub(crate) struct EventSink {
    tx: mpsc::Sender<PanelMessage>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::Sender<PanelMessage>) -> Self {
        Self { tx }
    }

    pub(crate) fn emit(&self, message: PanelMessage) {
        match self.tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                tracing::warn!(?message, "Surface channel full, dropping panel message");
            }
            // Surface went away; the panel keeps running headless
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// Emit a message that must not be dropped
    ///
    /// Only for the last message of a panel, once nothing else can emit. A
    /// full channel hands the message to a task that waits for capacity, so
    /// it still arrives after everything already queued.
    pub(crate) fn emit_final(&self, message: PanelMessage) {
        let message = match self.tx.try_send(message) {
            Ok(()) | Err(TrySendError::Closed(_)) => return,
            Err(TrySendError::Full(message)) => message,
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(?message, "Surface channel full, waiting to deliver");
                let tx = self.tx.clone();
                handle.spawn(async move {
                    // Err only if the surface already hung up
                    let _ = tx.send(message).await;
                });
            }
            Err(_) => {
                tracing::warn!(?message, "Surface channel full outside a runtime, dropping");
            }
        }
    }
}

/// Everything a surface needs to draw the panel at one instant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSnapshot {
    /// Response area
    pub displayed_text: String,
    /// Question field
    pub draft: String,
    /// `"n/max"` under the question field
    pub counter_label: String,
    /// Current phase
    pub phase: Phase,
    /// Seconds left in the cooldown
    pub cooldown_remaining: u32,
    /// Whether the ask button is clickable
    pub submit_enabled: bool,
    /// Whether the ask button shows its spinner
    pub loading: bool,
    /// `"Ask"`, or `"Wait {n}s"` during the cooldown
    pub submit_label: String,
}

impl PanelSnapshot {
    /// Capture the current state of a session
    #[must_use]
    pub fn capture(session: &ChatSession) -> Self {
        let submit_label = if session.phase() == Phase::CoolingDown {
            format!("Wait {}s", session.cooldown_remaining())
        } else {
            "Ask".to_string()
        };

        Self {
            displayed_text: session.displayed_text().to_string(),
            draft: session.draft().to_string(),
            counter_label: session.input().counter_label(),
            phase: session.phase(),
            cooldown_remaining: session.cooldown_remaining(),
            submit_enabled: session.submit_enabled(),
            loading: session.phase().is_loading(),
            submit_label,
        }
    }
}
