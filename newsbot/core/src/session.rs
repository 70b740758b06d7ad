//! Chat Session State
//!
//! One [`ChatSession`] lives for as long as the panel is open. It is the only
//! mutable state of the panel: the input controller writes the draft, the
//! reveal animator writes the displayed text, the cooldown timer writes the
//! countdown, and the orchestrator drives the phase.
//!
//! Timer tasks never hold a reference into the session across an await.
//! Each one captures an epoch when it is scheduled and re-checks it under the
//! lock before touching anything, so a cancelled or superseded task can never
//! mutate the session.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::input::InputController;

/// The session as shared between the panel and its timer tasks
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Where the panel is in its exchange cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Ready for a question
    #[default]
    Idle,
    /// Waiting for the endpoint
    Sending,
    /// Result arrived, settle delay running
    Revealing,
    /// Locked out until the countdown reaches zero
    CoolingDown,
}

impl Phase {
    /// Lowercase name for logs and the terminal surface
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::Revealing => "revealing",
            Self::CoolingDown => "cooling_down",
        }
    }

    /// Whether the panel shows its busy indicator in this phase
    #[must_use]
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Sending | Self::Revealing)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one open chat panel
#[derive(Clone, Debug)]
pub struct ChatSession {
    input: InputController,
    displayed_text: String,
    phase: Phase,
    cooldown_remaining: u32,
    closed: bool,
    /// Bumped on every reveal start and cancel
    reveal_epoch: u64,
    /// Bumped on every cooldown start and cancel
    cooldown_epoch: u64,
}

impl ChatSession {
    /// Open a session showing the welcome message
    pub fn new(max_input_len: usize, welcome_message: impl Into<String>) -> Self {
        Self {
            input: InputController::new(max_input_len),
            displayed_text: welcome_message.into(),
            phase: Phase::Idle,
            cooldown_remaining: 0,
            closed: false,
            reveal_epoch: 0,
            cooldown_epoch: 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Currently rendered (possibly partial) response
    pub fn displayed_text(&self) -> &str {
        &self.displayed_text
    }

    /// Seconds left in the cooldown
    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    /// Whether the panel has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The draft input
    pub fn input(&self) -> &InputController {
        &self.input
    }

    /// Current draft text
    pub fn draft(&self) -> &str {
        self.input.draft()
    }

    /// Overwrite the draft (allowed in any phase)
    pub fn set_draft(&mut self, raw: &str) {
        self.input.set_draft(raw);
    }

    /// Derived: draft nonempty and phase is `Idle`
    pub fn submit_enabled(&self) -> bool {
        !self.closed && self.input.can_submit(self.phase)
    }

    /// Move to a new phase, returning the previous one
    pub(crate) fn transition(&mut self, to: Phase) -> Phase {
        let from = self.phase;
        if from != to {
            tracing::debug!(from = %from, to = %to, "Phase transition");
        }
        self.phase = to;
        if to != Phase::CoolingDown {
            self.cooldown_remaining = 0;
        }
        from
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.reveal_epoch += 1;
        self.cooldown_epoch += 1;
    }

    // ---- reveal bookkeeping -------------------------------------------------

    /// Clear the displayed text and claim a new reveal epoch
    ///
    /// `None` once the session is closed.
    pub(crate) fn begin_reveal(&mut self) -> Option<u64> {
        if self.closed {
            return None;
        }
        self.reveal_epoch += 1;
        self.displayed_text.clear();
        Some(self.reveal_epoch)
    }

    /// Invalidate any in-flight reveal, keeping what is already shown
    pub(crate) fn cancel_reveal(&mut self) {
        self.reveal_epoch += 1;
    }

    /// Append one revealed character if `epoch` is still current
    pub(crate) fn apply_reveal_char(&mut self, epoch: u64, ch: char) -> bool {
        if self.closed || epoch != self.reveal_epoch {
            return false;
        }
        self.displayed_text.push(ch);
        true
    }

    // ---- cooldown bookkeeping -----------------------------------------------

    /// Enter `CoolingDown` and claim a new cooldown epoch
    pub(crate) fn begin_cooldown(&mut self, seconds: u32) -> u64 {
        self.cooldown_epoch += 1;
        self.transition(Phase::CoolingDown);
        self.cooldown_remaining = seconds;
        self.cooldown_epoch
    }

    pub(crate) fn cancel_cooldown(&mut self) {
        self.cooldown_epoch += 1;
    }

    /// One second elapsed; returns the remaining seconds, or `None` if stale
    pub(crate) fn tick_cooldown(&mut self, epoch: u64) -> Option<u32> {
        if self.closed || epoch != self.cooldown_epoch || self.phase != Phase::CoolingDown {
            return None;
        }
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
        Some(self.cooldown_remaining)
    }
}
