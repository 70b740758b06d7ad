//! Character-by-character Reveal
//!
//! Renders a full response string into the session one character at a time:
//! character `k` lands `k * step` after the reveal started.
//!
//! Each reveal is a single task walking a cursor over the text, so characters
//! can only be applied in index order. The task holds the session epoch it was
//! started under; starting another reveal, cancelling, or closing the panel
//! bumps the epoch and the old task's next tick is refused under the lock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::messages::{EventSink, PanelMessage};
use crate::session::SharedSession;

/// Drives the incremental rendering of responses
///
/// At most one reveal is active per session. Must be used from within a
/// tokio runtime.
pub struct RevealAnimator {
    session: SharedSession,
    events: EventSink,
    step: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RevealAnimator {
    pub(crate) fn new(session: SharedSession, events: EventSink, step: Duration) -> Self {
        Self {
            session,
            events,
            step,
            task: Mutex::new(None),
        }
    }

    /// Replace the displayed text with `full_text`, revealed over time
    ///
    /// Supersedes any reveal still running. Does nothing once the panel is
    /// closed.
    pub fn reveal(&self, full_text: impl Into<String>) {
        let full_text = full_text.into();
        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let epoch = {
            let mut state = self.session.lock();
            let Some(epoch) = state.begin_reveal() else {
                return;
            };
            self.events.emit(PanelMessage::Display {
                text: String::new(),
            });
            epoch
        };

        tracing::trace!(epoch, chars = full_text.chars().count(), "Reveal started");

        let session = Arc::clone(&self.session);
        let events = self.events.clone();
        let step = self.step;
        let start = Instant::now();

        *task = Some(tokio::spawn(async move {
            for (index, ch) in full_text.chars().enumerate() {
                let offset = step.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
                let Some(deadline) = start.checked_add(offset) else {
                    tracing::warn!(epoch, index, "Reveal deadline out of range, stopping");
                    return;
                };
                tokio::time::sleep_until(deadline).await;

                let mut state = session.lock();
                if !state.apply_reveal_char(epoch, ch) {
                    tracing::trace!(epoch, index, "Reveal superseded");
                    return;
                }
                events.emit(PanelMessage::Display {
                    text: state.displayed_text().to_string(),
                });
            }
            tracing::trace!(epoch, "Reveal finished");
        }));
    }

    /// Stop pending characters, keeping what is already displayed
    pub fn cancel(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        self.session.lock().cancel_reveal();
    }

    /// Whether characters are still pending
    pub fn is_active(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RevealAnimator {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
