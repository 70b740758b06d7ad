//! Post-exchange Cooldown
//!
//! After every exchange, successful or not, submission stays locked for a
//! fixed number of seconds. The countdown is a periodic one-second tick that
//! decrements the session's counter and returns the panel to `Idle` at zero.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::messages::{EventSink, PanelMessage};
use crate::session::{ChatSession, Phase, SharedSession};

const TICK: Duration = Duration::from_secs(1);

/// Single countdown owned by the panel
pub struct CooldownTimer {
    session: SharedSession,
    events: EventSink,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CooldownTimer {
    pub(crate) fn new(session: SharedSession, events: EventSink) -> Self {
        Self {
            session,
            events,
            task: Mutex::new(None),
        }
    }

    /// Lock submission for `seconds`
    ///
    /// Returns `false` without effect if the panel is closed or a cooldown is
    /// already running.
    pub fn start(&self, seconds: u32) -> bool {
        let mut task = self.task.lock();

        let epoch = {
            let mut state = self.session.lock();
            if state.is_closed() {
                return false;
            }
            if state.phase() == Phase::CoolingDown {
                tracing::warn!(
                    remaining = state.cooldown_remaining(),
                    "Cooldown already running, ignoring start"
                );
                return false;
            }

            let from = state.phase();
            let epoch = state.begin_cooldown(seconds);
            self.events.emit(PanelMessage::PhaseChanged {
                from,
                to: Phase::CoolingDown,
            });
            self.events.emit(PanelMessage::Cooldown { remaining: seconds });
            tracing::debug!(seconds, "Cooldown started");

            if seconds == 0 {
                finish(&mut state, &self.events);
                return true;
            }
            epoch
        };

        if let Some(previous) = task.take() {
            previous.abort();
        }

        let session = Arc::clone(&self.session);
        let events = self.events.clone();
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            loop {
                ticker.tick().await;

                let mut state = session.lock();
                let Some(remaining) = state.tick_cooldown(epoch) else {
                    return;
                };
                events.emit(PanelMessage::Cooldown { remaining });
                if remaining == 0 {
                    finish(&mut state, &events);
                    return;
                }
            }
        }));

        true
    }

    /// Stop ticking without touching the phase (teardown only)
    pub fn cancel(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        self.session.lock().cancel_cooldown();
    }

    /// Whether the countdown is still ticking
    pub fn is_active(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

fn finish(state: &mut ChatSession, events: &EventSink) {
    let from = state.transition(Phase::Idle);
    events.emit(PanelMessage::PhaseChanged {
        from,
        to: Phase::Idle,
    });
    tracing::debug!("Cooldown finished, submission re-enabled");
}

impl Drop for CooldownTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
