//! Chat Panel - The Exchange Orchestrator
//!
//! Ties the draft input, the query transport, the reveal animator and the
//! cooldown timer into one exchange cycle:
//!
//! ```text
//!   Idle ──submit──▶ Sending ──result──▶ Revealing ──settle delay──▶ CoolingDown ──0──▶ Idle
//!                     │                   │                          │
//!                     │ reveal placeholder│ reveal answer/fallback   │ 1s ticks
//! ```
//!
//! Exactly one exchange is in flight at a time. Submitting in any phase but
//! `Idle` is rejected; nothing is queued. A failed exchange looks the same as
//! a successful one from the outside: the fallback message is revealed and the
//! cooldown still runs.
//!
//! The panel is UI-agnostic. Surfaces forward typing and clicks through
//! [`ChatPanel::set_draft`] and [`ChatPanel::submit`], and render the
//! [`PanelMessage`]s they receive.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::PanelConfig;
use crate::cooldown::CooldownTimer;
use crate::messages::{EventSink, PanelMessage, PanelSnapshot};
use crate::reveal::RevealAnimator;
use crate::session::{ChatSession, Phase, SharedSession};
use crate::transport::{ChatRequest, ChatResult, QueryTransport};

/// Why a submit did nothing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Nothing typed
    EmptyDraft,
    /// An exchange or its cooldown is still running
    Busy(Phase),
    /// The panel has been closed
    Closed,
}

impl std::fmt::Display for SubmitRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDraft => write!(f, "draft is empty"),
            Self::Busy(phase) => write!(f, "panel is busy ({phase})"),
            Self::Closed => write!(f, "panel is closed"),
        }
    }
}

/// Result of [`ChatPanel::submit`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// An exchange is now in flight
    Started {
        /// Correlates the exchange's log lines
        exchange_id: Uuid,
    },
    /// Nothing happened
    Rejected(SubmitRejection),
}

impl SubmitOutcome {
    /// Whether an exchange was started
    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

/// Everything an exchange task needs once it is detached from the panel
struct ExchangeContext<T> {
    exchange_id: Uuid,
    transport: Arc<T>,
    session: SharedSession,
    events: EventSink,
    reveal: Arc<RevealAnimator>,
    cooldown: Arc<CooldownTimer>,
    settle_delay: Duration,
    cooldown_secs: u32,
    fallback_message: String,
}

/// One open chat panel
///
/// Dropping the panel closes it.
pub struct ChatPanel<T: QueryTransport> {
    config: PanelConfig,
    transport: Arc<T>,
    session: SharedSession,
    events: EventSink,
    reveal: Arc<RevealAnimator>,
    cooldown: Arc<CooldownTimer>,
    exchange: Mutex<Option<JoinHandle<()>>>,
}

impl<T: QueryTransport + 'static> ChatPanel<T> {
    /// Open a panel showing the welcome message
    ///
    /// Submitting requires a tokio runtime.
    pub fn open(transport: T, config: PanelConfig, tx: mpsc::Sender<PanelMessage>) -> Self {
        let session: SharedSession = Arc::new(Mutex::new(ChatSession::new(
            config.max_input_len,
            config.welcome_message.clone(),
        )));
        let events = EventSink::new(tx);
        let reveal = Arc::new(RevealAnimator::new(
            Arc::clone(&session),
            events.clone(),
            config.reveal_step,
        ));
        let cooldown = Arc::new(CooldownTimer::new(Arc::clone(&session), events.clone()));

        events.emit(PanelMessage::Display {
            text: config.welcome_message.clone(),
        });
        tracing::info!(transport = transport.name(), "Chat panel opened");

        Self {
            config,
            transport: Arc::new(transport),
            session,
            events,
            reveal,
            cooldown,
            exchange: Mutex::new(None),
        }
    }

    /// Submit the current draft
    ///
    /// Starts an exchange only when the draft is nonempty and the panel is
    /// `Idle`; otherwise nothing changes.
    pub fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut state = self.session.lock();
            if state.is_closed() {
                return SubmitOutcome::Rejected(SubmitRejection::Closed);
            }
            if state.draft().is_empty() {
                return SubmitOutcome::Rejected(SubmitRejection::EmptyDraft);
            }
            if state.phase() != Phase::Idle {
                return SubmitOutcome::Rejected(SubmitRejection::Busy(state.phase()));
            }

            let from = state.transition(Phase::Sending);
            self.events.emit(PanelMessage::PhaseChanged {
                from,
                to: Phase::Sending,
            });
            ChatRequest::new(state.draft())
        };

        let exchange_id = Uuid::new_v4();
        tracing::info!(
            %exchange_id,
            chars = request.prompt.chars().count(),
            "Exchange started"
        );

        self.reveal.reveal(self.config.placeholder_message.clone());
        self.start_exchange(exchange_id, request)
    }

    /// Spawn the exchange task unless the panel closed since `submit` decided
    fn start_exchange(&self, exchange_id: Uuid, request: ChatRequest) -> SubmitOutcome {
        let context = ExchangeContext {
            exchange_id,
            transport: Arc::clone(&self.transport),
            session: Arc::clone(&self.session),
            events: self.events.clone(),
            reveal: Arc::clone(&self.reveal),
            cooldown: Arc::clone(&self.cooldown),
            settle_delay: self.config.settle_delay,
            cooldown_secs: self.config.cooldown_secs,
            fallback_message: self.config.fallback_message.clone(),
        };

        // The exchange slot is held across the check: an earlier close() is
        // seen here, a later one finds the handle stored
        let mut exchange = self.exchange.lock();
        let state = self.session.lock();
        if state.is_closed() {
            tracing::debug!(%exchange_id, "Panel closed before the request went out");
            return SubmitOutcome::Rejected(SubmitRejection::Closed);
        }
        *exchange = Some(tokio::spawn(run_exchange(context, request)));
        drop(state);

        SubmitOutcome::Started { exchange_id }
    }
}

impl<T: QueryTransport> ChatPanel<T> {
    /// Overwrite the draft; allowed in every phase
    pub fn set_draft(&self, raw: &str) {
        self.session.lock().set_draft(raw);
    }

    /// Draft nonempty and the panel `Idle`
    pub fn can_submit(&self) -> bool {
        self.session.lock().submit_enabled()
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.session.lock().phase()
    }

    /// Currently displayed response text
    pub fn displayed_text(&self) -> String {
        self.session.lock().displayed_text().to_string()
    }

    /// Current draft
    pub fn draft(&self) -> String {
        self.session.lock().draft().to_string()
    }

    /// Seconds left in the cooldown
    pub fn cooldown_remaining(&self) -> u32 {
        self.session.lock().cooldown_remaining()
    }

    /// View model for rendering
    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot::capture(&self.session.lock())
    }

    /// The transport in use
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The configuration in use
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Whether [`close`](Self::close) has run
    pub fn is_closed(&self) -> bool {
        self.session.lock().is_closed()
    }

    /// Close the panel and cancel every pending timer
    ///
    /// A request already on the wire is left to finish; its result is
    /// discarded. Idempotent.
    pub fn close(&self) {
        let phase = {
            let mut state = self.session.lock();
            if state.is_closed() {
                return;
            }
            state.close();
            state.phase()
        };

        self.reveal.cancel();
        self.cooldown.cancel();
        if let Some(exchange) = self.exchange.lock().take() {
            if phase == Phase::Sending {
                tracing::debug!("Closing with a request in flight; its result will be discarded");
            } else {
                exchange.abort();
            }
        }

        self.events.emit_final(PanelMessage::Closed);
        tracing::info!(phase = %phase, "Chat panel closed");
    }
}

impl<T: QueryTransport> Drop for ChatPanel<T> {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_exchange<T: QueryTransport>(context: ExchangeContext<T>, request: ChatRequest) {
    let ExchangeContext {
        exchange_id,
        transport,
        session,
        events,
        reveal,
        cooldown,
        settle_delay,
        cooldown_secs,
        fallback_message,
    } = context;

    let text = match transport.send(&request).await {
        ChatResult::Answered { text } => {
            tracing::info!(%exchange_id, chars = text.chars().count(), "Answer received");
            text
        }
        ChatResult::Failed { reason } => {
            tracing::warn!(%exchange_id, error = %reason, "Exchange failed, showing fallback");
            fallback_message
        }
    };

    {
        let mut state = session.lock();
        if state.is_closed() {
            tracing::debug!(%exchange_id, "Panel closed before the result arrived, discarding");
            return;
        }
        let from = state.transition(Phase::Revealing);
        events.emit(PanelMessage::PhaseChanged {
            from,
            to: Phase::Revealing,
        });
    }

    // Supersedes the placeholder
    reveal.reveal(text);

    // Not tied to the reveal finishing
    tokio::time::sleep(settle_delay).await;

    if cooldown.start(cooldown_secs) {
        tracing::debug!(%exchange_id, cooldown_secs, "Exchange settled");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transport::TransportError;

    /// Answers every request with the same text after a fixed latency
    struct EchoTransport {
        latency: Duration,
        calls: AtomicUsize,
    }

    impl EchoTransport {
        fn new(latency: Duration) -> Self {
            Self {
                latency,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QueryTransport for EchoTransport {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn send(&self, request: &ChatRequest) -> ChatResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            if request.prompt == "fail" {
                return ChatResult::Failed {
                    reason: TransportError::Malformed("missing field `response`".to_string()),
                };
            }
            ChatResult::Answered {
                text: format!("You asked: {}", request.prompt),
            }
        }
    }

    fn panel(latency: Duration) -> (ChatPanel<EchoTransport>, mpsc::Receiver<PanelMessage>) {
        let (tx, rx) = mpsc::channel(4096);
        let panel = ChatPanel::open(EchoTransport::new(latency), PanelConfig::default(), tx);
        (panel, rx)
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_open_shows_welcome() {
        let (panel, mut rx) = panel(Duration::ZERO);
        assert_eq!(panel.phase(), Phase::Idle);
        assert_eq!(panel.displayed_text(), crate::config::WELCOME_MESSAGE);
        assert_eq!(
            rx.try_recv().unwrap(),
            PanelMessage::Display {
                text: crate::config::WELCOME_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_empty_draft_is_rejected() {
        let (panel, _rx) = panel(Duration::ZERO);
        assert!(!panel.can_submit());
        assert_eq!(
            panel.submit(),
            SubmitOutcome::Rejected(SubmitRejection::EmptyDraft)
        );
        assert_eq!(panel.transport().calls.load(Ordering::SeqCst), 0);
        assert_eq!(panel.phase(), Phase::Idle);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_submit_while_busy_is_rejected() {
        let (panel, _rx) = panel(Duration::from_millis(500));
        panel.set_draft("first");
        assert!(panel.submit().is_started());

        // Typing stays live while the exchange runs
        panel.set_draft("second");
        assert_eq!(panel.draft(), "second");
        assert_eq!(
            panel.submit(),
            SubmitOutcome::Rejected(SubmitRejection::Busy(Phase::Sending))
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(
            panel.submit(),
            SubmitOutcome::Rejected(SubmitRejection::Busy(Phase::Revealing))
        );

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(panel.phase(), Phase::CoolingDown);
        assert!(!panel.submit().is_started());

        assert_eq!(panel.transport().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_placeholder_shown_while_sending() {
        let (panel, _rx) = panel(Duration::from_secs(2));
        panel.set_draft("What is dark matter?");
        panel.submit();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(panel.phase(), Phase::Sending);
        assert_eq!(panel.displayed_text(), crate::config::PLACEHOLDER_MESSAGE);
        assert!(panel.snapshot().loading);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_full_cycle_returns_to_idle() {
        let (panel, _rx) = panel(Duration::from_millis(100));
        panel.set_draft("  Why is the sky blue?  ");
        panel.submit();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(panel.phase(), Phase::Revealing);
        assert_eq!(panel.displayed_text(), "You asked: Why is the sky blue?");

        // Result at 0.1s, cooldown from 5.1s, first tick at 6.1s
        tokio::time::sleep(Duration::from_millis(4500)).await;
        assert_eq!(panel.phase(), Phase::CoolingDown);
        assert_eq!(panel.snapshot().submit_label, "Wait 9s");

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(panel.phase(), Phase::Idle);
        assert!(panel.can_submit(), "Draft is kept after an exchange");
        assert_eq!(panel.snapshot().submit_label, "Ask");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_failure_shows_fallback_and_still_cools_down() {
        let (panel, _rx) = panel(Duration::from_millis(100));
        panel.set_draft("fail");
        panel.submit();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(panel.displayed_text(), crate::config::FALLBACK_MESSAGE);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(panel.phase(), Phase::CoolingDown);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(panel.phase(), Phase::Idle);

        // The panel stays usable after a failure
        panel.set_draft("again");
        assert!(panel.submit().is_started());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_closed_delivered_when_channel_full() {
        let (tx, mut rx) = mpsc::channel(16);
        let panel = ChatPanel::open(
            EchoTransport::new(Duration::from_millis(10)),
            PanelConfig::default(),
            tx,
        );
        panel.set_draft(&"x".repeat(190));
        panel.submit();

        // Nobody drains while the answer reveals
        tokio::time::sleep(Duration::from_millis(500)).await;
        panel.close();
        panel.close();

        let mut last = None;
        while let Ok(Some(message)) =
            tokio::time::timeout(Duration::from_secs(5), rx.recv()).await
        {
            last = Some(message);
        }
        assert_eq!(last, Some(PanelMessage::Closed));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_exchange_not_spawned_after_close() {
        let (panel, _rx) = panel(Duration::ZERO);
        panel.set_draft("late question");
        panel.close();

        let outcome = panel.start_exchange(Uuid::new_v4(), ChatRequest::new("late question"));
        assert_eq!(outcome, SubmitOutcome::Rejected(SubmitRejection::Closed));
        assert!(panel.exchange.lock().is_none());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(panel.transport().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_close_is_idempotent() {
        let (panel, mut rx) = panel(Duration::ZERO);
        panel.close();
        panel.close();
        assert!(panel.is_closed());
        assert_eq!(
            panel.submit(),
            SubmitOutcome::Rejected(SubmitRejection::Closed)
        );

        let closed = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|m| *m == PanelMessage::Closed)
            .count();
        assert_eq!(closed, 1);
    }
}
