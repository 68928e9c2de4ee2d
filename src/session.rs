//! Payment session state
//!
//! All of the mutable checkout state lives on one explicit session record
//! owned by the orchestrator: phase, intent credentials, attempt count, the
//! bound widget, and the cancellation flag. Phase changes are validated
//! against the monotonic state machine and published on a watch channel so
//! the calling surface can render progress.

use crate::error::{CheckoutError, CheckoutResult};
use crate::gateway::ElementBinding;
use crate::status::{PaymentIntent, SaleTransaction, SessionPhase};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

/// Shared cooperative cancellation flag
///
/// The polling loop checks the flag before issuing a request and again
/// before acting on a delivered result, so a cancel is observed at the next
/// suspension point and in-flight responses are discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One checkout flow from initiation to a terminal phase
pub struct PaymentSession {
    id: Uuid,
    phase: SessionPhase,
    intent: Option<PaymentIntent>,
    transaction: Option<SaleTransaction>,
    attempts: u32,
    last_error: Option<String>,
    cancel: CancelToken,
    pub(crate) element: ElementBinding,
    phase_tx: watch::Sender<SessionPhase>,
}

// The bound widget is a trait object with no Debug bound, so this is
// written out by hand.
impl fmt::Debug for PaymentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentSession")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("attempts", &self.attempts)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl PaymentSession {
    pub(crate) fn new() -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Idle);
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Idle,
            intent: None,
            transaction: None,
            attempts: 0,
            last_error: None,
            cancel: CancelToken::new(),
            element: ElementBinding::empty(),
            phase_tx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Status checks issued so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn intent(&self) -> Option<&PaymentIntent> {
        self.intent.as_ref()
    }

    pub fn transaction(&self) -> Option<&SaleTransaction> {
        self.transaction.as_ref()
    }

    /// Watch phase changes as they happen
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }

    /// Handle for cancelling this session from another task
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    pub(crate) fn set_intent(&mut self, intent: PaymentIntent) {
        self.intent = Some(intent);
    }

    pub(crate) fn set_transaction(&mut self, transaction: SaleTransaction) {
        self.transaction = Some(transaction);
    }

    pub(crate) fn record_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    pub(crate) fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Move to the next phase, enforcing the monotonic machine
    pub(crate) fn transition(&mut self, next: SessionPhase) -> CheckoutResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(CheckoutError::State(format!(
                "cannot move from {} to {}",
                self.phase, next
            )));
        }
        debug!(session = %self.id, from = %self.phase, to = %next, "Session phase change");
        self.phase = next;
        self.phase_tx.send_replace(next);
        Ok(())
    }

    /// Resolve the session into a terminal phase and release the widget.
    /// The widget is unmounted exactly once no matter how the session ends.
    pub(crate) fn finish(&mut self, terminal: SessionPhase) {
        debug_assert!(terminal.is_terminal());
        if !self.phase.is_terminal() {
            let _ = self.transition(terminal);
        }
        self.element.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_canceled());
        clone.cancel();
        assert!(token.is_canceled());
    }

    #[test]
    fn test_transitions_enforced() {
        let mut session = PaymentSession::new();
        assert_eq!(session.phase(), SessionPhase::Idle);

        session.transition(SessionPhase::Creating).unwrap();
        session.transition(SessionPhase::Confirming).unwrap();

        // cannot re-enter creating once left
        assert!(matches!(
            session.transition(SessionPhase::Creating),
            Err(CheckoutError::State(_))
        ));

        session.transition(SessionPhase::Polling).unwrap();
        session.transition(SessionPhase::Succeeded).unwrap();

        // terminal phases are final
        assert!(session.transition(SessionPhase::Polling).is_err());
    }

    #[test]
    fn test_phase_changes_published() {
        let mut session = PaymentSession::new();
        let rx = session.subscribe();
        session.transition(SessionPhase::Creating).unwrap();
        session.transition(SessionPhase::Confirming).unwrap();
        assert_eq!(*rx.borrow(), SessionPhase::Confirming);
    }

    #[test]
    fn test_finish_from_terminal_is_stable() {
        let mut session = PaymentSession::new();
        session.transition(SessionPhase::Creating).unwrap();
        session.finish(SessionPhase::Failed);
        assert_eq!(session.phase(), SessionPhase::Failed);
        // finishing again must not change the resolved phase
        session.finish(SessionPhase::Canceled);
        assert_eq!(session.phase(), SessionPhase::Failed);
    }

    #[test]
    fn test_debug_output_reports_progress() {
        let mut session = PaymentSession::new();
        session.transition(SessionPhase::Creating).unwrap();
        session.record_attempt();
        let rendered = format!("{session:?}");
        assert!(rendered.contains("Creating"));
        assert!(rendered.contains("attempts: 1"));
    }

    #[test]
    fn test_attempt_counter() {
        let mut session = PaymentSession::new();
        assert_eq!(session.record_attempt(), 1);
        assert_eq!(session.record_attempt(), 2);
        assert_eq!(session.attempts(), 2);
    }
}
