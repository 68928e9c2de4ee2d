//! Payment confirmation orchestrator
//!
//! Drives one checkout session through its lifecycle: create a sale
//! transaction (or adopt a pre-created intent), confirm the payment through
//! the processor SDK, then poll the commerce backend until the payment
//! reaches a terminal status. Polling is an explicit sequential loop with at
//! most one status request in flight; cancellation is cooperative via the
//! session's token and is observed both before a check is issued and before
//! a delivered result is acted on.

use crate::backend::CommerceBackend;
use crate::cart::CartSnapshot;
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::gateway::{ElementKind, ElementStyle, GatewayError, PaymentGateway, PaymentMethodDetails};
use crate::session::{CancelToken, PaymentSession};
use crate::status::{CheckoutOutcome, PaymentIntent, PaymentStatus, SessionPhase};
use secrecy::ExposeSecret;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Input to a new checkout session
pub enum CheckoutRequest {
    /// Create a sale transaction for this cart first
    Cart(CartSnapshot),
    /// Confirm an intent the backend already created
    Intent(PaymentIntent),
}

/// Orchestrates checkout sessions against a commerce backend and a payment
/// processor gateway
pub struct CheckoutOrchestrator<B, G> {
    backend: Arc<B>,
    gateway: Arc<G>,
    config: CheckoutConfig,
    /// Cancellation signal of the most recently started session. Starting a
    /// new session invalidates the previous one.
    active: Mutex<Option<CancelToken>>,
}

impl<B, G> CheckoutOrchestrator<B, G>
where
    B: CommerceBackend + 'static,
    G: PaymentGateway,
{
    pub fn new(backend: B, gateway: G) -> Self {
        Self::with_config(backend, gateway, CheckoutConfig::default())
    }

    pub fn with_config(backend: B, gateway: G, config: CheckoutConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            gateway: Arc::new(gateway),
            config,
            active: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Get the commerce backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get the payment gateway
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Start a checkout session
    ///
    /// A cart request validates the cart and creates a sale transaction; a
    /// pre-created intent skips straight to the confirmable state. Either
    /// way the returned session sits in `confirming`, ready for [`pay`].
    ///
    /// [`pay`]: Self::pay
    pub async fn begin(&self, request: CheckoutRequest) -> CheckoutResult<PaymentSession> {
        let mut session = PaymentSession::new();
        self.register(&session);

        match request {
            CheckoutRequest::Cart(cart) => {
                cart.validate()?;
                session.transition(SessionPhase::Creating)?;
                match self.backend.create_transaction(&cart).await {
                    Ok(created) => {
                        debug!(
                            session = %session.id(),
                            transaction = %created.transaction.id,
                            "Sale transaction created"
                        );
                        session.set_transaction(created.transaction);
                        session.set_intent(created.intent);
                        session.transition(SessionPhase::Confirming)?;
                    }
                    Err(e) => {
                        warn!(session = %session.id(), error = %e, "Transaction creation failed");
                        session.record_error(CheckoutError::TransactionCreation.to_string());
                        session.finish(SessionPhase::Failed);
                        return Err(CheckoutError::TransactionCreation);
                    }
                }
            }
            CheckoutRequest::Intent(intent) => {
                session.set_intent(intent);
                session.transition(SessionPhase::Confirming)?;
            }
        }

        Ok(session)
    }

    /// Create a payment widget through the gateway and mount it on the
    /// session. The widget stays exclusive to this session until release.
    pub fn mount_element(
        &self,
        session: &mut PaymentSession,
        kind: ElementKind,
        style: &ElementStyle,
        target: &str,
    ) -> CheckoutResult<()> {
        let element = self
            .gateway
            .create_element(kind, style)
            .map_err(|e| CheckoutError::Initialization(e.to_string()))?;
        session.element.mount(element, target)
    }

    /// Confirm the payment and poll until a terminal status
    ///
    /// Readiness and validation errors are returned as recoverable `Err`s
    /// and leave the session in `confirming`; every other path resolves the
    /// session and returns the emitted outcome.
    pub async fn pay(
        &self,
        session: &mut PaymentSession,
        details: &PaymentMethodDetails,
    ) -> CheckoutResult<CheckoutOutcome> {
        if session.is_canceled() {
            return Ok(self.resolve_canceled(session));
        }
        if session.phase() != SessionPhase::Confirming {
            return Err(CheckoutError::State(format!(
                "cannot pay from {}",
                session.phase()
            )));
        }
        if !session.element.is_mounted() {
            return Err(CheckoutError::NotReady);
        }
        let intent = session
            .intent()
            .cloned()
            .ok_or_else(|| CheckoutError::State("session has no payment intent".to_string()))?;

        match self.gateway.confirm(&intent.client_secret, details).await {
            Ok(()) => {}
            Err(GatewayError::Validation(message)) => {
                session.record_error(&message);
                return Err(CheckoutError::Validation(message));
            }
            Err(GatewayError::Declined(message)) => {
                debug!(session = %session.id(), gateway = self.gateway.name(), "Confirmation declined");
                session.record_error(&message);
                session.finish(SessionPhase::Failed);
                return Ok(CheckoutOutcome::Failed { message });
            }
            Err(GatewayError::Network(message)) => {
                let message = CheckoutError::Processor(message).to_string();
                session.record_error(&message);
                session.finish(SessionPhase::Failed);
                return Ok(CheckoutOutcome::Failed { message });
            }
        }

        if session.is_canceled() {
            return Ok(self.resolve_canceled(session));
        }
        session.transition(SessionPhase::Polling)?;
        Ok(self
            .poll_until_terminal(session, &intent.payment_intent_id)
            .await)
    }

    /// Cancel a session: stop any polling, best-effort notify the backend,
    /// release the widget. Cancelling an already resolved session changes
    /// nothing.
    pub async fn cancel(&self, session: &mut PaymentSession) -> CheckoutOutcome {
        if session.phase().is_terminal() {
            return self.resolved_outcome(session);
        }
        session.cancel_token().cancel();
        self.resolve_canceled(session)
    }

    /// Single-call entry point: begin, mount, pay, emit one outcome
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
        kind: ElementKind,
        style: &ElementStyle,
        target: &str,
        details: &PaymentMethodDetails,
    ) -> CheckoutOutcome {
        let mut session = match self.begin(request).await {
            Ok(session) => session,
            Err(e) => return CheckoutOutcome::Failed { message: e.to_string() },
        };
        if let Err(e) = self.mount_element(&mut session, kind, style, target) {
            session.record_error(e.to_string());
            session.finish(SessionPhase::Failed);
            return CheckoutOutcome::Failed { message: e.to_string() };
        }
        match self.pay(&mut session, details).await {
            Ok(outcome) => outcome,
            Err(e) => {
                session.record_error(e.to_string());
                session.finish(SessionPhase::Failed);
                CheckoutOutcome::Failed { message: e.to_string() }
            }
        }
    }

    /// Sequential status-check loop
    ///
    /// One request in flight at a time; the next check is scheduled only
    /// after the previous resolves. Transport failures on a single check map
    /// to a neutral `unknown` status and do not end the session. The attempt
    /// cap resolves the session to a synthetic timeout failure without
    /// issuing another request.
    async fn poll_until_terminal(
        &self,
        session: &mut PaymentSession,
        payment_intent_id: &str,
    ) -> CheckoutOutcome {
        let schedule = &self.config.schedule;
        let cancel = session.cancel_token();

        loop {
            if cancel.is_canceled() {
                return self.resolve_canceled(session);
            }

            let status = match self.backend.payment_status(payment_intent_id).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(
                        session = %session.id(),
                        error = %e,
                        "Status check failed, treating as unknown"
                    );
                    PaymentStatus::Unknown
                }
            };
            let attempts = session.record_attempt();

            // A cancel that raced the in-flight check discards its result.
            if cancel.is_canceled() {
                return self.resolve_canceled(session);
            }

            debug!(
                session = %session.id(),
                attempt = attempts,
                status = %status,
                "Payment status check"
            );

            if !status.is_transient() {
                if status == PaymentStatus::Succeeded {
                    session.finish(SessionPhase::Succeeded);
                    return CheckoutOutcome::Succeeded {
                        transaction: session.transaction().cloned(),
                    };
                }
                let message = CheckoutError::Declined(status.as_str().to_string()).to_string();
                session.record_error(&message);
                session.finish(SessionPhase::Failed);
                return CheckoutOutcome::Failed { message };
            }
            if attempts >= schedule.max_attempts() {
                let message = CheckoutError::VerificationTimeout.to_string();
                session.record_error(&message);
                session.finish(SessionPhase::Failed);
                return CheckoutOutcome::Failed { message };
            }

            tokio::time::sleep(schedule.delay_for_attempt(attempts - 1)).await;
        }
    }

    /// Track the newest session's token and invalidate the previous one
    fn register(&self, session: &PaymentSession) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = active.replace(session.cancel_token()) {
            previous.cancel();
        }
    }

    fn resolve_canceled(&self, session: &mut PaymentSession) -> CheckoutOutcome {
        // notify the backend only on the transition into canceled, not when
        // a cancel is observed again on an already resolved session
        if !session.phase().is_terminal()
            && let Some(intent) = session.intent()
        {
            let backend = Arc::clone(&self.backend);
            let payment_intent_id = intent.payment_intent_id.clone();
            let client_secret = intent.client_secret.expose_secret().to_string();
            tokio::spawn(async move {
                if let Err(e) = backend.cancel_payment(&payment_intent_id, &client_secret).await {
                    debug!(error = %e, "Best-effort payment cancel failed");
                }
            });
        }
        session.finish(SessionPhase::Canceled);
        CheckoutOutcome::Canceled
    }

    /// Outcome matching a session that already reached a terminal phase
    fn resolved_outcome(&self, session: &PaymentSession) -> CheckoutOutcome {
        match session.phase() {
            SessionPhase::Succeeded => CheckoutOutcome::Succeeded {
                transaction: session.transaction().cloned(),
            },
            SessionPhase::Canceled => CheckoutOutcome::Canceled,
            _ => CheckoutOutcome::Failed {
                message: session
                    .last_error()
                    .unwrap_or("payment failed")
                    .to_string(),
            },
        }
    }
}
