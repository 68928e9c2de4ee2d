//! Error types for the checkout flow

use thiserror::Error;

/// Checkout error types
///
/// Initialization, readiness, and validation errors are recoverable: the
/// checkout surface stays open and the caller may retry. Processor and
/// backend-declared failures end the session but not the application.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Payment widget failed to initialize or mount
    #[error("Payment system failed to initialize: {0}")]
    Initialization(String),

    /// No payment widget mounted for this session
    #[error("Payment system not ready")]
    NotReady,

    /// Invalid cart or payment details
    #[error("Validation error: {0}")]
    Validation(String),

    /// Commerce backend refused to create the sale transaction
    #[error("Transaction creation failed")]
    TransactionCreation,

    /// Payment processor declined confirmation; carries the processor's message
    #[error("Payment failed: {0}")]
    Processor(String),

    /// Backend reported a terminal failure status; carries the literal status
    #[error("Payment was declined with status '{0}'")]
    Declined(String),

    /// Attempt cap exhausted while the payment was still pending
    #[error("Payment verification timed out")]
    VerificationTimeout,

    /// Attempted phase transition the session state machine forbids
    #[error("Invalid session state: {0}")]
    State(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for CheckoutError {
    fn from(err: reqwest::Error) -> Self {
        CheckoutError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        CheckoutError::Serialization(err.to_string())
    }
}

/// Result type for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;

impl CheckoutError {
    /// Recoverable errors keep the session open for another attempt.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Initialization(_) | Self::NotReady | Self::Validation(_)
        )
    }
}
