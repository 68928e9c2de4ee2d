//! Payment status, session phase, and outcome types

use crate::money::Money;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processor-side payment status, as reported by the commerce backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Succeeded,
    Processing,
    RequiresAction,
    RequiresConfirmation,
    RequiresPaymentMethod,
    Canceled,
    Failed,
    /// Anything the backend reports that we do not recognize, including
    /// transport-level lookup failures mapped to a neutral value
    Unknown,
}

impl PaymentStatus {
    /// Parse a backend status string; unrecognized values become `Unknown`
    pub fn parse(s: &str) -> Self {
        match s {
            "succeeded" => Self::Succeeded,
            "processing" => Self::Processing,
            "requires_action" => Self::RequiresAction,
            "requires_confirmation" => Self::RequiresConfirmation,
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "canceled" => Self::Canceled,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Literal status string, used verbatim in failure messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Processing => "processing",
            Self::RequiresAction => "requires_action",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    /// Statuses from which the processor will not move the payment forward
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::RequiresPaymentMethod | Self::Canceled | Self::Failed
        )
    }

    /// Still in flight; keep polling
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Succeeded) && !self.is_terminal_failure()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A processor-side payment intent: opaque id plus the one-time client
/// secret that authorizes client-side confirmation
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    /// Opaque processor identifier
    pub payment_intent_id: String,
    /// One-time confirmation credential; never logged or serialized
    pub client_secret: SecretString,
}

impl PaymentIntent {
    pub fn new(payment_intent_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            payment_intent_id: payment_intent_id.into(),
            client_secret: SecretString::new(client_secret.into().into()),
        }
    }
}

/// Sale transaction reference returned by the commerce backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleTransaction {
    /// Transaction id
    pub id: String,
    /// Human-facing receipt reference
    pub reference: String,
    /// Charged total
    pub total: Money,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Lifecycle phase of a payment session
///
/// Transitions are monotonic: `idle → creating → confirming → polling` with
/// `succeeded`, `failed`, and `canceled` terminal. Sessions started from a
/// pre-created intent skip `creating`. `canceled` is reachable from any
/// non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Creating,
    Confirming,
    Polling,
    Succeeded,
    Failed,
    Canceled,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Whether the state machine permits moving to `next`
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Canceled {
            return true;
        }
        matches!(
            (self, next),
            (Self::Idle, Self::Creating)
                | (Self::Idle, Self::Confirming)
                | (Self::Creating, Self::Confirming)
                | (Self::Creating, Self::Failed)
                | (Self::Confirming, Self::Polling)
                | (Self::Confirming, Self::Failed)
                | (Self::Polling, Self::Succeeded)
                | (Self::Polling, Self::Failed)
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Creating => "creating",
            Self::Confirming => "confirming",
            Self::Polling => "polling",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        };
        write!(f, "{name}")
    }
}

/// Final result of a checkout flow, handed back to the calling surface
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// Payment confirmed and verified
    Succeeded {
        /// The sale transaction, when the session created one
        transaction: Option<SaleTransaction>,
    },
    /// Payment ended in failure; `message` is user-facing
    Failed { message: String },
    /// The user abandoned the session
    Canceled,
}

impl CheckoutOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        assert_eq!(PaymentStatus::parse("succeeded"), PaymentStatus::Succeeded);
        assert_eq!(
            PaymentStatus::parse("requires_payment_method"),
            PaymentStatus::RequiresPaymentMethod
        );
        assert_eq!(PaymentStatus::parse("anything-else"), PaymentStatus::Unknown);
    }

    #[test]
    fn test_terminal_failure_set() {
        assert!(PaymentStatus::Canceled.is_terminal_failure());
        assert!(PaymentStatus::Failed.is_terminal_failure());
        assert!(PaymentStatus::RequiresPaymentMethod.is_terminal_failure());
        assert!(!PaymentStatus::Processing.is_terminal_failure());
        assert!(!PaymentStatus::Succeeded.is_terminal_failure());
    }

    #[test]
    fn test_unknown_is_transient() {
        assert!(PaymentStatus::Unknown.is_transient());
        assert!(PaymentStatus::RequiresAction.is_transient());
        assert!(!PaymentStatus::Succeeded.is_transient());
    }

    // The poll loop keeps going exactly when a status is transient, so
    // every status must be succeeded, a terminal failure, or transient.
    #[test]
    fn test_classification_partitions_statuses() {
        use PaymentStatus::*;
        for status in [
            Succeeded,
            Processing,
            RequiresAction,
            RequiresConfirmation,
            RequiresPaymentMethod,
            Canceled,
            Failed,
            Unknown,
        ] {
            let classes = [
                status == Succeeded,
                status.is_terminal_failure(),
                status.is_transient(),
            ];
            assert_eq!(
                classes.iter().filter(|&&c| c).count(),
                1,
                "{status} must fall in exactly one class"
            );
        }
    }

    #[test]
    fn test_phase_machine_forward_only() {
        use SessionPhase::*;
        assert!(Idle.can_transition_to(Creating));
        assert!(Idle.can_transition_to(Confirming));
        assert!(Creating.can_transition_to(Confirming));
        assert!(Confirming.can_transition_to(Polling));
        assert!(Polling.can_transition_to(Succeeded));

        // no re-entry into creating, no backwards moves
        assert!(!Confirming.can_transition_to(Creating));
        assert!(!Polling.can_transition_to(Confirming));
        assert!(!Polling.can_transition_to(Creating));
    }

    #[test]
    fn test_cancel_from_any_live_phase() {
        use SessionPhase::*;
        for phase in [Idle, Creating, Confirming, Polling] {
            assert!(phase.can_transition_to(Canceled), "{phase} should cancel");
        }
    }

    #[test]
    fn test_terminal_phases_are_final() {
        use SessionPhase::*;
        for phase in [Succeeded, Failed, Canceled] {
            for next in [Idle, Creating, Confirming, Polling, Succeeded, Failed, Canceled] {
                assert!(!phase.can_transition_to(next));
            }
        }
    }
}
