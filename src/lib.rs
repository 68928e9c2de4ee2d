//! Checkout Payment Confirmation for the Tillpoint Retail Suite
//!
//! Orchestrates a point-of-sale checkout against a commerce backend and a
//! client-side payment processor SDK: create a payment intent, confirm it,
//! then poll until the payment reaches a terminal state.
//!
//! ## Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Checkout Orchestrator                        │
//! │                                                              │
//! │  begin() ──► creating ──► confirming ──► polling ──► done    │
//! │                 │             │             │                │
//! │                 ▼             ▼             ▼                │
//! │          Commerce        Processor      Commerce             │
//! │          Backend         SDK confirm    Backend status       │
//! │          (create sale)                  (poll w/ backoff)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tillpoint_checkout::{
//!     BackendConfig, CartItem, CartSnapshot, CheckoutOrchestrator, CheckoutRequest,
//!     ElementKind, ElementStyle, HttpCommerceBackend, Money, PaymentMethodDetails,
//! };
//!
//! let backend = HttpCommerceBackend::new(BackendConfig::from_env()?);
//! let orchestrator = CheckoutOrchestrator::new(backend, gateway);
//!
//! let cart = CartSnapshot::new(vec![CartItem::new("sku-1", 2, Money::usd(1050))]);
//! let outcome = orchestrator
//!     .checkout(
//!         CheckoutRequest::Cart(cart),
//!         ElementKind::Card,
//!         &ElementStyle::default(),
//!         "#payment-element",
//!         &PaymentMethodDetails::default(),
//!     )
//!     .await;
//! ```

pub mod backend;
pub mod cart;
pub mod config;
pub mod error;
pub mod gateway;
pub mod money;
pub mod orchestrator;
pub mod schedule;
pub mod session;
pub mod status;

pub use backend::{CommerceBackend, CreatedTransaction, HttpCommerceBackend};
pub use cart::{CartItem, CartSnapshot};
pub use config::{BackendConfig, CheckoutConfig};
pub use error::{CheckoutError, CheckoutResult};
pub use gateway::{
    ElementBinding, ElementKind, ElementStyle, GatewayError, PaymentElement, PaymentGateway,
    PaymentMethodDetails,
};
pub use money::{Currency, Money};
pub use orchestrator::{CheckoutOrchestrator, CheckoutRequest};
pub use schedule::PollSchedule;
pub use session::{CancelToken, PaymentSession};
pub use status::{CheckoutOutcome, PaymentIntent, PaymentStatus, SaleTransaction, SessionPhase};
