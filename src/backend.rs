//! Commerce backend abstraction and HTTP implementation
//!
//! The backend owns sale transactions and proxies payment-intent state from
//! the processor. The orchestrator only ever needs three calls: create a
//! transaction, look up a payment status, and best-effort cancel.

use crate::cart::CartSnapshot;
use crate::config::BackendConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::money::{Currency, Money};
use crate::status::{PaymentIntent, PaymentStatus, SaleTransaction};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A freshly created sale transaction with its payment intent
#[derive(Debug, Clone)]
pub struct CreatedTransaction {
    /// The backend's sale transaction record
    pub transaction: SaleTransaction,
    /// Intent to confirm client-side
    pub intent: PaymentIntent,
}

/// Commerce backend operations the orchestrator depends on
#[async_trait]
pub trait CommerceBackend: Send + Sync {
    /// Create a sale transaction for the cart and return its payment intent.
    /// Any non-2xx response maps to a generic creation error.
    async fn create_transaction(&self, cart: &CartSnapshot) -> CheckoutResult<CreatedTransaction>;

    /// Look up the current status of a payment intent
    async fn payment_status(&self, payment_intent_id: &str) -> CheckoutResult<PaymentStatus>;

    /// Ask the backend to cancel a payment intent. Callers treat this as
    /// best-effort; failures are logged, never surfaced.
    async fn cancel_payment(
        &self,
        payment_intent_id: &str,
        client_secret: &str,
    ) -> CheckoutResult<()>;
}

/// HTTP client for the Tillpoint commerce backend
pub struct HttpCommerceBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpCommerceBackend {
    /// Create a backend client from connection settings
    pub fn new(config: BackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> CheckoutResult<reqwest::Url> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| CheckoutError::Config(format!("invalid endpoint path: {e}")))
    }
}

#[async_trait]
impl CommerceBackend for HttpCommerceBackend {
    async fn create_transaction(&self, cart: &CartSnapshot) -> CheckoutResult<CreatedTransaction> {
        let url = self.endpoint("v1/sales")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(cart)
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Sale transaction creation rejected");
            return Err(CheckoutError::TransactionCreation);
        }

        let body: ApiCreatedSale = response.json().await?;
        Ok(body.into())
    }

    async fn payment_status(&self, payment_intent_id: &str) -> CheckoutResult<PaymentStatus> {
        let url = self.endpoint(&format!("v1/payments/{payment_intent_id}/status"))?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CheckoutError::Network(format!(
                "status lookup returned {}",
                response.status()
            )));
        }

        let body: ApiPaymentStatus = response.json().await?;
        Ok(PaymentStatus::parse(&body.status))
    }

    async fn cancel_payment(
        &self,
        payment_intent_id: &str,
        client_secret: &str,
    ) -> CheckoutResult<()> {
        let url = self.endpoint(&format!("v1/payments/{payment_intent_id}/cancel"))?;
        self.client
            .post(url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&ApiCancelRequest { client_secret })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| CheckoutError::Network(e.to_string()))?;
        Ok(())
    }
}

// Backend wire types

#[derive(Debug, Deserialize)]
struct ApiCreatedSale {
    transaction: ApiTransaction,
    payment_intent: ApiPaymentIntent,
}

#[derive(Debug, Deserialize)]
struct ApiTransaction {
    id: String,
    reference: String,
    total_minor: i64,
    currency: String,
    created: i64,
}

#[derive(Debug, Deserialize)]
struct ApiPaymentIntent {
    payment_intent_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ApiPaymentStatus {
    status: String,
}

#[derive(Debug, Serialize)]
struct ApiCancelRequest<'a> {
    client_secret: &'a str,
}

impl From<ApiCreatedSale> for CreatedTransaction {
    fn from(body: ApiCreatedSale) -> Self {
        let currency = Currency::from_code(&body.transaction.currency).unwrap_or_default();
        Self {
            transaction: SaleTransaction {
                id: body.transaction.id,
                reference: body.transaction.reference,
                total: Money::new(body.transaction.total_minor, currency),
                created_at: Utc
                    .timestamp_opt(body.transaction.created, 0)
                    .single()
                    .unwrap_or_else(Utc::now),
            },
            intent: PaymentIntent::new(
                body.payment_intent.payment_intent_id,
                body.payment_intent.client_secret,
            ),
        }
    }
}
