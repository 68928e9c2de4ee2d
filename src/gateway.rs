//! Payment processor SDK seam
//!
//! The real processor SDK lives on the client surface and performs the
//! cryptographic confirmation; this module only defines the capability the
//! orchestrator needs from it: create a payment input widget, mount and
//! unmount it, and confirm a payment intent with its client secret.

use crate::error::{CheckoutError, CheckoutResult};
use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

/// Kind of payment input widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Card number / expiry / CVC entry
    Card,
    /// Processor-rendered wallet button (Apple Pay, Google Pay)
    WalletButton,
}

/// Visual styling passed through to the widget
#[derive(Debug, Clone, Default)]
pub struct ElementStyle {
    pub theme: Option<String>,
    pub font_family: Option<String>,
}

/// Details collected alongside the widget for confirmation
#[derive(Debug, Clone, Default)]
pub struct PaymentMethodDetails {
    pub cardholder_name: Option<String>,
    pub postal_code: Option<String>,
}

/// Errors the processor SDK reports from a confirmation call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Processor declined the payment; message is surfaced verbatim
    #[error("{0}")]
    Declined(String),
    /// The entered payment details are invalid; the session stays open
    #[error("{0}")]
    Validation(String),
    /// Transport failure talking to the processor
    #[error("Network error: {0}")]
    Network(String),
}

/// A mounted payment input widget
pub trait PaymentElement: Send {
    /// Attach the widget to the hosting surface
    fn mount(&mut self, target: &str) -> CheckoutResult<()>;

    /// Detach the widget and release its resources
    fn unmount(&mut self);
}

/// Client-side capability of the payment processor SDK
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Processor name, for logging
    fn name(&self) -> &'static str;

    /// Create a payment input widget
    fn create_element(
        &self,
        kind: ElementKind,
        style: &ElementStyle,
    ) -> CheckoutResult<Box<dyn PaymentElement>>;

    /// Confirm a payment intent against the processor
    async fn confirm(
        &self,
        client_secret: &SecretString,
        details: &PaymentMethodDetails,
    ) -> Result<(), GatewayError>;
}

/// Scoped holder for a session's widget
///
/// Guarantees `unmount` runs exactly once per session on every exit path,
/// including Drop when the hosting surface tears down mid-flight, and is a
/// no-op when no widget was ever mounted.
pub struct ElementBinding {
    element: Option<Box<dyn PaymentElement>>,
    mounted: bool,
    released: bool,
}

impl ElementBinding {
    pub fn empty() -> Self {
        Self {
            element: None,
            mounted: false,
            released: false,
        }
    }

    /// Take ownership of a widget and mount it
    pub fn mount(&mut self, mut element: Box<dyn PaymentElement>, target: &str) -> CheckoutResult<()> {
        if self.element.is_some() {
            return Err(CheckoutError::State(
                "a payment widget is already mounted".to_string(),
            ));
        }
        if self.released {
            return Err(CheckoutError::State(
                "session widget already released".to_string(),
            ));
        }
        element.mount(target)?;
        self.element = Some(element);
        self.mounted = true;
        Ok(())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted && !self.released
    }

    /// Unmount the widget if one was mounted; idempotent
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.mounted
            && let Some(element) = self.element.as_mut()
        {
            element.unmount();
        }
        self.element = None;
    }
}

impl Drop for ElementBinding {
    fn drop(&mut self) {
        self.release();
    }
}

impl Default for ElementBinding {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingElement {
        mounts: Arc<AtomicU32>,
        unmounts: Arc<AtomicU32>,
    }

    impl PaymentElement for CountingElement {
        fn mount(&mut self, _target: &str) -> CheckoutResult<()> {
            self.mounts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn unmount(&mut self) {
            self.unmounts.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting() -> (Box<CountingElement>, Arc<AtomicU32>, Arc<AtomicU32>) {
        let mounts = Arc::new(AtomicU32::new(0));
        let unmounts = Arc::new(AtomicU32::new(0));
        (
            Box::new(CountingElement {
                mounts: mounts.clone(),
                unmounts: unmounts.clone(),
            }),
            mounts,
            unmounts,
        )
    }

    #[test]
    fn test_release_unmounts_once() {
        let (element, mounts, unmounts) = counting();
        let mut binding = ElementBinding::empty();
        binding.mount(element, "#payment").unwrap();
        assert!(binding.is_mounted());
        assert_eq!(mounts.load(Ordering::SeqCst), 1);

        binding.release();
        binding.release();
        assert_eq!(unmounts.load(Ordering::SeqCst), 1);
        assert!(!binding.is_mounted());
    }

    #[test]
    fn test_drop_releases() {
        let (element, _, unmounts) = counting();
        {
            let mut binding = ElementBinding::empty();
            binding.mount(element, "#payment").unwrap();
        }
        assert_eq!(unmounts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_then_drop_unmounts_once() {
        let (element, _, unmounts) = counting();
        {
            let mut binding = ElementBinding::empty();
            binding.mount(element, "#payment").unwrap();
            binding.release();
        }
        assert_eq!(unmounts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_noop_without_mount() {
        let mut binding = ElementBinding::empty();
        binding.release();
        assert!(!binding.is_mounted());
    }

    #[test]
    fn test_double_mount_rejected() {
        let (first, _, _) = counting();
        let (second, _, _) = counting();
        let mut binding = ElementBinding::empty();
        binding.mount(first, "#payment").unwrap();
        assert!(matches!(
            binding.mount(second, "#payment"),
            Err(CheckoutError::State(_))
        ));
    }
}
