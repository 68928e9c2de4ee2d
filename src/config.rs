//! Checkout and backend configuration

use crate::error::{CheckoutError, CheckoutResult};
use crate::schedule::PollSchedule;
use secrecy::SecretString;
use std::env;
use std::time::Duration;
use url::Url;

/// Orchestrator configuration
#[derive(Debug, Clone, Default)]
pub struct CheckoutConfig {
    /// Delay schedule and attempt cap for verification polling
    pub schedule: PollSchedule,
}

impl CheckoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the poll schedule
    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }
}

/// Commerce backend connection settings
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the commerce backend API
    pub base_url: Url,
    /// Bearer token for backend requests
    pub api_key: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    /// Build a config, validating the base URL
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>) -> CheckoutResult<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| CheckoutError::Config(format!("invalid base URL: {e}")))?;
        Ok(Self {
            base_url,
            api_key: SecretString::new(api_key.into().into()),
            timeout: Duration::from_secs(30),
        })
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read settings from `TILLPOINT_API_URL`, `TILLPOINT_API_KEY`, and
    /// optionally `TILLPOINT_HTTP_TIMEOUT_SECS`
    pub fn from_env() -> CheckoutResult<Self> {
        let base_url = env::var("TILLPOINT_API_URL")
            .map_err(|_| CheckoutError::Config("TILLPOINT_API_URL not set".to_string()))?;
        let api_key = env::var("TILLPOINT_API_KEY")
            .map_err(|_| CheckoutError::Config("TILLPOINT_API_KEY not set".to_string()))?;

        let mut config = Self::new(base_url, api_key)?;
        if let Ok(secs) = env::var("TILLPOINT_HTTP_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
        {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("https://api.tillpoint.test", "sk_test_123").unwrap();
        assert_eq!(config.base_url.as_str(), "https://api.tillpoint.test/");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = BackendConfig::new("not a url", "sk_test_123");
        assert!(matches!(result, Err(CheckoutError::Config(_))));
    }

    #[test]
    fn test_timeout_override() {
        let config = BackendConfig::new("https://api.tillpoint.test", "k")
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_checkout_config_schedule_override() {
        let config = CheckoutConfig::new()
            .with_schedule(PollSchedule::constant(Duration::from_millis(10), 3));
        assert_eq!(config.schedule.max_attempts(), 3);
    }
}
