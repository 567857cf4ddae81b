//! Configuration Builder
//!
//! Fluent builder for PayPal configuration.

use secrecy::SecretString;
use std::time::Duration;

use crate::error::{ConfigurationError, PaymentResult};
use crate::types::{PayPalConfig, API_BASE_LIVE, API_BASE_SANDBOX, DEFAULT_REFRESH_THRESHOLD};

/// Environment variable holding the client id.
pub const ENV_CLIENT_ID: &str = "PAYPAL_CLIENT_ID";
/// Environment variable holding the client secret.
pub const ENV_CLIENT_SECRET: &str = "PAYPAL_CLIENT_SECRET";
/// Environment variable holding the API base. Defaults to the sandbox.
pub const ENV_API_BASE: &str = "PAYPAL_API_BASE";

/// PayPal configuration builder.
#[derive(Default)]
pub struct PayPalConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    api_base: Option<String>,
    refresh_threshold: Option<Duration>,
    timeout: Option<Duration>,
}

impl PayPalConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set API base URL.
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Target the sandbox API.
    pub fn sandbox(self) -> Self {
        self.api_base(API_BASE_SANDBOX)
    }

    /// Target the live API.
    pub fn live(self) -> Self {
        self.api_base(API_BASE_LIVE)
    }

    /// Refresh held tokens once their remaining lifetime drops below `threshold`.
    pub fn refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = Some(threshold);
        self
    }

    /// Set request timeout for the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Populate unset fields from the process environment.
    pub fn from_env(self) -> Self {
        self.from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate unset fields from `lookup`.
    pub fn from_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.client_id.is_none() {
            self.client_id = lookup(ENV_CLIENT_ID);
        }
        if self.client_secret.is_none() {
            self.client_secret = lookup(ENV_CLIENT_SECRET).map(SecretString::new);
        }
        if self.api_base.is_none() {
            self.api_base = lookup(ENV_API_BASE);
        }
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PaymentResult<PayPalConfig> {
        let client_id = self
            .client_id
            .ok_or(ConfigurationError::MissingField { field: "client_id" })?;

        let client_secret = self.client_secret.ok_or(ConfigurationError::MissingField {
            field: "client_secret",
        })?;

        let config = PayPalConfig {
            client_id,
            client_secret,
            api_base: self.api_base.unwrap_or_else(|| API_BASE_SANDBOX.to_string()),
            refresh_threshold: self.refresh_threshold.unwrap_or(DEFAULT_REFRESH_THRESHOLD),
            timeout: self.timeout,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Create a new PayPal configuration builder.
pub fn paypal_config() -> PayPalConfigBuilder {
    PayPalConfigBuilder::new()
}
