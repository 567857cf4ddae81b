//! Configuration Types
//!
//! Credential sets for each supported provider.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::ConfigurationError;

/// PayPal sandbox API base.
pub const API_BASE_SANDBOX: &str = "https://api.sandbox.paypal.com";

/// PayPal live API base.
pub const API_BASE_LIVE: &str = "https://api.paypal.com";

/// Stripe API base.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Refresh a held token when less than this much lifetime remains.
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(60);

/// PayPal client configuration.
#[derive(Clone)]
pub struct PayPalConfig {
    /// Application client id.
    pub client_id: String,
    /// Application secret.
    pub client_secret: SecretString,
    /// API base, usually [`API_BASE_SANDBOX`] or [`API_BASE_LIVE`].
    pub api_base: String,
    /// Remaining lifetime below which a held token is refreshed before use.
    pub refresh_threshold: Duration,
    /// Per-request timeout applied by the default transport. `None` leaves
    /// timing to the caller.
    pub timeout: Option<Duration>,
}

impl PayPalConfig {
    /// Create a configuration with the default refresh threshold and no timeout.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            api_base: api_base.into(),
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            timeout: None,
        }
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.client_id.is_empty() {
            return Err(ConfigurationError::MissingField { field: "client_id" });
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(ConfigurationError::MissingField {
                field: "client_secret",
            });
        }
        validate_api_base(&self.api_base)
    }

    /// API base without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }
}

impl fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("refresh_threshold", &self.refresh_threshold)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Stripe client configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key, sent as a bearer credential.
    pub secret_key: SecretString,
    /// API base, [`STRIPE_API_BASE`] unless overridden.
    pub api_base: String,
}

impl StripeConfig {
    /// Create a configuration against the public Stripe API.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            api_base: STRIPE_API_BASE.to_string(),
        }
    }

    /// Override the API base.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.secret_key.expose_secret().is_empty() {
            return Err(ConfigurationError::MissingField {
                field: "secret_key",
            });
        }
        validate_api_base(&self.api_base)
    }
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Plaid deployment environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaidEnvironment {
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    /// API base for the environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.plaid.com",
            Self::Development => "https://development.plaid.com",
            Self::Production => "https://production.plaid.com",
        }
    }
}

/// Plaid client configuration.
#[derive(Clone)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: SecretString,
    pub environment: PlaidEnvironment,
    /// Overrides the environment's API base when set.
    pub api_base: Option<String>,
}

impl PlaidConfig {
    pub fn new(
        client_id: impl Into<String>,
        secret: impl Into<String>,
        environment: PlaidEnvironment,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            secret: SecretString::new(secret.into()),
            environment,
            api_base: None,
        }
    }

    /// Override the API base.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Effective API base without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.client_id.is_empty() {
            return Err(ConfigurationError::MissingField { field: "client_id" });
        }
        if self.secret.expose_secret().is_empty() {
            return Err(ConfigurationError::MissingField { field: "secret" });
        }
        validate_api_base(self.base_url())
    }
}

impl fmt::Debug for PlaidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaidConfig")
            .field("client_id", &self.client_id)
            .field("secret", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Provider selection plus its credentials.
#[derive(Clone, Debug)]
pub enum PaymentConfig {
    PayPal(PayPalConfig),
    Stripe(StripeConfig),
    Plaid(PlaidConfig),
}

impl PaymentConfig {
    /// Check required fields of the selected provider.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Self::PayPal(c) => c.validate(),
            Self::Stripe(c) => c.validate(),
            Self::Plaid(c) => c.validate(),
        }
    }

    /// Deterministic content hash of the configuration, hex encoded.
    ///
    /// Equal configurations always produce the same fingerprint; any change to a
    /// credential, API base or tuning value produces a different one.
    pub fn fingerprint(&self) -> String {
        let view = match self {
            Self::PayPal(c) => FingerprintView::PayPal {
                client_id: &c.client_id,
                client_secret: c.client_secret.expose_secret(),
                api_base: &c.api_base,
                refresh_threshold_ms: c.refresh_threshold.as_millis() as u64,
                timeout_ms: c.timeout.map(|t| t.as_millis() as u64),
            },
            Self::Stripe(c) => FingerprintView::Stripe {
                secret_key: c.secret_key.expose_secret(),
                api_base: &c.api_base,
            },
            Self::Plaid(c) => FingerprintView::Plaid {
                client_id: &c.client_id,
                secret: c.secret.expose_secret(),
                environment: c.environment,
                api_base: c.api_base.as_deref(),
            },
        };
        // Serializing borrowed strings and integers cannot fail.
        let serialized = serde_json::to_vec(&view).unwrap_or_default();
        hex::encode(Sha256::digest(&serialized))
    }
}

impl From<PayPalConfig> for PaymentConfig {
    fn from(config: PayPalConfig) -> Self {
        Self::PayPal(config)
    }
}

impl From<StripeConfig> for PaymentConfig {
    fn from(config: StripeConfig) -> Self {
        Self::Stripe(config)
    }
}

impl From<PlaidConfig> for PaymentConfig {
    fn from(config: PlaidConfig) -> Self {
        Self::Plaid(config)
    }
}

#[derive(Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
enum FingerprintView<'a> {
    PayPal {
        client_id: &'a str,
        client_secret: &'a str,
        api_base: &'a str,
        refresh_threshold_ms: u64,
        timeout_ms: Option<u64>,
    },
    Stripe {
        secret_key: &'a str,
        api_base: &'a str,
    },
    Plaid {
        client_id: &'a str,
        secret: &'a str,
        environment: PlaidEnvironment,
        api_base: Option<&'a str>,
    },
}

fn validate_api_base(api_base: &str) -> Result<(), ConfigurationError> {
    if api_base.is_empty() {
        return Err(ConfigurationError::MissingField { field: "api_base" });
    }
    match Url::parse(api_base) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(ConfigurationError::InvalidApiBase {
            url: api_base.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paypal_config_defaults() {
        let config = PayPalConfig::new("id", "secret", API_BASE_SANDBOX);
        assert_eq!(config.refresh_threshold, Duration::from_secs(60));
        assert!(config.timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_client_id() {
        let config = PayPalConfig::new("", "secret", API_BASE_SANDBOX);
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingField { field: "client_id" })
        ));
    }

    #[test]
    fn test_invalid_api_base() {
        let config = PayPalConfig::new("id", "secret", "not a url");
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidApiBase { .. })
        ));
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let config = PayPalConfig::new("id", "secret", "https://api.sandbox.paypal.com/");
        assert_eq!(config.base_url(), API_BASE_SANDBOX);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = PayPalConfig::new("id", "super-secret", API_BASE_LIVE);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = PaymentConfig::from(PayPalConfig::new("id", "secret", API_BASE_SANDBOX));
        let b = PaymentConfig::from(PayPalConfig::new("id", "secret", API_BASE_SANDBOX));
        let c = PaymentConfig::from(PayPalConfig::new("id", "other", API_BASE_SANDBOX));

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_fingerprint_distinguishes_providers() {
        let stripe = PaymentConfig::from(StripeConfig::new("sk_test"));
        let plaid = PaymentConfig::from(PlaidConfig::new(
            "sk_test",
            "sk_test",
            PlaidEnvironment::Sandbox,
        ));
        assert_ne!(stripe.fingerprint(), plaid.fingerprint());
    }

    #[test]
    fn test_plaid_base_url_override() {
        let config = PlaidConfig::new("id", "secret", PlaidEnvironment::Production);
        assert_eq!(config.base_url(), "https://production.plaid.com");

        let config = config.with_api_base("http://127.0.0.1:9000/");
        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
    }
}
