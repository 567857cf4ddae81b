//! Provider selection.

use std::sync::Arc;

use crate::client::PayPalClient;
use crate::core::HttpTransport;
use crate::error::PaymentResult;
use crate::plaid::PlaidClient;
use crate::stripe::StripeClient;
use crate::types::PaymentConfig;

/// A constructed client for one of the supported providers.
///
/// Clones share the underlying client, and with it the token state.
#[derive(Clone, Debug)]
pub enum PaymentProvider {
    PayPal(Arc<PayPalClient>),
    Stripe(Arc<StripeClient>),
    Plaid(Arc<PlaidClient>),
}

impl PaymentProvider {
    /// Build the client selected by `config` with the default transport.
    pub fn from_config(config: &PaymentConfig) -> PaymentResult<Self> {
        Ok(match config.clone() {
            PaymentConfig::PayPal(c) => Self::PayPal(Arc::new(PayPalClient::new(c)?)),
            PaymentConfig::Stripe(c) => Self::Stripe(Arc::new(StripeClient::new(c)?)),
            PaymentConfig::Plaid(c) => Self::Plaid(Arc::new(PlaidClient::new(c)?)),
        })
    }

    /// Build the client selected by `config` on top of `transport`.
    pub fn with_transport(
        config: &PaymentConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> PaymentResult<Self> {
        Ok(match config.clone() {
            PaymentConfig::PayPal(c) => {
                Self::PayPal(Arc::new(PayPalClient::with_transport(c, transport)?))
            }
            PaymentConfig::Stripe(c) => {
                Self::Stripe(Arc::new(StripeClient::with_transport(c, transport)?))
            }
            PaymentConfig::Plaid(c) => {
                Self::Plaid(Arc::new(PlaidClient::with_transport(c, transport)?))
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PayPal(_) => "paypal",
            Self::Stripe(_) => "stripe",
            Self::Plaid(_) => "plaid",
        }
    }

    pub fn as_paypal(&self) -> Option<&Arc<PayPalClient>> {
        match self {
            Self::PayPal(client) => Some(client),
            _ => None,
        }
    }

    pub fn as_stripe(&self) -> Option<&Arc<StripeClient>> {
        match self {
            Self::Stripe(client) => Some(client),
            _ => None,
        }
    }

    pub fn as_plaid(&self) -> Option<&Arc<PlaidClient>> {
        match self {
            Self::Plaid(client) => Some(client),
            _ => None,
        }
    }

    /// True when both handles point at the same client instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::PayPal(a), Self::PayPal(b)) => Arc::ptr_eq(a, b),
            (Self::Stripe(a), Self::Stripe(b)) => Arc::ptr_eq(a, b),
            (Self::Plaid(a), Self::Plaid(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<PayPalClient> for PaymentProvider {
    fn from(client: PayPalClient) -> Self {
        Self::PayPal(Arc::new(client))
    }
}

impl From<StripeClient> for PaymentProvider {
    fn from(client: StripeClient) -> Self {
        Self::Stripe(Arc::new(client))
    }
}

impl From<PlaidClient> for PaymentProvider {
    fn from(client: PlaidClient) -> Self {
        Self::Plaid(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockHttpTransport;
    use crate::error::{ConfigurationError, PaymentError};
    use crate::types::{PayPalConfig, PlaidConfig, PlaidEnvironment, StripeConfig};

    #[test]
    fn test_config_selects_variant() {
        let transport = Arc::new(MockHttpTransport::new());

        let paypal = PaymentProvider::with_transport(
            &PayPalConfig::new("id", "secret", "https://api.test").into(),
            transport.clone(),
        )
        .unwrap();
        assert_eq!(paypal.name(), "paypal");
        assert!(paypal.as_paypal().is_some());

        let stripe =
            PaymentProvider::with_transport(&StripeConfig::new("sk_test").into(), transport.clone())
                .unwrap();
        assert!(stripe.as_stripe().is_some());
        assert!(stripe.as_paypal().is_none());

        let plaid = PaymentProvider::with_transport(
            &PlaidConfig::new("id", "secret", PlaidEnvironment::Sandbox).into(),
            transport,
        )
        .unwrap();
        assert_eq!(plaid.name(), "plaid");
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let result = PaymentProvider::with_transport(
            &PlaidConfig::new("id", "", PlaidEnvironment::Sandbox).into(),
            Arc::new(MockHttpTransport::new()),
        );
        assert!(matches!(
            result,
            Err(PaymentError::Configuration(ConfigurationError::MissingField {
                field: "secret"
            }))
        ));
    }

    #[test]
    fn test_clones_share_instance() {
        let provider = PaymentProvider::with_transport(
            &StripeConfig::new("sk_test").into(),
            Arc::new(MockHttpTransport::new()),
        )
        .unwrap();
        assert!(provider.same_instance(&provider.clone()));

        let other = PaymentProvider::with_transport(
            &StripeConfig::new("sk_test").into(),
            Arc::new(MockHttpTransport::new()),
        )
        .unwrap();
        assert!(!provider.same_instance(&other));
    }
}
