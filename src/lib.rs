//! Payment Integration Module
//!
//! Clients for PayPal, Stripe and Plaid sharing one authenticated request
//! execution layer.
//!
//! # Features
//!
//! - PayPal client-credentials token held per client and refreshed lazily
//!   before it expires, with one refresh at a time
//! - Authorization-code and refresh-token grants
//! - PayPal services: identity, payouts, payments, orders, billing plans and
//!   agreements, subscriptions, credit card vault, webhooks, transaction search
//! - Stripe balance, top-ups, transfers, bank accounts and payment methods
//! - Plaid items, accounts, institutions, tokens and payment initiation
//! - Provider error bodies normalized into one [`ApiErrorResponse`]
//! - Optional request/response log sink
//! - Bounded session registry keyed by configuration fingerprint
//!
//! # Example
//!
//! ```rust,ignore
//! use payment_integration::{paypal_config, PayPalClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = paypal_config()
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .sandbox()
//!         .build()?;
//!
//!     let client = PayPalClient::new(config)?;
//!     client.get_access_token().await?;
//!
//!     let order = client.orders().get("5O190127TN364715T").await?;
//!     println!("order status: {}", order.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, token state and shared resource types
//! - `error`: error hierarchy and provider error decoding
//! - `core`: HTTP transport, request construction and the request executor
//! - `token`: guarded token state and refresh policy
//! - `client`: the PayPal client and its dispatch helpers
//! - `services`: PayPal endpoint groups
//! - `stripe`, `plaid`: the other provider clients
//! - `provider`, `session`: provider selection and the session registry

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod plaid;
pub mod provider;
pub mod services;
pub mod session;
pub mod stripe;
pub mod telemetry;
pub mod token;
pub mod types;

// Re-export clients
pub use client::{PayPalClient, PayPalClientBuilder, REQUEST_ID_HEADER};
pub use plaid::{PlaidClient, PlaidClientBuilder};
pub use stripe::{StripeClient, StripeClientBuilder};

// Re-export provider selection
pub use provider::PaymentProvider;
pub use session::{SessionRegistry, DEFAULT_SESSION_CAPACITY};

// Re-export builders
pub use builders::{paypal_config, PayPalConfigBuilder};

// Re-export errors
pub use error::{
    ApiErrorResponse, ConfigurationError, ErrorDetail, ErrorFormat, ErrorLink, NetworkError,
    PaymentError, PaymentResult, ProtocolError,
};

// Re-export types
pub use types::{
    // Config
    PayPalConfig, PaymentConfig, PlaidConfig, PlaidEnvironment, StripeConfig, API_BASE_LIVE,
    API_BASE_SANDBOX, DEFAULT_REFRESH_THRESHOLD, STRIPE_API_BASE,
    // Token
    TokenResponse, TokenState,
    // Common
    Address, Amount, Link, Money, Patch,
};

// Re-export core components
pub use core::{
    new_form_request, new_query_request, new_request, HttpMethod, HttpRequest, HttpResponse,
    HttpTransport, MockHttpTransport, RequestExecutor, ReqwestHttpTransport,
};

// Re-export token management
pub use token::{RefreshPolicy, TokenCell};

// Re-export telemetry
pub use telemetry::{InMemoryLogSink, LogSink, TracingLogSink, WriterLogSink};
