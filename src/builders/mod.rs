//! Builders
//!
//! Fluent builder patterns for provider configuration.

pub mod config;

pub use config::{paypal_config, PayPalConfigBuilder};
