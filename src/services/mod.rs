//! PayPal API services.
//!
//! Thin endpoint wrappers grouped by resource, each borrowing a [`PayPalClient`].
//!
//! [`PayPalClient`]: crate::client::PayPalClient

pub mod billing;
pub mod identity;
pub mod orders;
pub mod payments;
pub mod payouts;
pub mod subscriptions;
pub mod transactions;
pub mod vault;
pub mod webhooks;

pub use billing::BillingService;
pub use identity::IdentityService;
pub use orders::OrdersService;
pub use payments::PaymentsService;
pub use payouts::PayoutsService;
pub use subscriptions::SubscriptionsService;
pub use transactions::TransactionsService;
pub use vault::VaultService;
pub use webhooks::WebhooksService;
