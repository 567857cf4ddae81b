//! Payout operations.

use crate::client::PayPalClient;
use crate::error::PaymentResult;
use crate::types::{CurrencyValue, Link};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service for payout operations.
pub struct PayoutsService<'a> {
    client: &'a PayPalClient,
}

impl<'a> PayoutsService<'a> {
    pub fn new(client: &'a PayPalClient) -> Self {
        Self { client }
    }

    /// Creates a batch payout.
    pub async fn create(&self, payout: &Payout) -> PaymentResult<PayoutResponse> {
        self.client.post("/v1/payments/payouts", payout).await
    }

    /// Gets a batch payout.
    pub async fn get(&self, payout_batch_id: &str) -> PaymentResult<PayoutResponse> {
        self.client
            .get(&format!("/v1/payments/payouts/{}", payout_batch_id))
            .await
    }

    /// Gets a single payout item.
    pub async fn get_item(&self, payout_item_id: &str) -> PaymentResult<PayoutItemResponse> {
        self.client
            .get(&format!("/v1/payments/payouts-item/{}", payout_item_id))
            .await
    }

    /// Cancels an unclaimed payout item.
    pub async fn cancel_item(&self, payout_item_id: &str) -> PaymentResult<PayoutItemResponse> {
        self.client
            .post(
                &format!("/v1/payments/payouts-item/{}/cancel", payout_item_id),
                &serde_json::json!({}),
            )
            .await
    }
}

/// Batch payout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub sender_batch_header: SenderBatchHeader,
    pub items: Vec<PayoutItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderBatchHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_batch_id: Option<String>,
}

/// One recipient of a batch payout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutItem {
    /// `EMAIL`, `PHONE` or `PAYPAL_ID`.
    pub recipient_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_wallet: Option<String>,
    pub receiver: String,
    pub amount: CurrencyValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_item_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayoutResponse {
    pub batch_header: Option<BatchHeader>,
    #[serde(default)]
    pub items: Vec<PayoutItemResponse>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchHeader {
    #[serde(default)]
    pub payout_batch_id: String,
    #[serde(default)]
    pub batch_status: String,
    pub amount: Option<CurrencyValue>,
    pub fees: Option<CurrencyValue>,
    pub time_created: Option<DateTime<Utc>>,
    pub time_completed: Option<DateTime<Utc>>,
    pub sender_batch_header: Option<SenderBatchHeader>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayoutItemResponse {
    #[serde(default)]
    pub payout_item_id: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub transaction_status: String,
    pub payout_batch_id: Option<String>,
    pub payout_item_fee: Option<CurrencyValue>,
    pub payout_item: Option<PayoutItem>,
    pub time_processed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub errors: Option<serde_json::Value>,
}
