//! Webhook subscriptions and signature verification.

use crate::client::PayPalClient;
use crate::error::PaymentResult;
use crate::types::{Link, Patch};
use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::debug;

const WEBHOOKS_PATH: &str = "/v1/notifications/webhooks";

/// Anchor used when listing webhooks without an explicit one.
pub const ANCHOR_TYPE_APPLICATION: &str = "APPLICATION";

pub const HEADER_AUTH_ALGO: &str = "paypal-auth-algo";
pub const HEADER_CERT_URL: &str = "paypal-cert-url";
pub const HEADER_TRANSMISSION_ID: &str = "paypal-transmission-id";
pub const HEADER_TRANSMISSION_SIG: &str = "paypal-transmission-sig";
pub const HEADER_TRANSMISSION_TIME: &str = "paypal-transmission-time";

/// Service for webhook operations.
pub struct WebhooksService<'a> {
    client: &'a PayPalClient,
}

impl<'a> WebhooksService<'a> {
    pub fn new(client: &'a PayPalClient) -> Self {
        Self { client }
    }

    /// Subscribes a listener URL to event types.
    pub async fn create(&self, request: &CreateWebhookRequest) -> PaymentResult<Webhook> {
        self.client.post(WEBHOOKS_PATH, request).await
    }

    pub async fn get(&self, webhook_id: &str) -> PaymentResult<Webhook> {
        self.client
            .get(&format!("{}/{}", WEBHOOKS_PATH, webhook_id))
            .await
    }

    /// Replaces webhook fields, typically `/url` or `/event_types`.
    pub async fn update(&self, webhook_id: &str, fields: &[Patch]) -> PaymentResult<Webhook> {
        self.client
            .patch(&format!("{}/{}", WEBHOOKS_PATH, webhook_id), fields)
            .await
    }

    /// Lists webhooks. An empty `anchor_type` lists the application's webhooks.
    pub async fn list(&self, anchor_type: &str) -> PaymentResult<WebhookList> {
        let anchor_type = if anchor_type.is_empty() {
            ANCHOR_TYPE_APPLICATION
        } else {
            anchor_type
        };
        self.client
            .get_with_query(WEBHOOKS_PATH, &[("anchor_type", anchor_type)])
            .await
    }

    pub async fn delete(&self, webhook_id: &str) -> PaymentResult<()> {
        self.client
            .delete(&format!("{}/{}", WEBHOOKS_PATH, webhook_id))
            .await
    }

    /// Lists every event type a webhook can subscribe to.
    pub async fn event_types(&self) -> PaymentResult<WebhookEventTypes> {
        self.client.get("/v1/notifications/webhooks-event-types").await
    }

    /// Asks PayPal whether a received notification was signed by it.
    ///
    /// `headers` and `body` are the notification exactly as received. The body
    /// is forwarded untouched so the signature still matches.
    pub async fn verify_signature(
        &self,
        headers: &HeaderMap,
        body: &[u8],
        webhook_id: &str,
    ) -> PaymentResult<VerifyWebhookResponse> {
        let event: Box<RawValue> = serde_json::from_slice(body)?;
        let request = VerifySignatureRequest {
            auth_algo: header_value(headers, HEADER_AUTH_ALGO),
            cert_url: header_value(headers, HEADER_CERT_URL),
            transmission_id: header_value(headers, HEADER_TRANSMISSION_ID),
            transmission_sig: header_value(headers, HEADER_TRANSMISSION_SIG),
            transmission_time: header_value(headers, HEADER_TRANSMISSION_TIME),
            webhook_id,
            webhook_event: &event,
        };

        debug!(transmission_id = request.transmission_id, "verifying webhook signature");
        self.client
            .post("/v1/notifications/verify-webhook-signature", &request)
            .await
    }
}

fn header_value<'h>(headers: &'h HeaderMap, name: &str) -> &'h str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[derive(Serialize)]
struct VerifySignatureRequest<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    auth_algo: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    cert_url: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    transmission_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    transmission_sig: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    transmission_time: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    webhook_id: &'a str,
    webhook_event: &'a RawValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateWebhookRequest {
    pub url: String,
    pub event_types: Vec<WebhookEventType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookEventType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl WebhookEventType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Webhook {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub event_types: Vec<WebhookEventType>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookList {
    #[serde(default)]
    pub webhooks: Vec<Webhook>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEventTypes {
    #[serde(default)]
    pub event_types: Vec<WebhookEventType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyWebhookResponse {
    /// `SUCCESS` or `FAILURE`.
    #[serde(default)]
    pub verification_status: String,
}

impl VerifyWebhookResponse {
    pub fn is_verified(&self) -> bool {
        self.verification_status == "SUCCESS"
    }
}

/// Notification body delivered to a webhook listener.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub event_type: String,
    pub event_version: Option<String>,
    pub resource_type: Option<String>,
    pub resource_version: Option<String>,
    pub summary: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resource: serde_json::Value,
    #[serde(default)]
    pub links: Vec<Link>,
}
