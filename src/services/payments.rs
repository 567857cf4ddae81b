//! Sale, authorization, capture and refund operations.

use crate::client::PayPalClient;
use crate::core::HttpMethod;
use crate::error::PaymentResult;
use crate::types::{Amount, CurrencyValue, Link, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service for payment operations.
pub struct PaymentsService<'a> {
    client: &'a PayPalClient,
}

impl<'a> PaymentsService<'a> {
    pub fn new(client: &'a PayPalClient) -> Self {
        Self { client }
    }

    // Sales

    /// Gets a sale transaction.
    pub async fn get_sale(&self, sale_id: &str) -> PaymentResult<Sale> {
        self.client
            .get(&format!("/v1/payments/sale/{}", sale_id))
            .await
    }

    /// Refunds a completed sale. `None` refunds the full amount.
    pub async fn refund_sale(&self, sale_id: &str, amount: Option<&Amount>) -> PaymentResult<Refund> {
        #[derive(Serialize)]
        struct RefundRequest<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            amount: Option<&'a Amount>,
        }

        self.client
            .post(
                &format!("/v1/payments/sale/{}/refund", sale_id),
                &RefundRequest { amount },
            )
            .await
    }

    // Authorizations

    /// Gets an authorized payment.
    pub async fn get_authorization(&self, authorization_id: &str) -> PaymentResult<Authorization> {
        self.client
            .get(&format!("/v2/payments/authorizations/{}", authorization_id))
            .await
    }

    /// Captures an authorized payment.
    ///
    /// `request_id` is sent verbatim as the idempotency key when supplied.
    pub async fn capture_authorization(
        &self,
        authorization_id: &str,
        capture: &PaymentCaptureRequest,
        request_id: Option<&str>,
    ) -> PaymentResult<PaymentCaptureResponse> {
        self.client
            .post_with_request_id(
                &format!("/v2/payments/authorizations/{}/capture", authorization_id),
                capture,
                request_id,
            )
            .await
    }

    /// Voids an authorized payment.
    pub async fn void_authorization(&self, authorization_id: &str) -> PaymentResult<Authorization> {
        let request = self.client.new_request(
            HttpMethod::Post,
            self.client
                .url(&format!("/v2/payments/authorizations/{}/void", authorization_id)),
            None::<&()>,
        )?;
        self.client.send_with_auth(request).await
    }

    /// Reauthorizes an authorized payment for `amount`.
    pub async fn reauthorize(&self, authorization_id: &str, amount: &Amount) -> PaymentResult<Authorization> {
        #[derive(Serialize)]
        struct ReauthorizeRequest {
            amount: Money,
        }

        self.client
            .post(
                &format!("/v2/payments/authorizations/{}/reauthorize", authorization_id),
                &ReauthorizeRequest {
                    amount: Money::new(&amount.currency, &amount.total),
                },
            )
            .await
    }

    // Captures and refunds

    /// Gets a captured payment.
    pub async fn get_capture(&self, capture_id: &str) -> PaymentResult<Capture> {
        self.client
            .get(&format!("/v1/payments/capture/{}", capture_id))
            .await
    }

    /// Gets a refund.
    pub async fn get_refund(&self, refund_id: &str) -> PaymentResult<Refund> {
        self.client
            .get(&format!("/v2/payments/refund/{}", refund_id))
            .await
    }
}

/// Completed sale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sale {
    #[serde(default)]
    pub id: String,
    pub amount: Option<Amount>,
    pub transaction_fee: Option<CurrencyValue>,
    pub description: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: String,
    pub parent_payment: Option<String>,
    pub payment_mode: Option<String>,
    pub pending_reason: Option<String>,
    pub reason_code: Option<String>,
    pub protection_eligibility: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Refund {
    #[serde(default)]
    pub id: String,
    pub amount: Option<serde_json::Value>,
    #[serde(alias = "status", default)]
    pub state: String,
    pub capture_id: Option<String>,
    pub sale_id: Option<String>,
    pub parent_payment: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Authorized payment (v2).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authorization {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub status_details: Option<StatusDetails>,
    pub amount: Option<Money>,
    pub custom_id: Option<String>,
    pub invoice_id: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub expiration_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusDetails {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PaymentCaptureRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_to_payer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_descriptor: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub final_capture: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentCaptureResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub status_details: Option<StatusDetails>,
    pub amount: Option<Money>,
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub final_capture: bool,
    pub disbursement_mode: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Captured payment (v1).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Capture {
    #[serde(default)]
    pub id: String,
    pub amount: Option<Amount>,
    #[serde(default)]
    pub state: String,
    pub parent_payment: Option<String>,
    pub transaction_fee: Option<CurrencyValue>,
    #[serde(default)]
    pub is_final_capture: bool,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capture_request_omits_defaults() {
        let request = PaymentCaptureRequest {
            amount: Some(Money::new("USD", "7.00")),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"amount": {"currency_code": "USD", "value": "7.00"}})
        );

        let request = PaymentCaptureRequest {
            final_capture: true,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"final_capture": true})
        );
    }

    #[test]
    fn test_refund_accepts_v2_status() {
        let refund: Refund =
            serde_json::from_str(r#"{"id": "1JU08902781691411", "status": "COMPLETED"}"#).unwrap();
        assert_eq!(refund.state, "COMPLETED");
    }
}
