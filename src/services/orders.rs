//! Checkout order operations (v2).

use crate::client::{apply_request_id, PayPalClient};
use crate::core::HttpMethod;
use crate::error::PaymentResult;
use crate::services::payments::Authorization;
use crate::types::{Link, Money, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ORDERS_PATH: &str = "/v2/checkout/orders";

/// Service for order operations.
pub struct OrdersService<'a> {
    client: &'a PayPalClient,
}

impl<'a> OrdersService<'a> {
    pub fn new(client: &'a PayPalClient) -> Self {
        Self { client }
    }

    /// Gets an order.
    pub async fn get(&self, order_id: &str) -> PaymentResult<Order> {
        self.client
            .get(&format!("{}/{}", ORDERS_PATH, order_id))
            .await
    }

    /// Creates an order.
    pub async fn create(
        &self,
        order: &CreateOrderRequest,
        request_id: Option<&str>,
    ) -> PaymentResult<Order> {
        self.client
            .post_with_request_id(ORDERS_PATH, order, request_id)
            .await
    }

    /// Updates an order with JSON patch operations.
    pub async fn update(&self, order_id: &str, patches: &[Patch]) -> PaymentResult<()> {
        self.client
            .patch_no_content(&format!("{}/{}", ORDERS_PATH, order_id), patches)
            .await
    }

    /// Authorizes payment for an approved order.
    pub async fn authorize(
        &self,
        order_id: &str,
        request: &AuthorizeOrderRequest,
    ) -> PaymentResult<Authorization> {
        self.client
            .post(&format!("{}/{}/authorize", ORDERS_PATH, order_id), request)
            .await
    }

    /// Captures payment for an approved order.
    ///
    /// Always asks for the full representation so the capture details are
    /// present in the response. Only this request carries the preference.
    pub async fn capture(
        &self,
        order_id: &str,
        request: &CaptureOrderRequest,
        request_id: Option<&str>,
    ) -> PaymentResult<CaptureOrderResponse> {
        let mut http_request = self.client.new_request(
            HttpMethod::Post,
            self.client
                .url(&format!("{}/{}/capture", ORDERS_PATH, order_id)),
            Some(request),
        )?;
        http_request.set_header("prefer", "return=representation");
        apply_request_id(&mut http_request, request_id);
        self.client.send_with_auth(http_request).await
    }
}

/// `CAPTURE` or `AUTHORIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderIntent {
    Capture,
    Authorize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub intent: OrderIntent,
    pub purchase_units: Vec<PurchaseUnitRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<OrderPayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_context: Option<ApplicationContext>,
}

impl CreateOrderRequest {
    pub fn new(intent: OrderIntent, purchase_units: Vec<PurchaseUnitRequest>) -> Self {
        Self {
            intent,
            purchase_units,
            payer: None,
            application_context: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PurchaseUnitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    pub amount: PurchaseUnitAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<Payee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_descriptor: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseUnitAmount {
    pub currency_code: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<AmountBreakdown>,
}

impl PurchaseUnitAmount {
    pub fn new(currency_code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
            value: value.into(),
            breakdown: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_total: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handling: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_total: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Money>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Money>,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PartyName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<PortableAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
}

/// Address in the v2 portable format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortableAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_area_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_area_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PartyName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<PortableAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// `GET_FROM_FILE`, `NO_SHIPPING` or `SET_PROVIDED_ADDRESS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_preference: Option<String>,
    /// `CONTINUE` or `PAY_NOW`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthorizeOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<PaymentSource>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CaptureOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<PaymentSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<PaymentSourceToken>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSourceToken {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Checkout order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub intent: Option<OrderIntent>,
    pub payer: Option<OrderPayer>,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseUnit {
    #[serde(default)]
    pub reference_id: String,
    pub amount: Option<PurchaseUnitAmount>,
    pub payee: Option<Payee>,
    pub payments: Option<CapturedPayments>,
    pub description: Option<String>,
    pub custom_id: Option<String>,
    pub invoice_id: Option<String>,
    pub shipping: Option<ShippingDetail>,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapturedPayments {
    #[serde(default)]
    pub captures: Vec<CaptureAmount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptureAmount {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub custom_id: Option<String>,
    pub amount: Option<PurchaseUnitAmount>,
    pub seller_receivable_breakdown: Option<SellerReceivableBreakdown>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellerReceivableBreakdown {
    pub gross_amount: Option<Money>,
    pub paypal_fee: Option<Money>,
    pub net_amount: Option<Money>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptureOrderResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub payer: Option<OrderPayer>,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
    #[serde(default)]
    pub links: Vec<Link>,
}
