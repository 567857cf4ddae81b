//! Transaction search (reporting API).

use crate::client::PayPalClient;
use crate::error::PaymentResult;
use crate::types::{Address, Link, Money};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Service for transaction reporting.
pub struct TransactionsService<'a> {
    client: &'a PayPalClient,
}

impl<'a> TransactionsService<'a> {
    pub fn new(client: &'a PayPalClient) -> Self {
        Self { client }
    }

    /// Searches transactions. PayPal limits a search window to 31 days.
    pub async fn search(
        &self,
        request: &TransactionSearchRequest,
    ) -> PaymentResult<TransactionSearchResponse> {
        self.client
            .get_with_query("/v1/reporting/transactions", request)
            .await
    }
}

// The reporting API writes offsets as `+0000`, which is not RFC 3339.
fn reporting_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(&raw)
        .or_else(|_| DateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|parsed| Some(parsed.with_timezone(&Utc)))
        .map_err(serde::de::Error::custom)
}

fn rfc3339<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Search filters. Only the date range is required.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSearchRequest {
    #[serde(serialize_with = "rfc3339")]
    pub start_date: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339")]
    pub end_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_instrument_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<String>,
    /// Comma separated response sections, or `all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_affecting_records_only: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl TransactionSearchRequest {
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        Self {
            start_date,
            end_date,
            transaction_id: None,
            transaction_type: None,
            transaction_status: None,
            transaction_amount: None,
            transaction_currency: None,
            payment_instrument_type: None,
            store_id: None,
            terminal_id: None,
            fields: None,
            balance_affecting_records_only: None,
            page_size: None,
            page: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionSearchResponse {
    #[serde(default)]
    pub transaction_details: Vec<TransactionDetails>,
    #[serde(default)]
    pub account_number: String,
    #[serde(default, deserialize_with = "reporting_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "reporting_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "reporting_date")]
    pub last_refreshed_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionDetails {
    #[serde(default)]
    pub transaction_info: TransactionInfo,
    pub payer_info: Option<SearchPayerInfo>,
    pub shipping_info: Option<SearchShippingInfo>,
    pub cart_info: Option<SearchCartInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionInfo {
    pub paypal_account_id: String,
    pub transaction_id: String,
    pub paypal_reference_id: String,
    pub paypal_reference_id_type: String,
    pub transaction_event_code: String,
    #[serde(default, deserialize_with = "reporting_date")]
    pub transaction_initiation_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "reporting_date")]
    pub transaction_updated_date: Option<DateTime<Utc>>,
    pub transaction_amount: Money,
    pub fee_amount: Option<Money>,
    pub shipping_amount: Option<Money>,
    pub tip_amount: Option<Money>,
    pub transaction_status: String,
    pub transaction_subject: String,
    pub transaction_note: String,
    pub ending_balance: Option<Money>,
    pub available_balance: Option<Money>,
    pub invoice_id: String,
    pub custom_field: String,
    pub protection_eligibility: String,
    pub payment_method_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchPayerInfo {
    pub account_id: String,
    pub email_address: String,
    pub address_status: String,
    pub payer_status: String,
    pub payer_name: SearchPayerName,
    pub country_code: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchPayerName {
    pub given_name: String,
    pub surname: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchShippingInfo {
    pub name: String,
    pub method: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchCartInfo {
    pub item_details: Vec<SearchItemDetails>,
    pub tax_inclusive: Option<bool>,
    pub paypal_invoice_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchItemDetails {
    pub item_code: String,
    pub item_name: String,
    pub item_description: String,
    pub item_quantity: String,
    pub item_unit_price: Option<Money>,
    pub item_amount: Option<Money>,
    pub total_item_amount: Option<Money>,
    pub invoice_number: String,
}
