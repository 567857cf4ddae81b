//! Stored credit card operations.

use crate::client::PayPalClient;
use crate::error::PaymentResult;
use crate::types::{Address, Link};
use serde::{Deserialize, Serialize};

const CARDS_PATH: &str = "/v1/vault/credit-cards";
const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Service for the credit card vault.
pub struct VaultService<'a> {
    client: &'a PayPalClient,
}

impl<'a> VaultService<'a> {
    pub fn new(client: &'a PayPalClient) -> Self {
        Self { client }
    }

    /// Stores a card and returns it with its vault id.
    pub async fn store_card(&self, card: &CreditCard) -> PaymentResult<CreditCard> {
        self.client.post(CARDS_PATH, card).await
    }

    pub async fn get_card(&self, card_id: &str) -> PaymentResult<CreditCard> {
        self.client.get(&format!("{}/{}", CARDS_PATH, card_id)).await
    }

    /// Lists stored cards. Zero or missing paging values fall back to page 1 of 10.
    pub async fn list_cards(&self, filter: Option<&CreditCardsFilter>) -> PaymentResult<CreditCards> {
        let page = filter
            .map(|f| f.page)
            .filter(|&p| p > 0)
            .unwrap_or(DEFAULT_PAGE);
        let page_size = filter
            .map(|f| f.page_size)
            .filter(|&p| p > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        self.client
            .get_with_query(CARDS_PATH, &[("page", page), ("page_size", page_size)])
            .await
    }

    pub async fn patch_card(
        &self,
        card_id: &str,
        fields: &[CreditCardField],
    ) -> PaymentResult<CreditCard> {
        self.client
            .patch(&format!("{}/{}", CARDS_PATH, card_id), fields)
            .await
    }

    pub async fn delete_card(&self, card_id: &str) -> PaymentResult<()> {
        self.client.delete(&format!("{}/{}", CARDS_PATH, card_id)).await
    }
}

/// Card as stored in the vault.
///
/// `number` and `cvv2` are only sent; the vault returns a masked number.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CreditCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_customer_id: Option<String>,
    #[serde(default)]
    pub number: String,
    /// `visa`, `mastercard`, `discover` or `amex`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub expire_month: String,
    #[serde(default)]
    pub expire_year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvv2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default, skip_serializing)]
    pub links: Vec<Link>,
}

impl std::fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last4 = self
            .number
            .get(self.number.len().saturating_sub(4)..)
            .unwrap_or_default();
        f.debug_struct("CreditCard")
            .field("id", &self.id)
            .field("number", &format!("****{}", last4))
            .field("type", &self.kind)
            .field("expire_month", &self.expire_month)
            .field("expire_year", &self.expire_year)
            .field("cvv2", &self.cvv2.as_ref().map(|_| "[REDACTED]"))
            .field("state", &self.state)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreditCardsFilter {
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditCards {
    #[serde(default)]
    pub items: Vec<CreditCard>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Patch operation on a stored card. Values are always strings.
#[derive(Debug, Clone, Serialize)]
pub struct CreditCardField {
    pub op: String,
    pub path: String,
    pub value: String,
}

impl CreditCardField {
    pub fn replace(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: "replace".to_string(),
            path: path.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HttpMethod, HttpResponse, MockHttpTransport};
    use crate::types::PayPalConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<MockHttpTransport>) -> PayPalClient {
        PayPalClient::with_transport(
            PayPalConfig::new("client", "secret", "https://api.test"),
            transport,
        )
        .unwrap()
    }

    #[test]
    fn test_debug_masks_card_number() {
        let card = CreditCard {
            number: "4417119669820331".to_string(),
            cvv2: Some("874".to_string()),
            ..Default::default()
        };
        let printed = format!("{:?}", card);
        assert!(printed.contains("****0331"));
        assert!(!printed.contains("4417119669820331"));
        assert!(!printed.contains("874"));
    }

    #[tokio::test]
    async fn test_list_cards_defaults_paging() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.set_default_response(HttpResponse::new(200, r#"{"items": []}"#));
        let client = client(transport.clone());

        client.vault().list_cards(None).await.unwrap();
        assert_eq!(
            transport.get_last_request().unwrap().url,
            "https://api.test/v1/vault/credit-cards?page=1&page_size=10"
        );

        client
            .vault()
            .list_cards(Some(&CreditCardsFilter { page: 3, page_size: 0 }))
            .await
            .unwrap();
        assert_eq!(
            transport.get_last_request().unwrap().url,
            "https://api.test/v1/vault/credit-cards?page=3&page_size=10"
        );
    }

    #[tokio::test]
    async fn test_patch_and_delete() {
        let transport = Arc::new(MockHttpTransport::new());
        transport
            .queue_json_response(200, &json!({"id": "CARD-1", "expire_year": "2031", "type": "visa"}))
            .queue_response(HttpResponse::new(204, ""));
        let client = client(transport.clone());

        let card = client
            .vault()
            .patch_card("CARD-1", &[CreditCardField::replace("/expire_year", "2031")])
            .await
            .unwrap();
        assert_eq!(card.expire_year, "2031");

        client.vault().delete_card("CARD-1").await.unwrap();
        let sent = transport.get_last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Delete);
        assert_eq!(sent.url, "https://api.test/v1/vault/credit-cards/CARD-1");
    }
}
