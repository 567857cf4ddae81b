//! Stripe resources and request parameters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A page of a Stripe list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct List<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub url: String,
}

/// Cursor paging plus arbitrary filters for list endpoints.
///
/// A filter with an empty operator is sent as `field=value`, otherwise as
/// `field[op]=value` (for example `created[gte]=1700000000`).
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub starting_after: Option<String>,
    pub ending_before: Option<String>,
    filters: Vec<(String, String)>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn starting_after(mut self, id: impl Into<String>) -> Self {
        self.starting_after = Some(id.into());
        self
    }

    pub fn ending_before(mut self, id: impl Into<String>) -> Self {
        self.ending_before = Some(id.into());
        self
    }

    pub fn filter(mut self, field: &str, op: &str, value: impl Into<String>) -> Self {
        let key = if op.is_empty() {
            field.to_string()
        } else {
            format!("{}[{}]", field, op)
        };
        self.filters.push((key, value.into()));
        self
    }

    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(id) = &self.starting_after {
            query.push(("starting_after".to_string(), id.clone()));
        }
        if let Some(id) = &self.ending_before {
            query.push(("ending_before".to_string(), id.clone()));
        }
        query.extend(self.filters.iter().cloned());
        query
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub available: Vec<BalanceAmount>,
    #[serde(default)]
    pub pending: Vec<BalanceAmount>,
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceAmount {
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topup {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub statement_descriptor: Option<String>,
    /// `pending`, `succeeded`, `failed`, `reversed` or `canceled`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub expected_availability_date: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub livemode: bool,
}

/// Parameters for a balance top-up.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTopup {
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_descriptor: Option<String>,
}

impl CreateTopup {
    /// Top-up shown as `Top-up` on the bank statement.
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            description: None,
            statement_descriptor: Some("Top-up".to_string()),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub transfer_group: Option<String>,
    #[serde(default)]
    pub reversed: bool,
    #[serde(default)]
    pub amount_reversed: i64,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub livemode: bool,
}

/// Parameters for a transfer to a connected account.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTransfer {
    pub amount: i64,
    pub currency: String,
    /// Connected account id (`acct_...`).
    pub destination: String,
    /// `card`, `bank_account` or `fpx`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_group: Option<String>,
}

impl CreateTransfer {
    pub fn new(amount: i64, currency: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            destination: destination.into(),
            source_type: None,
            description: None,
            transfer_group: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankAccount {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub account_holder_name: Option<String>,
    #[serde(default)]
    pub account_holder_type: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub last4: String,
    #[serde(default)]
    pub routing_number: Option<String>,
    /// `new`, `validated`, `verified`, `verification_failed` or `errored`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Response of a delete call.
#[derive(Debug, Clone, Deserialize)]
pub struct Deleted {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}

/// Card details used to create a payment method.
#[derive(Clone)]
pub struct NewCard {
    pub number: String,
    pub exp_month: u32,
    pub exp_year: u32,
    pub cvc: String,
}

impl std::fmt::Debug for NewCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last4 = self
            .number
            .get(self.number.len().saturating_sub(4)..)
            .unwrap_or_default();
        f.debug_struct("NewCard")
            .field("number", &format!("****{}", last4))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
pub(crate) struct CardPaymentMethodForm<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    #[serde(rename = "card[number]")]
    pub number: &'a str,
    #[serde(rename = "card[exp_month]")]
    pub exp_month: u32,
    #[serde(rename = "card[exp_year]")]
    pub exp_year: u32,
    #[serde(rename = "card[cvc]")]
    pub cvc: &'a str,
}

impl<'a> From<&'a NewCard> for CardPaymentMethodForm<'a> {
    fn from(card: &'a NewCard) -> Self {
        Self {
            kind: "card",
            number: &card.number,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
            cvc: &card.cvc,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub card: Option<PaymentMethodCard>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodCard {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub last4: String,
    #[serde(default)]
    pub exp_month: u32,
    #[serde(default)]
    pub exp_year: u32,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub funding: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_query() {
        let params = ListParams::new()
            .limit(3)
            .starting_after("tu_1")
            .filter("created", "gte", "1700000000")
            .filter("status", "", "pending");

        assert_eq!(
            serde_urlencoded::to_string(params.to_query()).unwrap(),
            "limit=3&starting_after=tu_1&created%5Bgte%5D=1700000000&status=pending"
        );
    }

    #[test]
    fn test_card_form_field_names() {
        let card = NewCard {
            number: "4242424242424242".to_string(),
            exp_month: 12,
            exp_year: 2030,
            cvc: "314".to_string(),
        };
        let form = serde_urlencoded::to_string(CardPaymentMethodForm::from(&card)).unwrap();
        assert_eq!(
            form,
            "type=card&card%5Bnumber%5D=4242424242424242&card%5Bexp_month%5D=12&card%5Bexp_year%5D=2030&card%5Bcvc%5D=314"
        );
        let printed = format!("{:?}", card);
        assert!(printed.contains("****4242"));
        assert!(!printed.contains("314"));
    }
}
