use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub account_id: String,
    #[serde(default)]
    pub balances: AccountBalances,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub official_name: Option<String>,
    /// `depository`, `credit`, `loan`, `investment` or `other`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountBalances {
    pub available: Option<f64>,
    pub current: Option<f64>,
    pub limit: Option<f64>,
    pub iso_currency_code: Option<String>,
    pub unofficial_currency_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub item_id: String,
    pub institution_id: Option<String>,
    pub webhook: Option<String>,
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub available_products: Vec<String>,
    #[serde(default)]
    pub billed_products: Vec<String>,
    pub consent_expiration_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub item: Item,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub numbers: AccountNumbers,
    #[serde(default)]
    pub item: Item,
    #[serde(default)]
    pub request_id: String,
}

/// Account and routing numbers, grouped by payment network.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountNumbers {
    pub ach: Vec<AchNumbers>,
    pub eft: Vec<EftNumbers>,
    pub international: Vec<InternationalNumbers>,
    pub bacs: Vec<BacsNumbers>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AchNumbers {
    pub account_id: String,
    pub account: String,
    pub routing: String,
    #[serde(default)]
    pub wire_routing: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EftNumbers {
    pub account_id: String,
    pub account: String,
    pub institution: String,
    pub branch: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InternationalNumbers {
    pub account_id: String,
    pub iban: String,
    pub bic: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacsNumbers {
    pub account_id: String,
    pub account: String,
    pub sort_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemResponse {
    pub item: Item,
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoveItemResponse {
    #[serde(default)]
    pub request_id: String,
}

#[derive(Clone, Deserialize)]
pub struct ExchangePublicTokenResponse {
    pub access_token: String,
    pub item_id: String,
    #[serde(default)]
    pub request_id: String,
}

impl std::fmt::Debug for ExchangePublicTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangePublicTokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("item_id", &self.item_id)
            .field("request_id", &self.request_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePublicTokenResponse {
    pub public_token: String,
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Clone, Deserialize)]
pub struct InvalidateAccessTokenResponse {
    pub new_access_token: String,
    #[serde(default)]
    pub request_id: String,
}

impl std::fmt::Debug for InvalidateAccessTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidateAccessTokenResponse")
            .field("new_access_token", &"[REDACTED]")
            .field("request_id", &self.request_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Institution {
    pub institution_id: String,
    pub name: String,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub country_codes: Vec<String>,
    #[serde(default)]
    pub routing_numbers: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub oauth: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionsResponse {
    #[serde(default)]
    pub institutions: Vec<Institution>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionResponse {
    pub institution: Institution,
    #[serde(default)]
    pub request_id: String,
}

/// Asset report body. The report schema is large and kept untyped.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetReportResponse {
    pub report: serde_json::Value,
    #[serde(default)]
    pub warnings: Vec<serde_json::Value>,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SandboxPublicTokenResponse {
    pub public_token: String,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetLoginResponse {
    #[serde(default)]
    pub reset_login: bool,
    #[serde(default)]
    pub request_id: String,
}

// Payment initiation

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientAddress {
    pub street: Vec<String>,
    pub city: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2.
    pub country: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRecipient {
    pub name: String,
    pub iban: String,
    pub address: RecipientAddress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecipientResponse {
    pub recipient_id: String,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAmount {
    pub currency: String,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentResponse {
    pub payment_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub request_id: String,
}

/// Where a money transfer goes.
#[derive(Debug, Clone)]
pub enum TransferDestination {
    /// A recipient already registered with Plaid.
    Recipient(String),
    /// A bank account not yet registered; a recipient is created first.
    Bank(CreateRecipient),
}

#[derive(Debug, Clone)]
pub struct MoneyTransfer {
    pub destination: TransferDestination,
    /// Shown to the payee.
    pub reference: String,
    pub amount: PaymentAmount,
}
