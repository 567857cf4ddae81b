//! Plaid Client
//!
//! Every endpoint is a JSON `POST` whose body carries the client id and secret
//! alongside the endpoint's own fields.

mod types;

pub use types::*;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::{
    new_request, HttpMethod, HttpTransport, RequestExecutor, ReqwestHttpTransport,
    DEFAULT_MAX_RESPONSE_SIZE,
};
use crate::error::{ErrorFormat, PaymentResult};
use crate::telemetry::LogSink;
use crate::types::PlaidConfig;

#[derive(Serialize)]
struct Authenticated<'a, B: Serialize> {
    client_id: &'a str,
    secret: &'a str,
    #[serde(flatten)]
    body: B,
}

/// Plaid REST client.
pub struct PlaidClient {
    config: PlaidConfig,
    executor: RequestExecutor,
}

impl PlaidClient {
    pub fn new(config: PlaidConfig) -> PaymentResult<Self> {
        Self::builder(config).build()
    }

    pub fn with_transport(
        config: PlaidConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> PaymentResult<Self> {
        Self::builder(config).transport(transport).build()
    }

    pub fn builder(config: PlaidConfig) -> PlaidClientBuilder {
        PlaidClientBuilder {
            config,
            transport: None,
            log_sink: None,
        }
    }

    pub fn config(&self) -> &PlaidConfig {
        &self.config
    }

    #[instrument(skip(self, body))]
    async fn call<T, B>(&self, path: &str, body: B) -> PaymentResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload = Authenticated {
            client_id: &self.config.client_id,
            secret: self.config.secret.expose_secret(),
            body,
        };
        let request = new_request(
            HttpMethod::Post,
            format!("{}{}", self.config.base_url(), path),
            Some(&payload),
        )?;
        self.executor.send_json(request).await
    }

    // Items and accounts

    /// Account and routing numbers for an item's accounts.
    pub async fn auth(&self, access_token: &str) -> PaymentResult<AuthResponse> {
        self.call("/auth/get", json!({ "access_token": access_token }))
            .await
    }

    pub async fn get_item(&self, access_token: &str) -> PaymentResult<ItemResponse> {
        self.call("/item/get", json!({ "access_token": access_token }))
            .await
    }

    pub async fn remove_item(&self, access_token: &str) -> PaymentResult<RemoveItemResponse> {
        self.call("/item/remove", json!({ "access_token": access_token }))
            .await
    }

    pub async fn get_accounts(&self, access_token: &str) -> PaymentResult<AccountsResponse> {
        self.call("/accounts/get", json!({ "access_token": access_token }))
            .await
    }

    /// Real-time balances, fetched from the institution.
    pub async fn get_balances(&self, access_token: &str) -> PaymentResult<AccountsResponse> {
        self.call("/accounts/balance/get", json!({ "access_token": access_token }))
            .await
    }

    pub async fn get_asset_report(
        &self,
        asset_report_token: &str,
    ) -> PaymentResult<AssetReportResponse> {
        self.call(
            "/asset_report/get",
            json!({ "asset_report_token": asset_report_token }),
        )
        .await
    }

    // Tokens

    /// Exchange a Link public token for a long-lived access token.
    pub async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> PaymentResult<ExchangePublicTokenResponse> {
        self.call(
            "/item/public_token/exchange",
            json!({ "public_token": public_token }),
        )
        .await
    }

    /// Create a short-lived public token for an existing item.
    pub async fn create_public_token(
        &self,
        access_token: &str,
    ) -> PaymentResult<CreatePublicTokenResponse> {
        self.call(
            "/item/public_token/create",
            json!({ "access_token": access_token }),
        )
        .await
    }

    /// Rotate an access token. The old token stops working immediately.
    pub async fn rotate_access_token(
        &self,
        access_token: &str,
    ) -> PaymentResult<InvalidateAccessTokenResponse> {
        self.call(
            "/item/access_token/invalidate",
            json!({ "access_token": access_token }),
        )
        .await
    }

    // Institutions

    pub async fn get_institutions(
        &self,
        count: u32,
        offset: u32,
        country_codes: &[&str],
    ) -> PaymentResult<InstitutionsResponse> {
        self.call(
            "/institutions/get",
            json!({ "count": count, "offset": offset, "country_codes": country_codes }),
        )
        .await
    }

    pub async fn get_institution_by_id(
        &self,
        institution_id: &str,
        country_codes: &[&str],
    ) -> PaymentResult<InstitutionResponse> {
        self.call(
            "/institutions/get_by_id",
            json!({ "institution_id": institution_id, "country_codes": country_codes }),
        )
        .await
    }

    // Payment initiation

    /// Register a payee by IBAN and address.
    pub async fn create_recipient(
        &self,
        recipient: &CreateRecipient,
    ) -> PaymentResult<CreateRecipientResponse> {
        self.call("/payment_initiation/recipient/create", recipient)
            .await
    }

    pub async fn create_payment(
        &self,
        recipient_id: &str,
        reference: &str,
        amount: &PaymentAmount,
    ) -> PaymentResult<CreatePaymentResponse> {
        self.call(
            "/payment_initiation/payment/create",
            json!({ "recipient_id": recipient_id, "reference": reference, "amount": amount }),
        )
        .await
    }

    /// Send money, registering the payee first when it is a bare bank account.
    pub async fn transfer_money(
        &self,
        transfer: &MoneyTransfer,
    ) -> PaymentResult<CreatePaymentResponse> {
        let recipient_id = match &transfer.destination {
            TransferDestination::Recipient(id) => id.clone(),
            TransferDestination::Bank(recipient) => {
                let created = self.create_recipient(recipient).await?;
                debug!(recipient_id = %created.recipient_id, "registered transfer recipient");
                created.recipient_id
            }
        };
        self.create_payment(&recipient_id, &transfer.reference, &transfer.amount)
            .await
    }

    // Sandbox

    /// Create a public token for a test institution without going through Link.
    pub async fn sandbox_public_token(
        &self,
        institution_id: &str,
        initial_products: &[&str],
    ) -> PaymentResult<SandboxPublicTokenResponse> {
        self.call(
            "/sandbox/public_token/create",
            json!({ "institution_id": institution_id, "initial_products": initial_products }),
        )
        .await
    }

    /// Force an item into the login-required state.
    pub async fn sandbox_reset_login(&self, access_token: &str) -> PaymentResult<ResetLoginResponse> {
        self.call(
            "/sandbox/item/reset_login",
            json!({ "access_token": access_token }),
        )
        .await
    }
}

impl std::fmt::Debug for PlaidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaidClient")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .finish()
    }
}

/// Builder for [`PlaidClient`].
pub struct PlaidClientBuilder {
    config: PlaidConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    log_sink: Option<Arc<dyn LogSink>>,
}

impl PlaidClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn build(self) -> PaymentResult<PlaidClient> {
        self.config.validate()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestHttpTransport::with_options(
                None,
                DEFAULT_MAX_RESPONSE_SIZE,
            )?),
        };
        let mut executor = RequestExecutor::new(transport, ErrorFormat::Plaid);
        if let Some(sink) = self.log_sink {
            executor = executor.with_log_sink(sink);
        }

        Ok(PlaidClient {
            config: self.config,
            executor,
        })
    }
}
