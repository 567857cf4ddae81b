//! Stripe Client
//!
//! Authenticates every call with the secret key as a static bearer credential
//! and sends form-encoded bodies. There is no token lifecycle to manage.

mod types;

pub use types::*;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use crate::core::{
    new_form_request, new_query_request, new_request, HttpMethod, HttpRequest, HttpTransport,
    RequestExecutor, ReqwestHttpTransport, DEFAULT_MAX_RESPONSE_SIZE,
};
use crate::error::{ErrorFormat, PaymentResult};
use crate::telemetry::LogSink;
use crate::types::StripeConfig;

const NO_PARAMS: &[(&str, &str)] = &[];

/// Stripe REST client.
pub struct StripeClient {
    config: StripeConfig,
    executor: RequestExecutor,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        Self::builder(config).build()
    }

    pub fn with_transport(
        config: StripeConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> PaymentResult<Self> {
        Self::builder(config).transport(transport).build()
    }

    pub fn builder(config: StripeConfig) -> StripeClientBuilder {
        StripeClientBuilder {
            config,
            transport: None,
            log_sink: None,
        }
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send<T: DeserializeOwned>(&self, mut request: HttpRequest) -> PaymentResult<T> {
        request.set_header(
            "authorization",
            format!("Bearer {}", self.config.secret_key.expose_secret()),
        );
        self.executor.send_json(request).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> PaymentResult<T> {
        let request = new_request(HttpMethod::Get, self.url(path), None::<&()>)?;
        self.send(request).await
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&ListParams>,
        extra: &[(&str, &str)],
    ) -> PaymentResult<List<T>> {
        let mut query: Vec<(String, String)> = extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if let Some(params) = params {
            query.extend(params.to_query());
        }
        let request = new_query_request(&self.url(path), &query)?;
        self.send(request).await
    }

    async fn post_form<T, F>(&self, path: &str, form: &F) -> PaymentResult<T>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        let request = new_form_request(HttpMethod::Post, self.url(path), form)?;
        self.send(request).await
    }

    async fn set_metadata<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        value: &str,
    ) -> PaymentResult<T> {
        self.post_form(path, &[(format!("metadata[{}]", key), value)])
            .await
    }

    // Balance

    pub async fn retrieve_balance(&self) -> PaymentResult<Balance> {
        self.get("/v1/balance").await
    }

    // Top-ups

    /// Add funds to the platform balance from the linked bank account.
    pub async fn create_topup(&self, topup: &CreateTopup) -> PaymentResult<Topup> {
        self.post_form("/v1/topups", topup).await
    }

    pub async fn get_topup(&self, topup_id: &str) -> PaymentResult<Topup> {
        self.get(&format!("/v1/topups/{}", topup_id)).await
    }

    pub async fn add_topup_metadata(
        &self,
        topup_id: &str,
        key: &str,
        value: &str,
    ) -> PaymentResult<Topup> {
        self.set_metadata(&format!("/v1/topups/{}", topup_id), key, value)
            .await
    }

    pub async fn list_topups(&self, params: Option<&ListParams>) -> PaymentResult<List<Topup>> {
        self.list("/v1/topups", params, &[]).await
    }

    /// Cancel a top-up that is still pending.
    pub async fn cancel_topup(&self, topup_id: &str) -> PaymentResult<Topup> {
        self.post_form(&format!("/v1/topups/{}/cancel", topup_id), NO_PARAMS)
            .await
    }

    // Transfers

    pub async fn create_transfer(&self, transfer: &CreateTransfer) -> PaymentResult<Transfer> {
        self.post_form("/v1/transfers", transfer).await
    }

    pub async fn get_transfer(&self, transfer_id: &str) -> PaymentResult<Transfer> {
        self.get(&format!("/v1/transfers/{}", transfer_id)).await
    }

    pub async fn add_transfer_metadata(
        &self,
        transfer_id: &str,
        key: &str,
        value: &str,
    ) -> PaymentResult<Transfer> {
        self.set_metadata(&format!("/v1/transfers/{}", transfer_id), key, value)
            .await
    }

    pub async fn list_transfers(
        &self,
        params: Option<&ListParams>,
    ) -> PaymentResult<List<Transfer>> {
        self.list("/v1/transfers", params, &[]).await
    }

    // Customer bank accounts

    /// Attach a tokenized bank account (`btok_...`) to a customer.
    pub async fn add_bank_account(
        &self,
        customer_id: &str,
        bank_token: &str,
    ) -> PaymentResult<BankAccount> {
        self.post_form(
            &format!("/v1/customers/{}/sources", customer_id),
            &[("source", bank_token)],
        )
        .await
    }

    pub async fn get_bank_account(
        &self,
        customer_id: &str,
        bank_account_id: &str,
    ) -> PaymentResult<BankAccount> {
        self.get(&format!(
            "/v1/customers/{}/sources/{}",
            customer_id, bank_account_id
        ))
        .await
    }

    pub async fn add_bank_account_metadata(
        &self,
        customer_id: &str,
        bank_account_id: &str,
        key: &str,
        value: &str,
    ) -> PaymentResult<BankAccount> {
        self.set_metadata(
            &format!("/v1/customers/{}/sources/{}", customer_id, bank_account_id),
            key,
            value,
        )
        .await
    }

    /// Verify a bank account with the two micro-deposit amounts, in cents.
    pub async fn verify_bank_account(
        &self,
        customer_id: &str,
        bank_account_id: &str,
        amounts: [i64; 2],
    ) -> PaymentResult<BankAccount> {
        let form: Vec<(&str, i64)> = amounts.iter().map(|a| ("amounts[]", *a)).collect();
        self.post_form(
            &format!(
                "/v1/customers/{}/sources/{}/verify",
                customer_id, bank_account_id
            ),
            &form,
        )
        .await
    }

    pub async fn remove_bank_account(
        &self,
        customer_id: &str,
        bank_account_id: &str,
    ) -> PaymentResult<Deleted> {
        let request = new_request(
            HttpMethod::Delete,
            self.url(&format!(
                "/v1/customers/{}/sources/{}",
                customer_id, bank_account_id
            )),
            None::<&()>,
        )?;
        self.send(request).await
    }

    pub async fn list_bank_accounts(
        &self,
        customer_id: &str,
        params: Option<&ListParams>,
    ) -> PaymentResult<List<BankAccount>> {
        self.list(
            &format!("/v1/customers/{}/sources", customer_id),
            params,
            &[("object", "bank_account")],
        )
        .await
    }

    // Payment methods

    pub async fn create_card_payment_method(&self, card: &NewCard) -> PaymentResult<PaymentMethod> {
        self.post_form("/v1/payment_methods", &CardPaymentMethodForm::from(card))
            .await
    }

    pub async fn get_payment_method(&self, payment_method_id: &str) -> PaymentResult<PaymentMethod> {
        self.get(&format!("/v1/payment_methods/{}", payment_method_id))
            .await
    }

    pub async fn add_payment_method_metadata(
        &self,
        payment_method_id: &str,
        key: &str,
        value: &str,
    ) -> PaymentResult<PaymentMethod> {
        self.set_metadata(
            &format!("/v1/payment_methods/{}", payment_method_id),
            key,
            value,
        )
        .await
    }

    /// List a customer's payment methods of one type, such as `card`.
    pub async fn list_payment_methods(
        &self,
        customer_id: &str,
        kind: &str,
    ) -> PaymentResult<List<PaymentMethod>> {
        self.list(
            "/v1/payment_methods",
            None,
            &[("customer", customer_id), ("type", kind)],
        )
        .await
    }

    pub async fn attach_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> PaymentResult<PaymentMethod> {
        self.post_form(
            &format!("/v1/payment_methods/{}/attach", payment_method_id),
            &[("customer", customer_id)],
        )
        .await
    }

    pub async fn detach_payment_method(
        &self,
        payment_method_id: &str,
    ) -> PaymentResult<PaymentMethod> {
        self.post_form(
            &format!("/v1/payment_methods/{}/detach", payment_method_id),
            NO_PARAMS,
        )
        .await
    }
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .finish()
    }
}

/// Builder for [`StripeClient`].
pub struct StripeClientBuilder {
    config: StripeConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    log_sink: Option<Arc<dyn LogSink>>,
}

impl StripeClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn build(self) -> PaymentResult<StripeClient> {
        self.config.validate()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestHttpTransport::with_options(
                None,
                DEFAULT_MAX_RESPONSE_SIZE,
            )?),
        };
        let mut executor = RequestExecutor::new(transport, ErrorFormat::Stripe);
        if let Some(sink) = self.log_sink {
            executor = executor.with_log_sink(sink);
        }

        Ok(StripeClient {
            config: self.config,
            executor,
        })
    }
}
