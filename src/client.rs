//! PayPal Client
//!
//! Owns one credential set, its token state and the executor used for every call.

use base64::Engine;
use chrono::Utc;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::{
    new_form_request, new_query_request, new_request, HttpMethod, HttpRequest, HttpTransport,
    RequestExecutor, ReqwestHttpTransport, DEFAULT_MAX_RESPONSE_SIZE,
};
use crate::error::{ErrorFormat, PaymentError, PaymentResult, ProtocolError};
use crate::services::{
    BillingService, IdentityService, OrdersService, PaymentsService, PayoutsService,
    SubscriptionsService, TransactionsService, VaultService, WebhooksService,
};
use crate::telemetry::LogSink;
use crate::token::{RefreshPolicy, TokenCell};
use crate::types::{PayPalConfig, TokenResponse, TokenState};

/// Header carrying a caller-supplied idempotency key.
pub const REQUEST_ID_HEADER: &str = "paypal-request-id";

/// PayPal REST client.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct PayPalClient {
    config: PayPalConfig,
    executor: RequestExecutor,
    token: TokenCell,
    policy: RefreshPolicy,
}

impl PayPalClient {
    /// Create a client using the default reqwest transport.
    pub fn new(config: PayPalConfig) -> PaymentResult<Self> {
        Self::builder(config).build()
    }

    /// Create a client with an injected transport.
    pub fn with_transport(
        config: PayPalConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> PaymentResult<Self> {
        Self::builder(config).transport(transport).build()
    }

    pub fn builder(config: PayPalConfig) -> PayPalClientBuilder {
        PayPalClientBuilder::new(config)
    }

    pub fn config(&self) -> &PayPalConfig {
        &self.config
    }

    /// API base without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.config.base_url()
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base(), path)
    }

    /// Ask PayPal to return full resource representations on every write.
    pub fn set_return_representation(&self) {
        self.executor.set_return_representation(true);
    }

    /// Enable or disable full resource representations on writes.
    pub fn set_verbose_responses(&self, enabled: bool) {
        self.executor.set_return_representation(enabled);
    }

    // Service accessors

    pub fn identity(&self) -> IdentityService<'_> {
        IdentityService::new(self)
    }

    pub fn payouts(&self) -> PayoutsService<'_> {
        PayoutsService::new(self)
    }

    pub fn payments(&self) -> PaymentsService<'_> {
        PaymentsService::new(self)
    }

    pub fn orders(&self) -> OrdersService<'_> {
        OrdersService::new(self)
    }

    pub fn billing(&self) -> BillingService<'_> {
        BillingService::new(self)
    }

    pub fn subscriptions(&self) -> SubscriptionsService<'_> {
        SubscriptionsService::new(self)
    }

    pub fn vault(&self) -> VaultService<'_> {
        VaultService::new(self)
    }

    pub fn webhooks(&self) -> WebhooksService<'_> {
        WebhooksService::new(self)
    }

    pub fn transactions(&self) -> TransactionsService<'_> {
        TransactionsService::new(self)
    }

    // Request construction and dispatch

    /// Build a request with an optional JSON payload.
    pub fn new_request<P>(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        payload: Option<&P>,
    ) -> PaymentResult<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        new_request(method, url, payload)
    }

    /// Send with a bearer token and decode the JSON response.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send_with_auth<T: DeserializeOwned>(&self, request: HttpRequest) -> PaymentResult<T> {
        let request = self.authorize(request).await?;
        self.executor.send_json(request).await
    }

    /// Send with a bearer token, discarding the response body.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send_with_auth_no_content(&self, request: HttpRequest) -> PaymentResult<()> {
        let request = self.authorize(request).await?;
        self.executor.send_no_content(request).await
    }

    /// Send with a bearer token, copying the response body into `sink`.
    pub async fn send_with_auth_raw<W: Write + ?Sized>(
        &self,
        request: HttpRequest,
        sink: &mut W,
    ) -> PaymentResult<u64> {
        let request = self.authorize(request).await?;
        self.executor.send_raw(request, sink).await
    }

    /// Send with HTTP basic credentials and decode the JSON response.
    ///
    /// Token state is neither read nor locked.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send_with_basic_auth<T: DeserializeOwned>(
        &self,
        mut request: HttpRequest,
    ) -> PaymentResult<T> {
        request.set_header("authorization", self.basic_credentials());
        self.executor.send_json(request).await
    }

    /// Attach the current bearer token, refreshing it first when near expiry.
    ///
    /// Without a held token the request goes out unauthenticated and the
    /// provider's rejection is returned as usual.
    async fn authorize(&self, mut request: HttpRequest) -> PaymentResult<HttpRequest> {
        let header = self
            .token
            .authorization(&self.policy, || self.refresh_token_state())
            .await?;

        match header {
            Some(value) => request.set_header("authorization", value),
            None => debug!("no token held, sending without bearer"),
        }
        Ok(request)
    }

    fn basic_credentials(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.config.client_id,
            self.config.client_secret.expose_secret()
        );
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }

    // Tokens

    /// Acquire an application token with the client-credentials grant and hold it.
    pub async fn get_access_token(&self) -> PaymentResult<TokenResponse> {
        let (response, state) = self.request_client_credentials().await?;
        self.token.store(state).await;
        Ok(response)
    }

    /// Return the held token, acquiring or refreshing it when needed.
    pub async fn ensure_fresh_token(&self) -> PaymentResult<TokenState> {
        self.token
            .ensure_fresh(&self.policy, || self.refresh_token_state())
            .await
    }

    /// Exchange an authorization code for a user token. The result is not held.
    pub async fn grant_token_from_auth_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> PaymentResult<TokenResponse> {
        let request = new_form_request(
            HttpMethod::Post,
            self.url("/v1/identity/openidconnect/tokenservice"),
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ],
        )?;
        self.send_with_basic_auth(request).await
    }

    /// Exchange a user refresh token for a new user token. The result is not held.
    pub async fn grant_token_from_refresh_token(
        &self,
        refresh_token: &str,
    ) -> PaymentResult<TokenResponse> {
        #[derive(Serialize)]
        struct RefreshGrant<'a> {
            grant_type: &'a str,
            refresh_token: &'a str,
        }

        let request = self.new_request(
            HttpMethod::Post,
            self.url("/v1/identity/openidconnect/tokenservice"),
            Some(&RefreshGrant {
                grant_type: "refresh_token",
                refresh_token,
            }),
        )?;
        self.send_with_auth(request).await
    }

    /// Hold an externally obtained token.
    pub async fn set_access_token(&self, response: &TokenResponse) {
        self.token
            .store(TokenState::from_response(response, Utc::now()))
            .await;
    }

    /// Snapshot of the held token.
    pub async fn token(&self) -> Option<TokenState> {
        self.token.snapshot().await
    }

    async fn request_client_credentials(&self) -> PaymentResult<(TokenResponse, TokenState)> {
        let issued_at = Utc::now();
        let request = new_form_request(
            HttpMethod::Post,
            self.url("/v1/oauth2/token"),
            &[("grant_type", "client_credentials")],
        )?;

        let response: TokenResponse = self.send_with_basic_auth(request).await?;
        if response.access_token.is_empty() {
            return Err(ProtocolError::MissingAccessToken.into());
        }

        let state = TokenState::from_response(&response, issued_at);
        debug!(expires_at = ?state.expires_at, "acquired application token");
        Ok((response, state))
    }

    async fn refresh_token_state(&self) -> PaymentResult<TokenState> {
        self.request_client_credentials()
            .await
            .map(|(_, state)| state)
            .map_err(PaymentError::token_refresh)
    }

    // Path helpers used by the services

    /// GET `path` and decode the response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> PaymentResult<T> {
        let request = self.new_request(HttpMethod::Get, self.url(path), None::<&()>)?;
        self.send_with_auth(request).await
    }

    /// GET `path` with `query` and decode the response.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> PaymentResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = new_query_request(&self.url(path), query)?;
        self.send_with_auth(request).await
    }

    /// POST `body` to `path` and decode the response.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> PaymentResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post_with_request_id(path, body, None).await
    }

    /// POST `body` to `path`, passing `request_id` through as the idempotency key.
    pub async fn post_with_request_id<T, B>(
        &self,
        path: &str,
        body: &B,
        request_id: Option<&str>,
    ) -> PaymentResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.new_request(HttpMethod::Post, self.url(path), Some(body))?;
        apply_request_id(&mut request, request_id);
        self.send_with_auth(request).await
    }

    /// POST `body` to `path`, ignoring the response body.
    pub async fn post_no_content<B>(&self, path: &str, body: Option<&B>) -> PaymentResult<()>
    where
        B: Serialize + ?Sized,
    {
        let request = self.new_request(HttpMethod::Post, self.url(path), body)?;
        self.send_with_auth_no_content(request).await
    }

    /// PATCH `path` and decode the response.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> PaymentResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.new_request(HttpMethod::Patch, self.url(path), Some(body))?;
        self.send_with_auth(request).await
    }

    /// PATCH `path`, ignoring the response body.
    pub async fn patch_no_content<B>(&self, path: &str, body: &B) -> PaymentResult<()>
    where
        B: Serialize + ?Sized,
    {
        let request = self.new_request(HttpMethod::Patch, self.url(path), Some(body))?;
        self.send_with_auth_no_content(request).await
    }

    /// DELETE `path`.
    pub async fn delete(&self, path: &str) -> PaymentResult<()> {
        let request = self.new_request(HttpMethod::Delete, self.url(path), None::<&()>)?;
        self.send_with_auth_no_content(request).await
    }
}

impl std::fmt::Debug for PayPalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalClient")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Set the idempotency header when a non-empty key is supplied.
pub fn apply_request_id(request: &mut HttpRequest, request_id: Option<&str>) {
    if let Some(id) = request_id.filter(|id| !id.is_empty()) {
        request.set_header(REQUEST_ID_HEADER, id);
    }
}

/// Builder for [`PayPalClient`].
pub struct PayPalClientBuilder {
    config: PayPalConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    log_sink: Option<Arc<dyn LogSink>>,
    return_representation: bool,
}

impl PayPalClientBuilder {
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            config,
            transport: None,
            log_sink: None,
            return_representation: false,
        }
    }

    /// Use `transport` instead of the default reqwest transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Write every exchange to `sink`.
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Start with full resource representations enabled.
    pub fn return_representation(mut self, enabled: bool) -> Self {
        self.return_representation = enabled;
        self
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> PaymentResult<PayPalClient> {
        self.config.validate()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestHttpTransport::with_options(
                self.config.timeout,
                DEFAULT_MAX_RESPONSE_SIZE,
            )?),
        };

        let mut executor = RequestExecutor::new(transport, ErrorFormat::PayPal);
        if let Some(sink) = self.log_sink {
            executor = executor.with_log_sink(sink);
        }
        executor.set_return_representation(self.return_representation);

        Ok(PayPalClient {
            policy: RefreshPolicy::new(self.config.refresh_threshold),
            config: self.config,
            executor,
            token: TokenCell::new(),
        })
    }
}
