//! Payment Error Types
//!
//! Root error type, transport/configuration sub-errors and the provider error
//! model decoded from non-2xx responses.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result alias used across the crate.
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Root error type for payment provider calls.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Provider error: {0}")]
    Api(Box<ApiErrorResponse>),

    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Token refresh failed: {0}")]
    TokenRefresh(#[source] Box<PaymentError>),

    #[error("Unable to execute agreement with token={token}")]
    AgreementExecution { token: String },
}

impl From<ApiErrorResponse> for PaymentError {
    fn from(error: ApiErrorResponse) -> Self {
        Self::Api(Box::new(error))
    }
}

impl PaymentError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "PAYMENT_CONFIG",
            Self::Network(_) => "PAYMENT_NETWORK",
            Self::Api(_) => "PAYMENT_PROVIDER",
            Self::Decode(_) => "PAYMENT_DECODE",
            Self::Protocol(_) => "PAYMENT_PROTOCOL",
            Self::TokenRefresh(_) => "PAYMENT_TOKEN_REFRESH",
            Self::AgreementExecution { .. } => "PAYMENT_AGREEMENT",
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_retryable(),
            Self::Api(e) => e.status == 429 || e.status >= 500,
            Self::TokenRefresh(inner) => inner.is_retryable(),
            _ => false,
        }
    }

    /// HTTP status of the provider response, if the error came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            Self::TokenRefresh(inner) => inner.status_code(),
            _ => None,
        }
    }

    /// Structured provider error, if any.
    pub fn api_error(&self) -> Option<&ApiErrorResponse> {
        match self {
            Self::Api(e) => Some(e),
            Self::TokenRefresh(inner) => inner.api_error(),
            _ => None,
        }
    }

    /// Check if the provider rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    pub(crate) fn token_refresh(source: PaymentError) -> Self {
        Self::TokenRefresh(Box::new(source))
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid API base URL: {url}")]
    InvalidApiBase { url: String },

    #[error("Failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    #[error("Request failed: {message}")]
    RequestFailed { message: String },

    #[error("Request cancelled")]
    Cancelled,
}

impl NetworkError {
    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                message: e.to_string(),
            }
        } else if e.is_connect() {
            Self::ConnectionFailed {
                message: e.to_string(),
            }
        } else {
            Self::RequestFailed {
                message: e.to_string(),
            }
        }
    }
}

/// Protocol-level error outside the provider error model.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Failed to serialize request body: {message}")]
    Serialization { message: String },

    #[error("Failed to read response body: {message}")]
    ResponseBody { message: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("Failed to write response body to sink: {message}")]
    SinkWrite { message: String },

    #[error("Token endpoint returned no access token")]
    MissingAccessToken,
}

/// Single field-level issue reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetail {
    pub field: String,
    pub issue: String,
    pub description: String,
    pub links: Vec<ErrorLink>,
}

/// Link attached to an error detail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLink {
    pub href: String,
    pub rel: String,
    pub method: String,
}

/// Provider error decoded from a non-2xx response.
///
/// `status`, `method` and `url` describe the exchange that produced it; the remaining
/// fields come from the response body. Each one is taken on its own, so a missing,
/// null or mistyped field stays empty without discarding the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorResponse {
    pub status: u16,
    pub method: String,
    pub url: String,
    pub name: String,
    pub message: String,
    pub debug_id: String,
    pub information_link: String,
    pub details: Vec<ErrorDetail>,
}

impl fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}",
            self.method, self.url, self.status, self.message
        )?;
        if !self.details.is_empty() {
            let issues: Vec<String> = self
                .details
                .iter()
                .map(|d| format!("{}: {}", d.field, d.issue))
                .collect();
            write!(f, ", [{}]", issues.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiErrorResponse {}

/// Shape of provider error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    /// `{name, message, debug_id, information_link, details}` or the OAuth
    /// `{error, error_description}` pair.
    PayPal,
    /// `{"error": {type, code, message, param, doc_url}}`.
    Stripe,
    /// `{error_type, error_code, error_message, request_id, documentation_url}`.
    Plaid,
}

impl ErrorFormat {
    /// Decode an error body into the uniform model.
    ///
    /// Decoding failures are tolerated: the returned value always carries the
    /// exchange metadata, with body-derived fields left empty.
    pub fn decode(&self, status: u16, method: &str, url: &str, body: &[u8]) -> ApiErrorResponse {
        let mut error = match self {
            Self::PayPal => decode_paypal(body),
            Self::Stripe => decode_stripe(body),
            Self::Plaid => decode_plaid(body),
        }
        .unwrap_or_default();

        error.status = status;
        error.method = method.to_string();
        error.url = url.to_string();
        error
    }
}

fn decode_paypal(body: &[u8]) -> Option<ApiErrorResponse> {
    let body = parse_object(body)?;
    let mut error = ApiErrorResponse {
        name: text(&body, "name"),
        message: text(&body, "message"),
        debug_id: text(&body, "debug_id"),
        information_link: text(&body, "information_link"),
        details: list(&body, "details", decode_detail),
        ..Default::default()
    };
    if error.name.is_empty() && error.message.is_empty() {
        // token endpoint errors
        error.name = text(&body, "error");
        error.message = text(&body, "error_description");
    }
    Some(error)
}

fn decode_stripe(body: &[u8]) -> Option<ApiErrorResponse> {
    let envelope = parse_object(body)?;
    let error = envelope.get("error").filter(|e| e.is_object())?;
    let message = text(error, "message");
    let param = text(error, "param");
    let details = if param.is_empty() {
        Vec::new()
    } else {
        vec![ErrorDetail {
            field: param,
            issue: message.clone(),
            ..Default::default()
        }]
    };
    let code = text(error, "code");
    Some(ApiErrorResponse {
        name: if code.is_empty() { text(error, "type") } else { code },
        message,
        information_link: text(error, "doc_url"),
        details,
        ..Default::default()
    })
}

fn decode_plaid(body: &[u8]) -> Option<ApiErrorResponse> {
    let error = parse_object(body)?;
    let code = text(&error, "error_code");
    Some(ApiErrorResponse {
        name: if code.is_empty() { text(&error, "error_type") } else { code },
        message: text(&error, "error_message"),
        debug_id: text(&error, "request_id"),
        information_link: text(&error, "documentation_url"),
        ..Default::default()
    })
}

fn parse_object(body: &[u8]) -> Option<Value> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .filter(Value::is_object)
}

/// String field of `value`, empty when absent or not a string.
fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn list<T>(value: &Value, key: &str, decode: fn(&Value) -> T) -> Vec<T> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter(|i| i.is_object()).map(decode).collect())
        .unwrap_or_default()
}

fn decode_detail(value: &Value) -> ErrorDetail {
    ErrorDetail {
        field: text(value, "field"),
        issue: text(value, "issue"),
        description: text(value, "description"),
        links: list(value, "links", decode_link),
    }
}

fn decode_link(value: &Value) -> ErrorLink {
    ErrorLink {
        href: text(value, "href"),
        rel: text(value, "rel"),
        method: text(value, "method"),
    }
}
