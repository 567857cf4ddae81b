//! Integration tests using WireMock
//!
//! These drive the clients through the real reqwest transport against a local
//! mock server, covering token handling, dispatch, error normalization and the
//! provider clients end to end.

mod dispatch;
mod providers;
mod services;
mod token_lifecycle;

use payment_integration::{PayPalClient, PayPalConfig};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/v1/oauth2/token";

/// base64("client:secret")
pub const BASIC_CREDENTIALS: &str = "Basic Y2xpZW50OnNlY3JldA==";

pub fn paypal_config(server: &MockServer) -> PayPalConfig {
    PayPalConfig::new("client", "secret", server.uri())
}

pub fn paypal_client(server: &MockServer) -> PayPalClient {
    PayPalClient::new(paypal_config(server)).expect("client builds")
}

pub fn token_response(token: &str, expires_in: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "scope": "https://uri.paypal.com/services/payments/payment",
        "access_token": token,
        "token_type": "Bearer",
        "app_id": "APP-80W284485P519543T",
        "expires_in": expires_in
    }))
}

/// Token endpoint answering with `token` at most `times` times.
pub fn token_mock(token: &str, expires_in: i64, times: u64) -> Mock {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("authorization", BASIC_CREDENTIALS))
        .respond_with(token_response(token, expires_in))
        .up_to_n_times(times)
}

/// `Authorization` values of every received request to `request_path`, in order.
pub async fn authorizations(server: &MockServer, request_path: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .map(|request| {
            request
                .headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

pub async fn count_requests(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
