//! Dispatch through the executor: headers, error decoding, logging, cancellation.

use super::*;
use payment_integration::services::orders::{
    CreateOrderRequest, OrderIntent, PurchaseUnitAmount, PurchaseUnitRequest,
};
use payment_integration::{
    HttpMethod, InMemoryLogSink, NetworkError, PaymentError, REQUEST_ID_HEADER,
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::body_string;

async fn authenticated_client(server: &MockServer) -> PayPalClient {
    token_mock("A21", 3600, 10).mount(server).await;
    let client = paypal_client(server);
    client.get_access_token().await.unwrap();
    client
}

fn order_request() -> CreateOrderRequest {
    CreateOrderRequest::new(
        OrderIntent::Capture,
        vec![PurchaseUnitRequest {
            reference_id: Some("default".to_string()),
            amount: PurchaseUnitAmount::new("USD", "100.00"),
            ..Default::default()
        }],
    )
}

#[tokio::test]
async fn test_client_credentials_use_basic_auth_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("authorization", BASIC_CREDENTIALS))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("grant_type=client_credentials"))
        .respond_with(token_response("A21", 32400))
        .expect(1)
        .mount(&server)
        .await;

    let client = paypal_client(&server);
    let response = client.get_access_token().await.unwrap();

    assert_eq!(response.access_token, "A21");
    assert_eq!(response.expires_in, Some(32400));
}

#[tokio::test]
async fn test_success_body_is_passed_through() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/payments/sale/PAY-1"))
        .and(header("authorization", "Bearer A21"))
        .and(header("accept", "application/json"))
        .and(header("accept-language", "en_US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "PAY-1"})))
        .mount(&server)
        .await;

    let sale: Value = client.get("/v1/payments/sale/PAY-1").await.unwrap();
    assert_eq!(sale["id"], "PAY-1");
}

#[tokio::test]
async fn test_validation_error_is_decoded() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/v2/payments/authorizations/AUTH-1/capture"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": "VALIDATION_ERROR",
            "message": "Invalid request - see details",
            "debug_id": "b4f7f6c3ae0a8",
            "information_link": "https://developer.paypal.com/docs/api/payments/#errors",
            "details": [{"field": "amount", "issue": "Required field missing"}]
        })))
        .mount(&server)
        .await;

    let err = client
        .post::<Value, _>("/v2/payments/authorizations/AUTH-1/capture", &json!({}))
        .await
        .unwrap_err();

    let api = err.api_error().unwrap();
    assert_eq!(api.status, 400);
    assert_eq!(api.method, "POST");
    assert_eq!(
        api.url,
        format!("{}/v2/payments/authorizations/AUTH-1/capture", server.uri())
    );
    assert_eq!(api.name, "VALIDATION_ERROR");
    assert_eq!(api.debug_id, "b4f7f6c3ae0a8");
    assert_eq!(api.details.len(), 1);
    assert_eq!(api.details[0].field, "amount");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_undecodable_error_body_keeps_status() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/x"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client.get::<Value>("/v1/x").await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    assert!(err.api_error().unwrap().name.is_empty());
}

#[tokio::test]
async fn test_request_id_is_sent_only_when_supplied() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/v2/checkout/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "5O190127TN364715T", "status": "CREATED"})))
        .expect(2)
        .mount(&server)
        .await;

    let order = client
        .orders()
        .create(&order_request(), Some("7b92603e-77ed-4896-8e78-5dea2050476a"))
        .await
        .unwrap();
    assert_eq!(order.status, "CREATED");
    client.orders().create(&order_request(), None).await.unwrap();

    let requests: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/v2/checkout/orders")
        .collect();
    assert_eq!(
        requests[0].headers.get(REQUEST_ID_HEADER).unwrap().to_str().unwrap(),
        "7b92603e-77ed-4896-8e78-5dea2050476a"
    );
    assert!(requests[1].headers.get(REQUEST_ID_HEADER).is_none());
}

#[tokio::test]
async fn test_exchange_is_written_to_log_sink() {
    let server = MockServer::start().await;
    token_mock("A21", 3600, 10).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/payments/sale/PAY-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "PAY-1"})))
        .mount(&server)
        .await;
    let sink = Arc::new(InMemoryLogSink::new());
    let client = PayPalClient::builder(paypal_config(&server))
        .log_sink(sink.clone())
        .build()
        .unwrap();
    client.get_access_token().await.unwrap();

    let _: Value = client.get("/v1/payments/sale/PAY-1").await.unwrap();

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[1].starts_with(&format!(
        "Request: GET {}/v1/payments/sale/PAY-1",
        server.uri()
    )));
    assert!(entries[1].contains("PAY-1"));
}

#[tokio::test]
async fn test_cancelled_call_returns_promptly() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let request = client
        .new_request(HttpMethod::Get, client.url("/v1/slow"), None::<&()>)
        .unwrap()
        .with_cancellation(token.clone());
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let started = std::time::Instant::now();
    let err = client.send_with_auth::<Value>(request).await.unwrap_err();

    assert!(matches!(err, PaymentError::Network(NetworkError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // nothing listens on port 1
    let client =
        PayPalClient::new(PayPalConfig::new("client", "secret", "http://127.0.0.1:1")).unwrap();
    let err = client.get_access_token().await.unwrap_err();

    assert!(matches!(err, PaymentError::Network(_)));
    assert!(err.api_error().is_none());
}
