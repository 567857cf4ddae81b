//! Token reuse, proactive refresh and refresh serialization.

use super::*;
use futures::future::join_all;
use payment_integration::{paypal_config as config_builder, PaymentError};
use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const SALE_PATH: &str = "/v1/payments/sale/PAY-1";

fn sale_mock() -> Mock {
    Mock::given(method("GET"))
        .and(path(SALE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "PAY-1", "state": "completed"})))
}

#[tokio::test]
async fn test_fresh_token_is_reused_across_calls() {
    let server = MockServer::start().await;
    token_mock("A21", 3600, 10).expect(1).mount(&server).await;
    sale_mock().expect(3).mount(&server).await;

    let client = paypal_client(&server);
    client.get_access_token().await.unwrap();
    for _ in 0..3 {
        let _: Value = client.get(SALE_PATH).await.unwrap();
    }

    assert_eq!(
        authorizations(&server, SALE_PATH).await,
        vec!["Bearer A21"; 3]
    );
}

#[tokio::test]
async fn test_near_expiry_token_is_refreshed_exactly_once() {
    let server = MockServer::start().await;
    // 30 s left is inside the default 60 s threshold
    token_mock("short", 30, 1).mount(&server).await;
    token_mock("long", 3600, 10).expect(1).mount(&server).await;
    sale_mock().expect(2).mount(&server).await;

    let client = paypal_client(&server);
    client.get_access_token().await.unwrap();

    let _: Value = client.get(SALE_PATH).await.unwrap();
    let _: Value = client.get(SALE_PATH).await.unwrap();

    assert_eq!(
        authorizations(&server, SALE_PATH).await,
        vec!["Bearer long", "Bearer long"]
    );
    assert_eq!(count_requests(&server, TOKEN_PATH).await, 2);
}

#[tokio::test]
async fn test_refresh_failure_keeps_token_and_skips_call() {
    let server = MockServer::start().await;
    token_mock("short", 30, 1).mount(&server).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "name": "INTERNAL_SERVICE_ERROR",
            "message": "An internal service error has occurred",
            "debug_id": "90957fca61718"
        })))
        .mount(&server)
        .await;
    sale_mock().expect(0).mount(&server).await;

    let client = paypal_client(&server);
    client.get_access_token().await.unwrap();

    let err = client.get::<Value>(SALE_PATH).await.unwrap_err();

    let PaymentError::TokenRefresh(cause) = &err else {
        panic!("expected a refresh failure, got {:?}", err);
    };
    let api = cause.api_error().unwrap();
    assert_eq!(api.status, 500);
    assert_eq!(api.name, "INTERNAL_SERVICE_ERROR");
    assert_eq!(err.error_code(), "PAYMENT_TOKEN_REFRESH");

    let held = client.token().await.unwrap();
    assert_eq!(held.access_token.expose_secret(), "short");
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    token_mock("short", 30, 1).mount(&server).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("long", 3600).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    sale_mock().expect(10).mount(&server).await;

    let client = Arc::new(paypal_client(&server));
    client.get_access_token().await.unwrap();

    let calls = (0..10).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.get::<Value>(SALE_PATH).await })
    });
    for result in join_all(calls).await {
        assert_eq!(result.unwrap().unwrap()["id"], "PAY-1");
    }

    assert_eq!(
        authorizations(&server, SALE_PATH).await,
        vec!["Bearer long"; 10]
    );
}

#[tokio::test]
async fn test_calls_after_shared_refresh_run_in_parallel() {
    let server = MockServer::start().await;
    token_mock("short", 30, 1).mount(&server).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("long", 3600).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SALE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "PAY-1"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(10)
        .mount(&server)
        .await;

    let client = Arc::new(paypal_client(&server));
    client.get_access_token().await.unwrap();

    let started = std::time::Instant::now();
    let calls = (0..10).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.get::<Value>(SALE_PATH).await })
    });
    for result in join_all(calls).await {
        result.unwrap().unwrap();
    }
    let elapsed = started.elapsed();

    // one refresh then one round of sales; serialized sales alone would take 3 s
    assert!(
        elapsed < Duration::from_millis(1500),
        "calls took {:?}",
        elapsed
    );
    assert_eq!(count_requests(&server, TOKEN_PATH).await, 2);
}

#[tokio::test]
async fn test_short_lived_token_with_zero_threshold() {
    let server = MockServer::start().await;
    token_mock("one", 1, 1).mount(&server).await;
    token_mock("two", 3600, 10).expect(1).mount(&server).await;
    sale_mock().mount(&server).await;

    let config = config_builder()
        .client_id("client")
        .client_secret("secret")
        .api_base(server.uri())
        .refresh_threshold(Duration::ZERO)
        .build()
        .unwrap();
    let client = PayPalClient::new(config).unwrap();
    client.get_access_token().await.unwrap();

    // still valid: no refresh
    let _: Value = client.get(SALE_PATH).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    // expired: refreshed first
    let _: Value = client.get(SALE_PATH).await.unwrap();

    assert_eq!(
        authorizations(&server, SALE_PATH).await,
        vec!["Bearer one", "Bearer two"]
    );
}

#[tokio::test]
async fn test_ensure_fresh_token_acquires_when_none_held() {
    let server = MockServer::start().await;
    token_mock("minted", 3600, 10).expect(1).mount(&server).await;

    let client = paypal_client(&server);
    assert!(client.token().await.is_none());

    let first = client.ensure_fresh_token().await.unwrap();
    let second = client.ensure_fresh_token().await.unwrap();

    assert_eq!(first.access_token.expose_secret(), "minted");
    assert_eq!(second.access_token.expose_secret(), "minted");
}
