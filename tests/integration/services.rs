//! PayPal services end to end.

use super::*;
use payment_integration::services::orders::CaptureOrderRequest;
use payment_integration::services::payouts::{Payout, PayoutItem, SenderBatchHeader};
use payment_integration::services::subscriptions::SubscriptionBase;
use payment_integration::services::webhooks::{
    HEADER_AUTH_ALGO, HEADER_TRANSMISSION_ID, HEADER_TRANSMISSION_SIG,
};
use payment_integration::types::CurrencyValue;
use payment_integration::PaymentError;
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, header_exists};

async fn authenticated_client(server: &MockServer) -> PayPalClient {
    token_mock("A21", 3600, 10).mount(server).await;
    let client = paypal_client(server);
    client.get_access_token().await.unwrap();
    client
}

#[tokio::test]
async fn test_order_capture_asks_for_representation_once() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/v2/checkout/orders/5O190127TN364715T/capture"))
        .and(header("prefer", "return=representation"))
        .and(header("paypal-request-id", "capture-1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "reference_id": "default",
                "payments": {"captures": [{
                    "id": "3C679366HH908993F",
                    "status": "COMPLETED",
                    "amount": {"currency_code": "USD", "value": "100.00"}
                }]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/checkout/orders/5O190127TN364715T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "5O190127TN364715T", "status": "COMPLETED"})))
        .mount(&server)
        .await;

    let captured = client
        .orders()
        .capture(
            "5O190127TN364715T",
            &CaptureOrderRequest::default(),
            Some("capture-1"),
        )
        .await
        .unwrap();
    assert_eq!(captured.status, "COMPLETED");

    client.orders().get("5O190127TN364715T").await.unwrap();
    let last = server.received_requests().await.unwrap().pop().unwrap();
    assert!(last.headers.get("prefer").is_none());
}

#[tokio::test]
async fn test_agreement_execution_without_id_fails() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/payments/billing-agreements/EC-0JP008296V451950C/agreement-execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "Pending"})))
        .mount(&server)
        .await;

    let err = client
        .billing()
        .execute_agreement("EC-0JP008296V451950C")
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::AgreementExecution { .. }));
    assert_eq!(
        err.to_string(),
        "Unable to execute agreement with token=EC-0JP008296V451950C"
    );
}

#[tokio::test]
async fn test_payout_batch_round_trip() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/payments/payouts"))
        .and(body_partial_json(json!({
            "sender_batch_header": {"sender_batch_id": "batch-1"},
            "items": [{"recipient_type": "EMAIL", "receiver": "payee@example.com"}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "batch_header": {
                "payout_batch_id": "5UXD2E8A7EBQJ",
                "batch_status": "PENDING",
                "sender_batch_header": {"sender_batch_id": "batch-1"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payout = Payout {
        sender_batch_header: SenderBatchHeader {
            sender_batch_id: Some("batch-1".to_string()),
            ..Default::default()
        },
        items: vec![PayoutItem {
            recipient_type: "EMAIL".to_string(),
            receiver: "payee@example.com".to_string(),
            amount: CurrencyValue::new("USD", "9.87"),
            ..Default::default()
        }],
    };
    let response = client.payouts().create(&payout).await.unwrap();

    let batch = response.batch_header.unwrap();
    assert_eq!(batch.payout_batch_id, "5UXD2E8A7EBQJ");
    assert_eq!(batch.batch_status, "PENDING");
}

#[tokio::test]
async fn test_subscription_create_returns_approve_link() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/billing/subscriptions"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({"plan_id": "P-5ML4271244454362WXNWU5NQ"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "I-BW452GLLEP1G",
            "status": "APPROVAL_PENDING",
            "plan_id": "P-5ML4271244454362WXNWU5NQ",
            "links": [{
                "href": "https://www.paypal.com/webapps/billing/subscriptions?ba_token=BA-2M539689T3856352J",
                "rel": "approve",
                "method": "GET"
            }]
        })))
        .mount(&server)
        .await;

    let subscription = client
        .subscriptions()
        .create(&SubscriptionBase {
            plan_id: "P-5ML4271244454362WXNWU5NQ".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(subscription.id, "I-BW452GLLEP1G");
    assert!(subscription.approve_url().unwrap().contains("ba_token"));
}

#[tokio::test]
async fn test_webhook_signature_verification() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/notifications/verify-webhook-signature"))
        .and(body_partial_json(json!({
            "auth_algo": "SHA256withRSA",
            "transmission_id": "69cd13f0-d67a-11e5-baa3-778b53f4ae55",
            "webhook_id": "1JE4291016473214C",
            "webhook_event": {"id": "8PT597110X687430LKGECATA"}
        })))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verification_status": "SUCCESS"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = http::HeaderMap::new();
    headers.insert(HEADER_AUTH_ALGO, "SHA256withRSA".parse().unwrap());
    headers.insert(
        HEADER_TRANSMISSION_ID,
        "69cd13f0-d67a-11e5-baa3-778b53f4ae55".parse().unwrap(),
    );
    headers.insert(HEADER_TRANSMISSION_SIG, "lmI95Jx3Y9nhR5SJWlHVIWpg4AgFk7n9bCHSRxbrd8A9zrhdu2rMyFrmz+Zjh3s3boXB07VXCXUZy/UFzUlnGJn0wDugt7FlSvdKeIJenLRemUxYCPVoEZzg9VFNqOa48gMkvF+XTpxBeUx/kWy6B5cp7GkT2+pOowfRK7OaynuxUoKW3JcMWw272VKjLTtTAShncla7tGF+55rxyt2KNZIIqxNMJ48RDZheGU5w1npu9dZHnPgTXB9iomeVRoD8O/jhRpnKsGrDschyNdkeh81BJJMH4Ctc6lnCCquoP/GzCzz33MMsNdid7vL/NIWaCsekQpW26FpWPi/tfj8nLA==".parse().unwrap());
    let body = br#"{"id":"8PT597110X687430LKGECATA","event_type":"PAYMENT.AUTHORIZATION.CREATED","resource":{"id":"2DC87612EK520411B"}}"#;

    let verified = client
        .webhooks()
        .verify_signature(&headers, body, "1JE4291016473214C")
        .await
        .unwrap();
    assert!(verified.is_verified());
}
