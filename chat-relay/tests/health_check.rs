//! Integration tests for the liveness route.

mod common;

use chat_relay::handlers::health::GREETING;
use chat_relay::services::providers::mock::MockBehavior;
use common::TestApp;

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::spawn(MockBehavior::Echo).await;

    let response = app
        .client
        .get(&app.address)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], GREETING);
    assert_eq!(app.provider_calls(), 0);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn(MockBehavior::Echo).await;

    let response = app
        .client
        .get(&app.address)
        .header("x-request-id", "req-abc-1")
        .send()
        .await
        .expect("Failed to send request");

    let headers = response.headers();
    assert_eq!(headers["x-request-id"], "req-abc-1");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::spawn(MockBehavior::Echo).await;

    let response = app
        .client
        .get(format!("{}/missing", app.address))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 404);
}
