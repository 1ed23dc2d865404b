//! Server-side logging of failed generations.
//!
//! Kept in its own test binary so the thread-local subscriber only sees
//! events from this test.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chat_relay::config::CorsConfig;
use chat_relay::services::providers::mock::{MockBehavior, MockTextProvider};
use chat_relay::startup::{build_router, AppState};
use std::io;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn upstream_failure_is_logged_with_kind_and_detail() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = build_router(
        AppState {
            text_provider: Arc::new(MockTextProvider::new(MockBehavior::Fail(
                "connection reset by peer".to_string(),
            ))),
        },
        &CorsConfig {
            allowed_origins: Vec::new(),
        },
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"message": "tell me a joke"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let output = logs.contents();
    assert!(output.contains("ERROR"), "no error event in: {output}");
    assert!(output.contains("network_error"), "missing kind in: {output}");
    assert!(
        output.contains("connection reset by peer"),
        "missing detail in: {output}"
    );
    assert!(output.contains("tell me a joke"), "missing preview in: {output}");
}
