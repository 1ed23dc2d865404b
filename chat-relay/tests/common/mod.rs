use chat_relay::config::{CorsConfig, GeminiApiConfig, GoogleConfig, ModelConfig, RelayConfig};
use chat_relay::services::providers::mock::{MockBehavior, MockTextProvider};
use chat_relay::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "gemini-1.5-flash";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    /// Present when the app runs on a mock provider.
    pub provider: Option<Arc<MockTextProvider>>,
}

/// Configuration pointing at `gemini_base_url`, listening on a random port.
pub fn test_config(gemini_base_url: &str) -> RelayConfig {
    RelayConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
        google: GoogleConfig {
            api_key: Secret::new(TEST_API_KEY.to_string()),
        },
        models: ModelConfig {
            chat_model: TEST_MODEL.to_string(),
        },
        gemini: GeminiApiConfig {
            base_url: gemini_base_url.to_string(),
            timeout: Duration::from_secs(5),
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
    }
}

impl TestApp {
    /// Spawn the relay backed by a mock provider.
    pub async fn spawn(behavior: MockBehavior) -> Self {
        let provider = Arc::new(MockTextProvider::new(behavior));
        let app = Application::build_with_provider(
            test_config("http://127.0.0.1:9"),
            provider.clone(),
        )
        .await
        .expect("Failed to build test application");

        Self::start(app, Some(provider)).await
    }

    /// Spawn the relay with the real Gemini provider aimed at `gemini_base_url`.
    pub async fn spawn_with_gemini(gemini_base_url: &str) -> Self {
        let app = Application::build(test_config(gemini_base_url))
            .await
            .expect("Failed to build test application");

        Self::start(app, None).await
    }

    async fn start(app: Application, provider: Option<Arc<MockTextProvider>>) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            client,
            provider,
        }
    }

    pub async fn post_chat(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/chat", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn post_raw(&self, content_type: Option<&str>, body: &str) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}/chat", self.address))
            .body(body.to_string());
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        request.send().await.expect("Failed to send request")
    }

    pub fn provider_calls(&self) -> usize {
        self.provider.as_ref().map(|p| p.calls()).unwrap_or(0)
    }
}
