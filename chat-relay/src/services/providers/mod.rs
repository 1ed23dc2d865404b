//! Text generation provider abstraction.
//!
//! The relay talks to exactly one remote model per process. The provider is
//! built once at startup and shared read-only across requests, so
//! implementations must be safe for concurrent use.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Failure to obtain any answer from the provider.
///
/// Every variant is reported to callers as a generic 500; the detail is for
/// server-side logs only.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError { .. } => "api_error",
            ProviderError::Unauthorized(_) => "unauthorized",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// What the provider produced for a prompt.
///
/// Transport and API failures are carried separately as [`ProviderError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Non-empty generated text.
    Generated(String),

    /// The provider withheld the answer; holds the block reason code.
    Blocked(String),

    /// No text and no reason given.
    Empty,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a reply for a single user prompt.
    async fn generate(&self, prompt: &str) -> Result<Generation, ProviderError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}
