//! Mock provider implementation for testing.

use super::{Generation, ProviderError, TextProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the mock should answer with.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Reply with `Mock response for: <prompt>`.
    Echo,
    /// Reply with fixed text.
    Reply(String),
    Blocked(String),
    Empty,
    /// Fail with a network error carrying this message.
    Fail(String),
}

/// Mock text provider for testing. Counts calls so tests can assert that
/// rejected requests never reach the provider.
pub struct MockTextProvider {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockTextProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(&self, prompt: &str) -> Result<Generation, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Echo => Ok(Generation::Generated(format!(
                "Mock response for: {}",
                prompt
            ))),
            MockBehavior::Reply(text) => Ok(Generation::Generated(text.clone())),
            MockBehavior::Blocked(reason) => Ok(Generation::Blocked(reason.clone())),
            MockBehavior::Empty => Ok(Generation::Empty),
            MockBehavior::Fail(message) => Err(ProviderError::NetworkError(message.clone())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
