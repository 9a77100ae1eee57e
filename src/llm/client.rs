//! Completion client abstraction

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Completion error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Text-in, text-out completion service
///
/// `Ok(None)` means the backend answered but produced no text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError>;
}

/// Wraps a client with a per-call deadline
pub struct DeadlineClient {
    inner: Arc<dyn CompletionClient>,
    deadline: Duration,
}

impl DeadlineClient {
    pub fn new(inner: Arc<dyn CompletionClient>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

#[async_trait]
impl CompletionClient for DeadlineClient {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError> {
        match tokio::time::timeout(self.deadline, self.inner.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Completion exceeded deadline of {:?}", self.deadline);
                Err(CompletionError::Timeout(format!(
                    "no completion within {:?}",
                    self.deadline
                )))
            }
        }
    }
}
