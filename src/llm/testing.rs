//! Scripted completion client for unit tests

use super::client::{CompletionClient, CompletionError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued results in order, then falls back to a fixed reply.
/// Every prompt it receives is recorded.
pub(crate) struct ScriptedClient {
    script: Mutex<VecDeque<Result<Option<String>, CompletionError>>>,
    fallback: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub(crate) fn new(fallback: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: fallback.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn then(self, result: Result<Option<String>, CompletionError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn then_reply(self, text: &str) -> Self {
        self.then(Ok(Some(text.to_string())))
    }

    pub(crate) fn then_fail(self) -> Self {
        self.then(Err(CompletionError::UpstreamError("Status 500: boom".to_string())))
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some(self.fallback.clone())))
    }
}
