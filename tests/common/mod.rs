//! Shared fixtures for integration tests

use async_trait::async_trait;
use chat_memory::llm::{CompletionClient, CompletionError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays scripted results, then answers with a fixed reply.
/// Records every prompt it sees.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<Option<String>, CompletionError>>>,
    fallback: String,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new(fallback: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: fallback.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, text: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(Some(text.to_string())));
        self
    }

    pub fn fail(self) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(CompletionError::RequestFailed("connection refused".to_string())));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
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

/// `n` whitespace-separated words
pub fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}
