//! Per-request orchestration of the conversation core

use super::store::ConversationStore;
use crate::config::MemoryConfig;
use crate::context::{
    PromptAssembler, ReasoningStripper, SummarizationEngine, TokenEstimator, Turn,
    WhitespaceEstimator,
};
use crate::error::{ChatError, Result};
use crate::llm::{CompletionClient, DeadlineClient};
use crate::metrics::METRICS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Reply to one user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Model output with reasoning removed
    pub response: String,
    /// Estimated tokens of the prompt that was sent, not of the response
    pub token_count: usize,
}

/// Conversation service: store, compaction, prompt, completion, cleanup
pub struct ConversationService {
    store: Arc<ConversationStore>,
    client: Arc<dyn CompletionClient>,
    estimator: Arc<dyn TokenEstimator>,
    summarizer: SummarizationEngine,
    assembler: PromptAssembler,
    stripper: ReasoningStripper,
}

impl ConversationService {
    /// Create a service over an injected store and completion client.
    ///
    /// With `completion_timeout_ms` set, every completion, chunk summaries
    /// included, runs under that deadline.
    pub fn new(
        store: Arc<ConversationStore>,
        client: Arc<dyn CompletionClient>,
        config: &MemoryConfig,
    ) -> Result<Self> {
        config.validate()?;

        let client: Arc<dyn CompletionClient> = match config.completion_timeout() {
            Some(deadline) => Arc::new(DeadlineClient::new(client, deadline)),
            None => client,
        };
        let estimator: Arc<dyn TokenEstimator> = Arc::new(WhitespaceEstimator);
        let stripper = ReasoningStripper::new(&config.reasoning_open_tag, &config.reasoning_close_tag)
            .map_err(|e| ChatError::Configuration(e.to_string()))?;

        Ok(Self {
            summarizer: SummarizationEngine::new(
                client.clone(),
                estimator.clone(),
                config.compaction_policy(),
            ),
            assembler: PromptAssembler::new(estimator.clone()),
            store,
            client,
            estimator,
            stripper,
        })
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Handle one user message for a session and return the cleaned reply
    pub async fn process_message(&self, session_id: &str, user_message: &str) -> Result<ChatResponse> {
        let start = Instant::now();
        let result = self.run_turn(session_id, user_message).await;

        METRICS.record_chat_request(result.is_ok(), start.elapsed());
        METRICS.active_sessions.set(self.store.len() as i64);
        if let Err(ref e) = result {
            error!("Processing message for session {} failed: {}", session_id, e);
        }

        result
    }

    async fn run_turn(&self, session_id: &str, user_message: &str) -> Result<ChatResponse> {
        debug!(
            "Processing message for session {} - user message: {}",
            session_id, user_message
        );

        let handle = self.store.get_or_create(session_id);
        // Held until the assistant turn is appended: one request per session at a time
        let mut state = handle.lock().await;

        state.push(Turn::user(user_message));
        debug!("Added user turn. Total turns: {}", state.len());

        if let Some(outcome) = self.summarizer.compact_if_needed(&mut state).await? {
            debug!(
                "Compaction complete: {} chunks, {} turns retained",
                outcome.chunks, outcome.retained_turns
            );
        }

        let prompt = self.assembler.build(&state);

        let raw = match self.client.complete(&prompt).await {
            Ok(raw) => {
                METRICS.record_completion("turn", true);
                raw
            }
            Err(e) => {
                METRICS.record_completion("turn", false);
                return Err(e.into());
            }
        };
        debug!("Raw response received: {:?}", raw);

        let clean = self.stripper.strip(raw.as_deref()).unwrap_or_default();
        state.push(Turn::assistant(clean.clone()));
        debug!("Added assistant turn. Total turns: {}", state.len());

        let token_count = self.estimator.estimate(&prompt);
        METRICS.prompt_tokens.observe(token_count as f64);
        info!(
            "Session {}: replied with {} chars, prompt ~{} tokens",
            session_id,
            clean.len(),
            token_count
        );

        Ok(ChatResponse {
            response: clean,
            token_count,
        })
    }
}
