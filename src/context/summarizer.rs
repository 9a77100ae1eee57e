//! Chunked summarization of older turns into a running summary

use super::models::{ConversationState, Turn};
use super::token_estimator::TokenEstimator;
use crate::llm::{CompletionClient, CompletionError};
use crate::metrics::METRICS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SUMMARY_INSTRUCTION: &str = "Summarize the following conversation:\n";

/// When to compact and how much to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionPolicy {
    /// Turns per summarization request, and the size gate of the trigger
    pub chunk_size: usize,
    /// History token estimate that must be exceeded before compacting
    pub token_limit: usize,
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            token_limit: 8000,
        }
    }
}

impl CompactionPolicy {
    /// Index where the retained tail starts, clamped to the history length
    pub fn preserve_from(&self, total: usize) -> usize {
        self.chunk_size
            .max(total.saturating_sub(self.chunk_size))
            .min(total)
    }
}

/// Result of a compaction pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionOutcome {
    pub chunks: usize,
    pub summarized_turns: usize,
    pub retained_turns: usize,
}

/// Folds old turns into `ConversationState::summary` through the completion client
pub struct SummarizationEngine {
    client: Arc<dyn CompletionClient>,
    estimator: Arc<dyn TokenEstimator>,
    policy: CompactionPolicy,
}

impl SummarizationEngine {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        estimator: Arc<dyn TokenEstimator>,
        policy: CompactionPolicy,
    ) -> Self {
        Self {
            client,
            estimator,
            policy,
        }
    }

    pub fn policy(&self) -> &CompactionPolicy {
        &self.policy
    }

    /// Both gates must open: more than `chunk_size` turns and more than
    /// `token_limit` estimated tokens in the history.
    pub fn should_compact(&self, state: &ConversationState) -> bool {
        if state.len() <= self.policy.chunk_size {
            return false;
        }
        let tokens = self.estimator.estimate_conversation(state);
        debug!(
            "Session {}: {} turns, {} history tokens (limit {})",
            state.id(),
            state.len(),
            tokens,
            self.policy.token_limit
        );
        tokens > self.policy.token_limit
    }

    /// Compact when the trigger fires
    pub async fn compact_if_needed(
        &self,
        state: &mut ConversationState,
    ) -> Result<Option<CompactionOutcome>, CompletionError> {
        if !self.should_compact(state) {
            return Ok(None);
        }
        info!("Token limit exceeded for session {}, compacting", state.id());
        self.compact(state).await.map(Some)
    }

    /// Summarize everything before the retained tail and replace the summary.
    ///
    /// All chunk summaries are collected before `state` is touched, so a
    /// failed completion leaves both summary and history as they were.
    pub async fn compact(
        &self,
        state: &mut ConversationState,
    ) -> Result<CompactionOutcome, CompletionError> {
        let total = state.len();
        let preserve_from = self.policy.preserve_from(total);
        if preserve_from == 0 {
            debug!("Nothing to summarize for session {}", state.id());
            return Ok(CompactionOutcome {
                chunks: 0,
                summarized_turns: 0,
                retained_turns: total,
            });
        }

        let mut summaries = Vec::new();
        for (index, chunk) in state.history()[..preserve_from]
            .chunks(self.policy.chunk_size)
            .enumerate()
        {
            let prompt = render_chunk(chunk);
            debug!(
                "Summarizing chunk {} of session {} ({} turns)",
                index,
                state.id(),
                chunk.len()
            );

            match self.client.complete(&prompt).await {
                Ok(summary) => {
                    METRICS.record_completion("summary", true);
                    summaries.push(summary.unwrap_or_default());
                }
                Err(e) => {
                    METRICS.record_completion("summary", false);
                    METRICS.compaction_failures.inc();
                    warn!(
                        "Compaction of session {} aborted at chunk {}: {}",
                        state.id(),
                        index,
                        e
                    );
                    return Err(e);
                }
            }
        }

        let chunks = summaries.len();
        let summary = summaries.join("\n").trim().to_string();

        state.apply_compaction(summary, preserve_from);
        METRICS.record_compaction(chunks);

        info!(
            "Compacted session {}: {} turns into {} chunk summaries, {} retained",
            state.id(),
            preserve_from,
            chunks,
            state.len()
        );

        Ok(CompactionOutcome {
            chunks,
            summarized_turns: preserve_from,
            retained_turns: state.len(),
        })
    }
}

/// Summarization request for one chunk of turns
fn render_chunk(turns: &[Turn]) -> String {
    let mut prompt = String::from(SUMMARY_INSTRUCTION);
    for turn in turns {
        prompt.push_str(&turn.to_string());
        prompt.push('\n');
    }
    prompt
}
