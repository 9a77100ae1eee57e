//! Prompt assembly from summary and recent history

use super::models::ConversationState;
use super::token_estimator::TokenEstimator;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, trace};

const SUMMARY_HEADER: &str = "Previous conversation summary:";
const CONVERSATION_HEADER: &str = "Current conversation:";

/// Builds the completion prompt for a session
///
/// The latest user message is expected to already be the last turn of the
/// history; it is not passed in separately.
pub struct PromptAssembler {
    estimator: Arc<dyn TokenEstimator>,
}

impl PromptAssembler {
    pub fn new(estimator: Arc<dyn TokenEstimator>) -> Self {
        Self { estimator }
    }

    pub fn build(&self, state: &ConversationState) -> String {
        let mut prompt = String::new();

        if let Some(summary) = state.summary().filter(|s| !s.is_empty()) {
            // Writing into a String cannot fail
            let _ = write!(prompt, "{}\n{}\n\n", SUMMARY_HEADER, summary);
        }

        prompt.push_str(CONVERSATION_HEADER);
        prompt.push('\n');
        for turn in state.history() {
            let _ = writeln!(prompt, "{}", turn);
        }

        debug!(
            "Built prompt for session {}: {} turns, ~{} tokens",
            state.id(),
            state.len(),
            self.estimator.estimate(&prompt)
        );
        trace!("Prompt text:\n{}", prompt);

        prompt
    }
}
