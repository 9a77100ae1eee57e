//! Conversation context management
//!
//! Keeps each session's prompt within a token budget by folding older
//! turns into a running summary (≤8k estimated tokens by default).

pub mod models;
pub mod prompt;
pub mod reasoning;
pub mod summarizer;
pub mod token_estimator;

pub use models::{ConversationState, Role, Turn};
pub use prompt::PromptAssembler;
pub use reasoning::ReasoningStripper;
pub use summarizer::{CompactionOutcome, CompactionPolicy, SummarizationEngine};
pub use token_estimator::{TokenEstimator, WhitespaceEstimator};
