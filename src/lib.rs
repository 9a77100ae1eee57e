//! Multi-session chat memory for language-model backends
//!
//! Each session keeps its recent turns verbatim and folds older turns into a
//! running summary once the history grows past a token budget. See
//! [`conversation::ConversationService::process_message`] for the request flow.

pub mod api;
pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod logging;
pub mod metrics;

pub use crate::config::Config;
pub use conversation::{ChatResponse, ConversationService, ConversationStore};
pub use error::{ChatError, Result};
